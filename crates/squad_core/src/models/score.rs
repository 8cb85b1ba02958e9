use super::player::PlayerId;
use crate::error::{Result, SquadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence assumed for entries the provider did not qualify.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Precomputed prediction for one player in one fixture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FixtureScore {
    pub predicted_score: f64,
    pub confidence: f64,
}

impl FixtureScore {
    pub fn new(predicted_score: f64, confidence: f64) -> Result<Self> {
        if !predicted_score.is_finite() || predicted_score < 0.0 {
            return Err(SquadError::InvalidPlayer(format!(
                "predicted score {predicted_score} must be a non-negative number"
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SquadError::InvalidPlayer(format!(
                "confidence {confidence} outside [0, 1]"
            )));
        }
        Ok(Self { predicted_score, confidence })
    }
}

/// Predictions for every scored player in one matchday.
///
/// Players without an entry are treated as expected to score 0.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreSheet {
    pub matchday: u32,
    scores: BTreeMap<PlayerId, FixtureScore>,
}

impl ScoreSheet {
    pub fn new(matchday: u32) -> Self {
        Self { matchday, scores: BTreeMap::new() }
    }

    pub fn insert(&mut self, id: PlayerId, predicted_score: f64, confidence: f64) -> Result<()> {
        self.scores.insert(id, FixtureScore::new(predicted_score, confidence)?);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert) using [`DEFAULT_CONFIDENCE`].
    pub fn with(mut self, id: impl Into<PlayerId>, predicted_score: f64) -> Result<Self> {
        self.insert(id.into(), predicted_score, DEFAULT_CONFIDENCE)?;
        Ok(self)
    }

    pub fn get(&self, id: PlayerId) -> Option<&FixtureScore> {
        self.scores.get(&id)
    }

    pub fn predicted(&self, id: PlayerId) -> f64 {
        self.scores.get(&id).map_or(0.0, |s| s.predicted_score)
    }

    pub fn confidence(&self, id: PlayerId) -> f64 {
        self.scores.get(&id).map_or(DEFAULT_CONFIDENCE, |s| s.confidence)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &FixtureScore)> {
        self.scores.iter()
    }

    /// Copy without predictions below `min_confidence`.
    pub fn with_min_confidence(&self, min_confidence: f64) -> ScoreSheet {
        ScoreSheet {
            matchday: self.matchday,
            scores: self
                .scores
                .iter()
                .filter(|(_, s)| s.confidence >= min_confidence)
                .map(|(id, s)| (*id, *s))
                .collect(),
        }
    }

    /// Mean prediction over several matchdays, keyed to the first matchday.
    ///
    /// A player missing from one sheet counts as 0.0 for that matchday, so a
    /// player with fixtures in only half the window is averaged down.
    pub fn averaged(sheets: &[ScoreSheet]) -> Result<ScoreSheet> {
        let first = sheets
            .first()
            .ok_or_else(|| SquadError::NotFound("no score sheets to average".to_string()))?;
        let n = sheets.len() as f64;

        let mut sums: BTreeMap<PlayerId, (f64, f64)> = BTreeMap::new();
        for sheet in sheets {
            for (id, score) in &sheet.scores {
                let entry = sums.entry(*id).or_insert((0.0, 0.0));
                entry.0 += score.predicted_score;
                entry.1 += score.confidence;
            }
        }

        let scores = sums
            .into_iter()
            .map(|(id, (score_sum, conf_sum))| {
                (id, FixtureScore { predicted_score: score_sum / n, confidence: conf_sum / n })
            })
            .collect();

        log::debug!("Averaged {} score sheets from matchday {}", sheets.len(), first.matchday);
        Ok(ScoreSheet { matchday: first.matchday, scores })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_player_predicts_zero() {
        let sheet = ScoreSheet::new(5).with(1, 6.5).unwrap();
        assert_eq!(sheet.predicted(PlayerId(1)), 6.5);
        assert_eq!(sheet.predicted(PlayerId(2)), 0.0);
        assert_eq!(sheet.confidence(PlayerId(2)), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut sheet = ScoreSheet::new(1);
        assert!(sheet.insert(PlayerId(1), -0.5, 0.5).is_err());
        assert!(sheet.insert(PlayerId(1), 6.0, 1.5).is_err());
        assert!(sheet.insert(PlayerId(1), f64::NAN, 0.5).is_err());
        assert!(sheet.is_empty());
    }

    #[test]
    fn confidence_filter_drops_weak_predictions() {
        let mut sheet = ScoreSheet::new(3);
        sheet.insert(PlayerId(1), 7.0, 0.9).unwrap();
        sheet.insert(PlayerId(2), 9.0, 0.3).unwrap();
        let filtered = sheet.with_min_confidence(0.5);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.predicted(PlayerId(2)), 0.0);
    }

    #[test]
    fn averages_over_horizon() {
        let mut a = ScoreSheet::new(10);
        a.insert(PlayerId(1), 6.0, 0.8).unwrap();
        a.insert(PlayerId(2), 8.0, 0.6).unwrap();
        let mut b = ScoreSheet::new(11);
        b.insert(PlayerId(1), 8.0, 0.6).unwrap();

        let avg = ScoreSheet::averaged(&[a, b]).unwrap();
        assert_eq!(avg.matchday, 10);
        assert!((avg.predicted(PlayerId(1)) - 7.0).abs() < 1e-9);
        assert!((avg.predicted(PlayerId(2)) - 4.0).abs() < 1e-9);
        assert!((avg.confidence(PlayerId(1)) - 0.7).abs() < 1e-9);
        assert!(ScoreSheet::averaged(&[]).is_err());
    }
}
