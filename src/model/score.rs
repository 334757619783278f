/// Judgment counts of a specific play, supplied by the caller per
/// performance query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreData {
    /// Legacy mod bitmask the play was set with.
    pub mods: u32,
    /// Maximum combo achieved during the play. **Not** the maximum possible
    /// combo of the map.
    pub max_combo: u32,
    /// Amount of greats (300s).
    pub n300: u32,
    /// Amount of goods (100s).
    pub n100: u32,
    /// Amount of mehs (50s).
    pub n50: u32,
    /// Amount of misses.
    pub misses: u32,
}

impl ScoreData {
    /// Return the total amount of hits by adding everything up.
    pub const fn total_hits(&self) -> u32 {
        self.n300 + self.n100 + self.n50 + self.misses
    }

    pub const fn total_successful_hits(&self) -> u32 {
        self.n300 + self.n100 + self.n50
    }

    /// Accuracy between `0.0` and `1.0` for this play.
    pub fn accuracy(&self) -> f64 {
        if self.total_hits() == 0 {
            return 0.0;
        }

        let numerator = 6 * self.n300 + 2 * self.n100 + self.n50;
        let denominator = 6 * self.total_hits();

        f64::from(numerator) / f64::from(denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreData;

    #[test]
    fn accuracy_of_empty_score_is_zero() {
        assert!(ScoreData::default().accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn perfect_score_is_full_accuracy() {
        let score = ScoreData {
            n300: 100,
            ..Default::default()
        };

        assert!((score.accuracy() - 1.0).abs() < f64::EPSILON);
    }
}
