use std::cmp;

use crate::{
    attributes::{DifficultyAttributes, PerformanceAttributes},
    error::Error,
    model::score::ScoreData,
};

use self::calculator::PerformanceCalculator;

mod calculator;

pub use self::calculator::PERFORMANCE_BASE_MULTIPLIER;

/// Performance calculator on difficulty attributes.
///
/// Hitresults can be given either as explicit counts, through a full
/// [`ScoreData`], or approximated from a target accuracy. Unset values
/// default to a full combo with perfect accuracy.
///
/// # Example
///
/// ```
/// use nova_pp::{DifficultyAttributes, Performance};
///
/// let attrs = DifficultyAttributes::default();
///
/// let perf = Performance::new(attrs)
///     .mods(8 + 64) // HDDT
///     .misses(2)
///     .accuracy(0.987)
///     .calculate()?;
/// # Ok::<(), nova_pp::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct Performance {
    attrs: DifficultyAttributes,
    mods: u32,
    acc: Option<f64>,
    combo: Option<u32>,
    n300: Option<u32>,
    n100: Option<u32>,
    n50: Option<u32>,
    misses: u32,
}

impl Performance {
    pub const fn new(attrs: DifficultyAttributes) -> Self {
        Self {
            attrs,
            mods: 0,
            acc: None,
            combo: None,
            n300: None,
            n100: None,
            n50: None,
            misses: 0,
        }
    }

    /// Specify mods through their legacy bit values.
    ///
    /// The mods must match the ones the difficulty attributes were calculated
    /// with, otherwise the values are off.
    pub const fn mods(mut self, mods: u32) -> Self {
        self.mods = mods;

        self
    }

    /// Use the hitresults and mods of a whole [`ScoreData`] at once.
    pub const fn score(mut self, score: ScoreData) -> Self {
        self.mods = score.mods;
        self.combo = Some(score.max_combo);
        self.n300 = Some(score.n300);
        self.n100 = Some(score.n100);
        self.n50 = Some(score.n50);
        self.misses = score.misses;

        self
    }

    /// Specify the max combo of the play.
    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    /// Specify the amount of 300s of a play.
    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    /// Specify the amount of 100s of a play.
    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    /// Specify the amount of 50s of a play.
    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

    /// Specify the amount of misses of a play.
    pub const fn misses(mut self, misses: u32) -> Self {
        self.misses = misses;

        self
    }

    /// Specify the accuracy of a play between `0.0` and `1.0`.
    ///
    /// Explicit hitresult counts take precedence; the accuracy is only used
    /// to fill in the buckets that were not given.
    pub const fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc);

        self
    }

    /// Calculate all performance related values.
    pub fn calculate(self) -> Result<PerformanceAttributes, Error> {
        self.validate_attrs()?;

        let state = self.generate_hitresults()?;
        let effective_miss_count = calculate_effective_misses(&self.attrs, &state);

        Ok(
            PerformanceCalculator::new(self.attrs, self.mods, state, effective_miss_count)
                .calculate(),
        )
    }

    fn validate_attrs(&self) -> Result<(), Error> {
        let ratings = [
            self.attrs.aim,
            self.attrs.speed,
            self.attrs.slider_factor,
            self.attrs.stars,
            self.attrs.aim_difficult_slider_count,
            self.attrs.aim_difficult_strain_count,
            self.attrs.speed_note_count,
            self.attrs.speed_difficult_strain_count,
        ];

        if ratings.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(Error::InvalidAttributes(
                "difficulty ratings must be finite and non-negative",
            ));
        }

        let windows = [
            self.attrs.great_hit_window,
            self.attrs.ok_hit_window,
            self.attrs.meh_hit_window,
        ];

        if windows.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(Error::InvalidAttributes(
                "hit windows must be finite and non-negative",
            ));
        }

        // AR and OD may legitimately go negative after clock rate
        // adjustment, so only their finiteness is checked.
        if !(self.attrs.ar.is_finite() && self.attrs.od.is_finite()) {
            return Err(Error::InvalidAttributes("AR and OD must be finite"));
        }

        Ok(())
    }

    /// Distribute the map's objects onto hitresults, honoring explicit counts
    /// first and the target accuracy for the rest.
    fn generate_hitresults(&self) -> Result<ScoreData, Error> {
        let n_objects = self.attrs.n_objects();

        if let Some(acc) = self.acc {
            if !(0.0..=1.0).contains(&acc) {
                return Err(Error::InvalidScoreData(
                    "accuracy must be between 0.0 and 1.0",
                ));
            }
        }

        if self.misses > n_objects {
            return Err(Error::InvalidScoreData("more misses than objects"));
        }

        let n_remaining = n_objects - self.misses;

        let (n300, n100, n50) = match (self.n300, self.n100, self.n50) {
            (n300, n100, n50) if n300.is_some() || n100.is_some() || n50.is_some() => {
                let given: u32 = [n300, n100, n50].iter().flatten().sum();

                let Some(remainder) = n_remaining.checked_sub(given) else {
                    return Err(Error::InvalidScoreData("more hitresults than objects"));
                };

                // The first unset bucket absorbs whatever is left.
                match (n300, n100, n50) {
                    (None, n100, n50) => {
                        (remainder, n100.unwrap_or(0), n50.unwrap_or(0))
                    }
                    (Some(n300), None, n50) => (n300, remainder, n50.unwrap_or(0)),
                    (Some(n300), Some(n100), None) => (n300, n100, remainder),
                    (Some(n300), Some(n100), Some(n50)) => {
                        if remainder > 0 {
                            return Err(Error::InvalidScoreData(
                                "hitresults do not add up to the object count",
                            ));
                        }

                        (n300, n100, n50)
                    }
                }
            }
            _ => {
                let acc = self.acc.unwrap_or(1.0);

                // With no 50s, `6 * n300 + 2 * n100 = 6 * acc * n_objects`
                // solves to the following.
                let raw_n100 = 1.5 * (f64::from(n_remaining) - acc * f64::from(n_objects));

                if raw_n100 > f64::from(n_remaining) {
                    // Even all-100s sit above the target accuracy, so the
                    // rest spills into 50s: with no 300s the equation
                    // becomes `2 * n100 + n50 = 6 * acc * n_objects`.
                    let raw_n100 = 6.0 * acc * f64::from(n_objects) - f64::from(n_remaining);
                    let n100 = cmp::min(raw_n100.round().max(0.0) as u32, n_remaining);

                    (0, n100, n_remaining - n100)
                } else {
                    let n100 = cmp::min(raw_n100.round().max(0.0) as u32, n_remaining);

                    (n_remaining - n100, n100, 0)
                }
            }
        };

        let max_combo = match self.combo {
            Some(combo) => {
                if combo > self.attrs.max_combo {
                    return Err(Error::InvalidScoreData(
                        "combo exceeds the map's maximum combo",
                    ));
                }

                combo
            }
            None => self.attrs.max_combo.saturating_sub(self.misses),
        };

        Ok(ScoreData {
            mods: self.mods,
            max_combo,
            n300,
            n100,
            n50,
            misses: self.misses,
        })
    }
}

impl From<DifficultyAttributes> for Performance {
    fn from(attrs: DifficultyAttributes) -> Self {
        Self::new(attrs)
    }
}

fn calculate_effective_misses(attrs: &DifficultyAttributes, state: &ScoreData) -> f64 {
    // * Guess the number of misses + slider breaks from combo
    let mut combo_based_miss_count = 0.0;

    if attrs.n_sliders > 0 {
        let full_combo_threshold = f64::from(attrs.max_combo) - 0.1 * f64::from(attrs.n_sliders);

        if f64::from(state.max_combo) < full_combo_threshold {
            combo_based_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
        }
    }

    // * Clamp miss count to maximum amount of possible breaks
    combo_based_miss_count =
        combo_based_miss_count.min(f64::from(state.n100 + state.n50 + state.misses));

    combo_based_miss_count.max(f64::from(state.misses))
}
