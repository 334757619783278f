use std::f64::consts::PI;

use crate::{
    attributes::{DifficultyAttributes, PerformanceAttributes},
    difficulty::skills::strain::difficulty_to_performance,
    model::score::ScoreData,
    util::{
        difficulty::reverse_lerp,
        float_ext::FloatExt,
        mods::Mods,
        special_functions::{erf, erf_inv},
    },
};

// * This is being adjusted to keep the final pp value scaled around what it used to be when changing things.
pub const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

pub(super) struct PerformanceCalculator {
    attrs: DifficultyAttributes,
    mods: u32,
    acc: f64,
    state: ScoreData,
    effective_miss_count: f64,
}

impl PerformanceCalculator {
    pub fn new(
        attrs: DifficultyAttributes,
        mods: u32,
        state: ScoreData,
        effective_miss_count: f64,
    ) -> Self {
        Self {
            attrs,
            mods,
            acc: state.accuracy(),
            state,
            effective_miss_count,
        }
    }

    pub fn calculate(mut self) -> PerformanceAttributes {
        let total_hits = self.state.total_hits();

        if total_hits == 0 {
            return PerformanceAttributes {
                difficulty: self.attrs,
                ..Default::default()
            };
        }

        let total_hits = f64::from(total_hits);

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.mods.so() && total_hits > 0.0 {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / total_hits).powf(0.85);
        }

        if self.mods.rx() {
            let od = self.attrs.od;

            // * we use OD13.3 as maximum since it's the value at which great hitwidow becomes 0
            // * this is well beyond currently maximum achievable OD which is 12.17 (DTx2 + DA with OD11)
            let (n100_mult, n50_mult) = if od > 0.0 {
                (
                    (1.0 - (od / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (od / 13.33).powf(5.0)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            // * As we're adding Oks and Mehs to an approximated number of combo breaks the result can be
            // * higher than total hits in specific scenarios (which breaks some calculations) so we need to clamp it.
            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.state.n100) * n100_mult
                + f64::from(self.state.n50) * n50_mult)
                .min(total_hits);
        }

        let speed_deviation = self.calculate_speed_deviation();

        let aim_value = self.compute_aim_value();
        let speed_value = self.compute_speed_value(speed_deviation);
        let acc_value = self.compute_accuracy_value();

        let pp = (aim_value.powf(1.1) + speed_value.powf(1.1) + acc_value.powf(1.1))
            .powf(1.0 / 1.1)
            * multiplier;

        PerformanceAttributes {
            difficulty: self.attrs,
            pp_acc: acc_value,
            pp_aim: aim_value,
            pp_speed: speed_value,
            pp,
            effective_miss_count: self.effective_miss_count,
            speed_deviation,
        }
    }

    fn compute_aim_value(&self) -> f64 {
        if self.mods.ap() {
            return 0.0;
        }

        let mut aim_difficulty = self.attrs.aim;

        if self.attrs.n_sliders > 0 && self.attrs.aim_difficult_slider_count > 0.0 {
            // * We consider all missing combo to be dropped difficult sliders
            let maximum_possible_dropped_sliders =
                f64::from(self.state.n100 + self.state.n50 + self.state.misses);

            let estimate_improperly_followed_difficult_sliders = f64::clamp(
                f64::min(
                    maximum_possible_dropped_sliders,
                    f64::from(self.attrs.max_combo.saturating_sub(self.state.max_combo)),
                ),
                0.0,
                self.attrs.aim_difficult_slider_count,
            );

            let slider_nerf_factor = (1.0 - self.attrs.slider_factor)
                * f64::powf(
                    1.0 - estimate_improperly_followed_difficult_sliders
                        / self.attrs.aim_difficult_slider_count,
                    3.0,
                )
                + self.attrs.slider_factor;
            aim_difficulty *= slider_nerf_factor;
        }

        let mut aim_value = difficulty_to_performance(aim_difficulty);

        let total_hits = self.total_hits();

        let len_bonus = 0.95
            + 0.4 * (total_hits / 2000.0).min(1.0)
            + f64::from(u8::from(total_hits > 2000.0)) * (total_hits / 2000.0).log10() * 0.5;

        aim_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            aim_value *= Self::calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        aim_value *= self.get_combo_scaling_factor();

        let ar_factor = if self.mods.rx() {
            0.0
        } else if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else if self.attrs.ar < 8.0 {
            0.05 * (8.0 - self.attrs.ar)
        } else {
            0.0
        };

        // * Buff for longer maps with high AR.
        aim_value *= 1.0 + ar_factor * len_bonus;

        if self.mods.hd() {
            // * We want to give more reward for lower AR when it comes to aim and HD. This nerfs high AR and buffs lower AR.
            aim_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        aim_value *= self.acc;
        // * It is important to consider accuracy difficulty when scaling with accuracy.
        aim_value *= 0.98 + f64::powf(f64::max(0.0, self.attrs.od), 2.0) / 2500.0;

        aim_value
    }

    fn compute_speed_value(&self, speed_deviation: Option<f64>) -> f64 {
        let Some(speed_deviation) = speed_deviation.filter(|_| !self.mods.rx()) else {
            return 0.0;
        };

        let mut speed_value = difficulty_to_performance(self.attrs.speed);

        let total_hits = self.total_hits();

        let len_bonus = 0.95
            + 0.4 * (total_hits / 2000.0).min(1.0)
            + f64::from(u8::from(total_hits > 2000.0)) * (total_hits / 2000.0).log10() * 0.5;

        speed_value *= len_bonus;

        if self.effective_miss_count > 0.0 {
            speed_value *= Self::calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.speed_difficult_strain_count,
            );
        }

        speed_value *= self.get_combo_scaling_factor();

        let ar_factor = if self.mods.ap() {
            0.0
        } else if self.attrs.ar > 10.33 {
            0.3 * (self.attrs.ar - 10.33)
        } else {
            0.0
        };

        // * Buff for longer maps with high AR.
        speed_value *= 1.0 + ar_factor * len_bonus;

        if self.mods.hd() {
            // * We want to give more reward for lower AR when it comes to aim and HD.
            // * This nerfs high AR and buffs lower AR.
            speed_value *= 1.0 + 0.04 * (12.0 - self.attrs.ar);
        }

        let speed_high_deviation_mult = self.calculate_speed_high_deviation_nerf(speed_deviation);
        speed_value *= speed_high_deviation_mult;

        // * Calculate accuracy assuming the worst case scenario
        let relevant_total_diff = f64::max(0.0, total_hits - self.attrs.speed_note_count);
        let relevant_n300 = (f64::from(self.state.n300) - relevant_total_diff).max(0.0);
        let relevant_n100 = (f64::from(self.state.n100)
            - (relevant_total_diff - f64::from(self.state.n300)).max(0.0))
        .max(0.0);
        let relevant_n50 = (f64::from(self.state.n50)
            - (relevant_total_diff - f64::from(self.state.n300 + self.state.n100)).max(0.0))
        .max(0.0);

        let relevant_acc = if self.attrs.speed_note_count.eq(0.0) {
            0.0
        } else {
            (relevant_n300 * 6.0 + relevant_n100 * 2.0 + relevant_n50)
                / (self.attrs.speed_note_count * 6.0)
        };

        let od = self.attrs.od;

        // * Scale the speed value with accuracy and OD.
        speed_value *= (0.95 + f64::powf(f64::max(0.0, od), 2.0) / 750.0)
            * f64::powf((self.acc + relevant_acc) / 2.0, (14.5 - od) / 2.0);

        speed_value
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        // * This percentage only considers HitCircles of any value - in this part
        // * of the calculation we focus on hitting the timing hit window.
        let amount_hit_objects_with_acc = self.attrs.n_circles;

        let mut better_acc_percentage = if amount_hit_objects_with_acc > 0 {
            f64::from(
                (self.state.n300 as i32
                    - (i32::max(
                        self.state.total_hits() as i32 - amount_hit_objects_with_acc as i32,
                        0,
                    )))
                    * 6
                    + self.state.n100 as i32 * 2
                    + self.state.n50 as i32,
            ) / f64::from(amount_hit_objects_with_acc * 6)
        } else {
            0.0
        };

        // * It is possible to reach a negative accuracy with this formula. Cap it at zero - zero points.
        if better_acc_percentage < 0.0 {
            better_acc_percentage = 0.0;
        }

        // * Lots of arbitrary values from testing.
        // * Considering to use derivation from perfect accuracy in a probabilistic manner - assume normal distribution.
        let mut acc_value = 1.52163_f64.powf(self.attrs.od) * better_acc_percentage.powf(24.0) * 2.83;

        // * Bonus for many hitcircles - it's harder to keep good accuracy up for longer.
        acc_value *= (f64::from(amount_hit_objects_with_acc) / 1000.0)
            .powf(0.3)
            .min(1.15);

        if self.mods.hd() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn calculate_speed_deviation(&self) -> Option<f64> {
        if self.state.total_successful_hits() == 0 {
            return None;
        }

        // * Calculate accuracy assuming the worst case scenario
        let mut speed_note_count = self.attrs.speed_note_count;
        speed_note_count +=
            (f64::from(self.state.total_hits()) - self.attrs.speed_note_count) * 0.1;

        // * Assume worst case: all mistakes were on speed notes
        let relevant_count_miss = f64::min(f64::from(self.state.misses), speed_note_count);
        let relevant_count_meh = f64::min(
            f64::from(self.state.n50),
            speed_note_count - relevant_count_miss,
        );
        let relevant_count_ok = f64::min(
            f64::from(self.state.n100),
            speed_note_count - relevant_count_miss - relevant_count_meh,
        );
        let relevant_count_great = f64::max(
            0.0,
            speed_note_count - relevant_count_miss - relevant_count_meh - relevant_count_ok,
        );

        self.calculate_deviation(
            relevant_count_great,
            relevant_count_ok,
            relevant_count_meh,
            relevant_count_miss,
        )
    }

    fn calculate_deviation(
        &self,
        relevant_count_great: f64,
        relevant_count_ok: f64,
        relevant_count_meh: f64,
        relevant_count_miss: f64,
    ) -> Option<f64> {
        if relevant_count_great + relevant_count_ok + relevant_count_meh <= 0.0 {
            return None;
        }

        let object_count =
            relevant_count_great + relevant_count_ok + relevant_count_meh + relevant_count_miss;

        // * The probability that a player hits a circle is unknown, but we can estimate it to be
        // * the number of greats on circles divided by the number of circles, and then add one
        // * to the number of circles as a bias correction.

        let n = f64::max(1.0, object_count - relevant_count_miss - relevant_count_meh);

        #[allow(clippy::items_after_statements, clippy::unreadable_literal)]
        const Z: f64 = 2.32634787404; // * 99% critical value for the normal distribution (one-tailed).

        // * Proportion of greats hit on circles, ignoring misses and 50s.
        let p = relevant_count_great / n;

        // * We can be 99% confident that p is at least this value.
        let p_lower_bound = (n * p + Z * Z / 2.0) / (n + Z * Z)
            - Z / (n + Z * Z) * f64::sqrt(n * p * (1.0 - p) + Z * Z / 4.0);

        let great_hit_window = self.attrs.great_hit_window;
        let ok_hit_window = self.attrs.ok_hit_window;
        let meh_hit_window = self.attrs.meh_hit_window;

        // * Compute the deviation assuming greats and oks are normally distributed, and mehs are uniformly distributed.
        // * Begin with greats and oks first. Ignoring mehs, we can be 99% confident that the deviation is not higher than:
        let mut deviation = great_hit_window / (f64::sqrt(2.0) * erf_inv(p_lower_bound));

        let random_value = f64::sqrt(2.0 / PI)
            * ok_hit_window
            * f64::exp(-0.5 * f64::powf(ok_hit_window / deviation, 2.0))
            / (deviation * erf(ok_hit_window / (f64::sqrt(2.0) * deviation)));

        deviation *= f64::sqrt(1.0 - random_value);

        // * Value deviation approach as greatCount approaches 0
        let limit_value = ok_hit_window / f64::sqrt(3.0);

        // * If precision is not enough to compute true deviation - use limit value
        if p_lower_bound == 0.0 || random_value >= 1.0 || deviation > limit_value {
            deviation = limit_value;
        }

        // * Then compute the variance for mehs.
        let meh_variance = (meh_hit_window * meh_hit_window
            + ok_hit_window * meh_hit_window
            + ok_hit_window * ok_hit_window)
            / 3.0;

        // * Find the total deviation.
        let deviation = f64::sqrt(
            ((relevant_count_great + relevant_count_ok) * f64::powf(deviation, 2.0)
                + relevant_count_meh * meh_variance)
                / (relevant_count_great + relevant_count_ok + relevant_count_meh),
        );

        Some(deviation)
    }

    fn calculate_speed_high_deviation_nerf(&self, speed_deviation: f64) -> f64 {
        let speed_value = difficulty_to_performance(self.attrs.speed);

        // * Decides a point where the PP value achieved compared to the speed deviation is assumed to be tapped improperly. Any PP above this point is considered "excess" speed difficulty.
        // * This is used to cause PP above the cutoff to scale logarithmically towards the original speed value thus nerfing the value.
        let excess_speed_difficulty_cutoff =
            100.0 + 220.0 * f64::powf(22.0 / speed_deviation, 6.5);

        if speed_value <= excess_speed_difficulty_cutoff {
            return 1.0;
        }

        #[allow(clippy::items_after_statements)]
        const SCALE: f64 = 50.0;

        let mut adjusted_speed_value = SCALE
            * (f64::ln((speed_value - excess_speed_difficulty_cutoff) / SCALE + 1.0)
                + excess_speed_difficulty_cutoff / SCALE);

        // * 220 UR and less are considered tapped correctly to ensure that normal scores will be punished as little as possible
        let lerp = 1.0 - reverse_lerp(speed_deviation, 22.0, 27.0);
        adjusted_speed_value = f64::lerp(adjusted_speed_value, speed_value, lerp);

        adjusted_speed_value / speed_value
    }

    fn get_combo_scaling_factor(&self) -> f64 {
        if self.attrs.max_combo == 0 {
            1.0
        } else {
            (f64::from(self.state.max_combo).powf(0.8) / f64::from(self.attrs.max_combo).powf(0.8))
                .min(1.0)
        }
    }

    // * Miss penalty assumes that a player will miss on the hardest parts of a map,
    // * so we use the amount of relatively difficult sections to adjust miss penalty
    // * to make it more punishing on maps with lower amount of hard sections.
    fn calculate_miss_penalty(miss_count: f64, diff_strain_count: f64) -> f64 {
        0.96 / ((miss_count / (4.0 * diff_strain_count.ln().powf(0.94))) + 1.0)
    }

    const fn total_hits(&self) -> f64 {
        self.state.total_hits() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> DifficultyAttributes {
        DifficultyAttributes {
            aim: 2.2,
            speed: 1.9,
            slider_factor: 0.98,
            aim_difficult_slider_count: 20.0,
            aim_difficult_strain_count: 45.0,
            speed_note_count: 210.0,
            speed_difficult_strain_count: 40.0,
            ar: 9.3,
            od: 8.8,
            great_hit_window: 27.2,
            ok_hit_window: 69.6,
            meh_hit_window: 112.0,
            n_circles: 320,
            n_sliders: 140,
            n_spinners: 1,
            max_combo: 700,
            stars: 5.6,
        }
    }

    fn calc(state: ScoreData) -> PerformanceAttributes {
        let effective = super::super::calculate_effective_misses(&attrs(), &state);

        PerformanceCalculator::new(attrs(), state.mods, state, effective).calculate()
    }

    fn fc(n300: u32, n100: u32) -> ScoreData {
        ScoreData {
            max_combo: 700,
            n300,
            n100,
            ..Default::default()
        }
    }

    #[test]
    fn empty_score_is_worth_nothing() {
        let perf = calc(ScoreData::default());

        assert!(perf.pp.abs() < f64::EPSILON);
    }

    #[test]
    fn better_accuracy_is_worth_more() {
        let clean = calc(fc(461, 0));
        let sloppy = calc(fc(441, 20));

        assert!(clean.pp > sloppy.pp);
        assert!(clean.pp_acc > sloppy.pp_acc);
    }

    #[test]
    fn misses_never_pay_off() {
        let full = calc(fc(461, 0));

        let missed = calc(ScoreData {
            max_combo: 500,
            n300: 459,
            misses: 2,
            ..Default::default()
        });

        assert!(missed.pp < full.pp);
        assert!(missed.effective_miss_count >= 2.0);
    }

    #[test]
    fn hidden_is_a_bonus() {
        let nomod = calc(fc(461, 0));
        let hidden = calc(ScoreData {
            mods: 8,
            ..fc(461, 0)
        });

        assert!(hidden.pp > nomod.pp);
    }

    #[test]
    fn relax_drops_speed_and_accuracy_portions() {
        let relax = calc(ScoreData {
            mods: 1 << 7,
            ..fc(461, 0)
        });

        assert!(relax.pp_speed.abs() < f64::EPSILON);
        assert!(relax.pp_acc.abs() < f64::EPSILON);
        assert!(relax.pp_aim > 0.0);
    }

    #[test]
    fn combo_deficit_scales_down_aim_and_speed() {
        let full = calc(fc(461, 0));
        let choked = calc(ScoreData {
            max_combo: 350,
            ..fc(461, 0)
        });

        assert!(choked.pp_aim < full.pp_aim);
        assert!(choked.pp_speed < full.pp_speed);
        // The accuracy portion only looks at judgments, not combo.
        assert!((choked.pp_acc - full.pp_acc).abs() < f64::EPSILON);
    }

    #[test]
    fn deviation_grows_with_mistakes() {
        let clean = calc(fc(461, 0));
        let sloppy = calc(fc(431, 30));

        let clean_dev = clean.speed_deviation.unwrap();
        let sloppy_dev = sloppy.speed_deviation.unwrap();

        assert!(clean_dev > 0.0);
        assert!(sloppy_dev > clean_dev);
    }

    #[test]
    fn all_misses_have_no_deviation() {
        let perf = calc(ScoreData {
            max_combo: 0,
            misses: 461,
            ..Default::default()
        });

        assert!(perf.speed_deviation.is_none());
        assert!(perf.pp_speed.abs() < f64::EPSILON);
    }
}
