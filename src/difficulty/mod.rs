use std::cmp;

use crate::{
    attributes::{DifficultyAttributes, Strains},
    error::Error,
    model::hit_object::{HitObject, HitObjectKind, HitObjects},
    util::{difficulty::difficulty_range, mods::Mods, sync::CancellationToken},
};

use self::{
    object::DifficultyObject,
    scaling_factor::ScalingFactor,
    skills::{strain::SECTION_LENGTH, Skills},
    stacking::apply_stacking,
};

pub mod gradual;
pub mod object;
pub mod scaling_factor;
pub mod skills;
mod stacking;

const DIFFICULTY_MULTIPLIER: f64 = 0.0675;

/// Weight of the imbalance between the two skills in the final star rating.
const STAR_MIXING_FACTOR: f64 = 0.5;

/// Difficulty calculator on maps.
///
/// Map settings default to 5.0 and are meant to be overridden with the values
/// of the processed map.
///
/// # Example
///
/// ```
/// use nova_pp::{Difficulty, model::hit_object::HitObjects};
///
/// let objects = HitObjects::new(Vec::new())?;
///
/// let attrs = Difficulty::new()
///     .cs(4.2)
///     .ar(9.3)
///     .od(8.8)
///     .mods(8 + 64) // HDDT
///     .calculate(&objects)?;
/// # Ok::<(), nova_pp::Error>(())
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct Difficulty {
    mods: u32,
    cs: f64,
    ar: f64,
    od: f64,
    stack_leniency: f64,
    clock_rate: Option<f64>,
    passed_objects: Option<u32>,
    cancellation: Option<CancellationToken>,
}

impl Difficulty {
    pub fn new() -> Self {
        Self {
            mods: 0,
            cs: 5.0,
            ar: 5.0,
            od: 5.0,
            stack_leniency: 0.7,
            clock_rate: None,
            passed_objects: None,
            cancellation: None,
        }
    }

    /// Specify mods through their legacy bit values.
    ///
    /// See [https://github.com/ppy/osu-api/wiki#mods](https://github.com/ppy/osu-api/wiki#mods)
    pub const fn mods(mut self, mods: u32) -> Self {
        self.mods = mods;

        self
    }

    /// The circle size of the map before mods, clamped to `[0, 10]`.
    pub fn cs(mut self, cs: f64) -> Self {
        self.cs = cs.clamp(0.0, 10.0);

        self
    }

    /// The approach rate of the map before mods, clamped to `[0, 10]`.
    pub fn ar(mut self, ar: f64) -> Self {
        self.ar = ar.clamp(0.0, 10.0);

        self
    }

    /// The overall difficulty of the map before mods, clamped to `[0, 10]`.
    pub fn od(mut self, od: f64) -> Self {
        self.od = od.clamp(0.0, 10.0);

        self
    }

    /// The stack leniency of the map, clamped to `[0, 1]`. Defaults to `0.7`.
    pub fn stack_leniency(mut self, stack_leniency: f64) -> Self {
        self.stack_leniency = stack_leniency.clamp(0.0, 1.0);

        self
    }

    /// Adjust the clock rate used in the calculation, overriding the rate the
    /// mods imply. Clamped to `[0.01, 100]`.
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.clock_rate = Some(clock_rate.clamp(0.01, 100.0));

        self
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub const fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.passed_objects = Some(passed_objects);

        self
    }

    /// A token to cooperatively abort the calculation from another thread.
    ///
    /// If the token is cancelled while a calculation runs, the calculation
    /// bails with [`Error::Cancelled`] at the next object boundary.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);

        self
    }

    /// Perform the difficulty calculation.
    ///
    /// The only possible error is [`Error::Cancelled`] and only if a
    /// [`cancellation_token`] was given.
    ///
    /// [`cancellation_token`]: Self::cancellation_token
    pub fn calculate(&self, objects: &HitObjects) -> Result<DifficultyAttributes, Error> {
        let values = DifficultyValues::calculate(self, objects)?;
        let mut attrs = values.attrs;
        DifficultyValues::eval(&mut attrs, self.mods, &values.skills);

        Ok(attrs)
    }

    /// Perform the difficulty calculation but instead of evaluating strain
    /// values, return the strain peaks of each section as is.
    ///
    /// Suitable to plot the difficulty of a map over time.
    pub fn strains(&self, objects: &HitObjects) -> Result<Strains, Error> {
        let values = DifficultyValues::calculate(self, objects)?;
        let Skills {
            aim,
            aim_no_sliders,
            speed,
        } = values.skills;

        Ok(Strains {
            section_length: SECTION_LENGTH,
            aim: aim.state.current_strain_peaks(),
            aim_no_sliders: aim_no_sliders.state.current_strain_peaks(),
            speed: speed.state.current_strain_peaks(),
        })
    }

    pub(crate) fn get_clock_rate(&self) -> f64 {
        self.clock_rate.unwrap_or_else(|| self.mods.clock_rate())
    }

    pub(crate) fn get_passed_objects(&self, objects: &HitObjects) -> usize {
        self.passed_objects
            .map_or(objects.len(), |n| cmp::min(n as usize, objects.len()))
    }

    pub(crate) const fn get_mods(&self) -> u32 {
        self.mods
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new()
    }
}

/// Map properties after applying mods and clock rate, shared by full and
/// gradual calculation.
pub(crate) struct DifficultySetup {
    pub scaling_factor: ScalingFactor,
    pub attrs: DifficultyAttributes,
    /// Approach duration in raw beatmap time, before the clock rate.
    pub time_preempt_raw: f64,
    pub stack_leniency: f64,
}

impl DifficultySetup {
    pub fn new(difficulty: &Difficulty) -> Self {
        let mods = difficulty.get_mods();
        let clock_rate = difficulty.get_clock_rate();

        let cs = (difficulty.cs * mods.cs_multiplier()).min(10.0);
        let ar = (difficulty.ar * mods.od_ar_multiplier()).min(10.0);
        let od = (difficulty.od * mods.od_ar_multiplier()).min(10.0);

        let scaling_factor = ScalingFactor::new(cs);

        let time_preempt_raw = difficulty_range(ar, 1800.0, 1200.0, 450.0);
        let time_preempt = time_preempt_raw / clock_rate;

        let great_hit_window = difficulty_range(od, 80.0, 50.0, 20.0) / clock_rate;
        let ok_hit_window = difficulty_range(od, 140.0, 100.0, 60.0) / clock_rate;
        let meh_hit_window = difficulty_range(od, 200.0, 150.0, 100.0) / clock_rate;

        let attrs = DifficultyAttributes {
            // Back-derived so the attributes reflect the clock rate.
            ar: if time_preempt > 1200.0 {
                (1800.0 - time_preempt) / 120.0
            } else {
                (1200.0 - time_preempt) / 150.0 + 5.0
            },
            od: (80.0 - great_hit_window) / 6.0,
            great_hit_window,
            ok_hit_window,
            meh_hit_window,
            ..Default::default()
        };

        Self {
            scaling_factor,
            attrs,
            time_preempt_raw,
            stack_leniency: difficulty.stack_leniency,
        }
    }

    /// Working copy of the map with stacking resolved and slider cursor
    /// paths walked. Object counts of the passed prefix land in `attrs`.
    pub fn prepare_objects(
        &mut self,
        difficulty: &Difficulty,
        objects: &HitObjects,
    ) -> Vec<HitObject> {
        let mut prepared: Vec<HitObject> = objects.iter().cloned().collect();

        apply_stacking(&mut prepared, self.time_preempt_raw * self.stack_leniency);

        for h in prepared.iter_mut() {
            h.stack_offset = self.scaling_factor.stack_offset(h.stack_height);
            DifficultyObject::compute_slider_cursor_pos(h, self.scaling_factor.radius);
        }

        let take = difficulty.get_passed_objects(objects);

        for h in prepared.iter().take(take) {
            match h.kind {
                HitObjectKind::Circle => self.attrs.n_circles += 1,
                HitObjectKind::Slider(ref slider) => {
                    self.attrs.n_sliders += 1;
                    self.attrs.max_combo += slider.nested_objects.len() as u32;
                }
                HitObjectKind::Spinner { .. } => self.attrs.n_spinners += 1,
            }

            self.attrs.max_combo += 1;
        }

        prepared
    }
}

pub(crate) struct DifficultyValues {
    pub skills: Skills,
    pub attrs: DifficultyAttributes,
}

impl DifficultyValues {
    pub fn calculate(difficulty: &Difficulty, objects: &HitObjects) -> Result<Self, Error> {
        let mods = difficulty.get_mods();
        let clock_rate = difficulty.get_clock_rate();
        let take = difficulty.get_passed_objects(objects);

        let mut setup = DifficultySetup::new(difficulty);
        let prepared = setup.prepare_objects(difficulty, objects);

        let diff_objects =
            Self::create_difficulty_objects(clock_rate, &setup.scaling_factor, &prepared);

        let mut skills = Skills::new(setup.attrs.great_hit_window, mods.ap());

        // The first hit object has no difficulty object
        let take_diff_objects = cmp::min(prepared.len(), take).saturating_sub(1);

        for curr in diff_objects.iter().take(take_diff_objects) {
            if difficulty.is_cancelled() {
                return Err(Error::Cancelled);
            }

            skills.process(curr, &diff_objects);
        }

        Ok(Self {
            skills,
            attrs: setup.attrs,
        })
    }

    /// Process the skill values and store the results in `attrs`.
    pub fn eval(attrs: &mut DifficultyAttributes, mods: u32, skills: &Skills) {
        let aim_difficulty_value = skills.aim.difficulty_value();
        let aim_no_sliders_difficulty_value = skills.aim_no_sliders.difficulty_value();
        let speed_difficulty_value = skills.speed.difficulty_value();

        let mut aim_rating = aim_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        let aim_rating_no_sliders =
            aim_no_sliders_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;
        let mut speed_rating = speed_difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER;

        let slider_factor = if aim_rating > 0.0 {
            aim_rating_no_sliders / aim_rating
        } else {
            1.0
        };

        if mods.td() {
            aim_rating = aim_rating.powf(0.8);
        }

        if mods.rx() {
            aim_rating *= 0.9;
            speed_rating = 0.0;
        }

        if mods.ap() {
            speed_rating *= 0.5;
            aim_rating = 0.0;
        }

        // Monotone in both skills; a map with only one relevant skill rates
        // as exactly that skill plus half of itself through the mixing term.
        let stars = aim_rating
            + speed_rating
            + (aim_rating - speed_rating).abs() * STAR_MIXING_FACTOR;

        attrs.aim = aim_rating;
        attrs.speed = speed_rating;
        attrs.slider_factor = slider_factor;
        attrs.aim_difficult_slider_count = skills.aim.difficult_sliders();
        attrs.aim_difficult_strain_count = skills
            .aim
            .count_top_weighted_strains(aim_difficulty_value);
        attrs.speed_note_count = skills.speed.relevant_note_count();
        attrs.speed_difficult_strain_count = skills
            .speed
            .count_top_weighted_strains(speed_difficulty_value);
        attrs.stars = stars;
    }

    pub fn create_difficulty_objects(
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
        prepared: &[HitObject],
    ) -> Vec<DifficultyObject> {
        let mut prepared_iter = prepared.iter();

        let Some(mut last) = prepared_iter.next() else {
            return Vec::new();
        };

        let mut last_last = None;

        prepared_iter
            .enumerate()
            .map(|(idx, h)| {
                let diff_object =
                    DifficultyObject::new(h, last, last_last, clock_rate, idx, scaling_factor);

                last_last = Some(last);
                last = h;

                diff_object
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::pos::Pos;

    fn short_map() -> HitObjects {
        HitObjects::new(vec![
            HitObject::circle(Pos::new(100.0, 100.0), 0.0),
            HitObject::circle(Pos::new(200.0, 100.0), 200.0),
            HitObject::circle(Pos::new(200.0, 200.0), 400.0),
            HitObject::circle(Pos::new(100.0, 200.0), 600.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_map_rates_zero() {
        let attrs = Difficulty::new()
            .calculate(&HitObjects::new(Vec::new()).unwrap())
            .unwrap();

        assert!(attrs.stars.abs() < f64::EPSILON);
        assert!(attrs.aim.abs() < f64::EPSILON);
        assert!(attrs.speed.abs() < f64::EPSILON);
        assert_eq!(attrs.max_combo, 0);
    }

    #[test]
    fn calculation_is_deterministic() {
        let objects = short_map();
        let difficulty = Difficulty::new().cs(4.0).ar(9.0).od(8.5);

        let first = difficulty.calculate(&objects).unwrap();
        let second = difficulty.calculate(&objects).unwrap();

        assert_eq!(first, second);
        assert!(first.stars > 0.0);
        assert_eq!(first.max_combo, 4);
    }

    #[test]
    fn star_rating_mixes_both_skills() {
        let attrs = Difficulty::new().calculate(&short_map()).unwrap();

        let expected = attrs.aim
            + attrs.speed
            + (attrs.aim - attrs.speed).abs() * STAR_MIXING_FACTOR;

        assert!((attrs.stars - expected).abs() < 1e-12);
    }

    #[test]
    fn relax_zeroes_speed() {
        let attrs = Difficulty::new().mods(1 << 7).calculate(&short_map()).unwrap();

        assert!(attrs.speed.abs() < f64::EPSILON);
        assert!(attrs.stars > 0.0);
    }

    #[test]
    fn passed_objects_limit_the_prefix() {
        let objects = short_map();

        let partial = Difficulty::new()
            .passed_objects(2)
            .calculate(&objects)
            .unwrap();
        let full = Difficulty::new().calculate(&objects).unwrap();

        assert_eq!(partial.max_combo, 2);
        assert!(partial.stars <= full.stars);
    }

    #[test]
    fn cancelled_token_aborts() {
        let token = CancellationToken::new();
        token.cancel();

        let res = Difficulty::new()
            .cancellation_token(token)
            .calculate(&short_map());

        assert_eq!(res, Err(Error::Cancelled));
    }

    #[test]
    fn clock_rate_raises_difficulty() {
        let objects = short_map();

        let nomod = Difficulty::new().calculate(&objects).unwrap();
        let dt = Difficulty::new().clock_rate(1.5).calculate(&objects).unwrap();

        assert!(dt.speed > nomod.speed);
    }
}
