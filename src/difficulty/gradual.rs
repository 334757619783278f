use crate::{
    attributes::DifficultyAttributes,
    error::Error,
    model::hit_object::{HitObject, HitObjectKind, HitObjects},
    util::{mods::Mods, sync::CancellationToken},
};

use super::{object::DifficultyObject, skills::Skills, Difficulty, DifficultySetup, DifficultyValues};

/// The rolling state of a gradual difficulty calculation.
///
/// Holds everything the strain simulation carries between objects, so a
/// snapshot of this state plus the same map and settings is enough to resume
/// the calculation later without replaying the prefix.
#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyState {
    pub(crate) skills: Skills,
    pub(crate) attrs: DifficultyAttributes,
    /// Number of hit objects already consumed.
    pub(crate) processed: usize,
}

impl DifficultyState {
    /// Number of hit objects already consumed.
    pub const fn processed(&self) -> usize {
        self.processed
    }
}

/// Gradually calculate the difficulty attributes of a map.
///
/// Advancing by one hit object yields the attributes of the map prefix up to
/// and including that object, as if the map ended there. Note that this is
/// considerably more expensive than a plain [`Difficulty`] calculation since
/// the skill values are evaluated on every step.
///
/// Alternatively to iterating, [`process_to`] jumps to a target object count
/// under a [`CancellationToken`]; a cancelled call leaves the committed state
/// untouched so the exact same call can simply be retried.
///
/// # Example
///
/// ```
/// use nova_pp::{Difficulty, GradualDifficulty, model::hit_object::HitObjects};
///
/// let objects = HitObjects::new(Vec::new())?;
/// let mut gradual = GradualDifficulty::new(Difficulty::new().ar(9.0), &objects);
///
/// for attrs in gradual.by_ref().take(2) {
///     println!("stars: {}", attrs.stars);
/// }
/// # Ok::<(), nova_pp::Error>(())
/// ```
///
/// [`process_to`]: GradualDifficulty::process_to
pub struct GradualDifficulty {
    mods: u32,
    prepared: Vec<HitObject>,
    diff_objects: Vec<DifficultyObject>,
    state: DifficultyState,
}

impl GradualDifficulty {
    pub fn new(difficulty: Difficulty, objects: &HitObjects) -> Self {
        let mods = difficulty.get_mods();
        let clock_rate = difficulty.get_clock_rate();

        let mut setup = DifficultySetup::new(&difficulty);

        let prepared = setup.prepare_objects(&difficulty.clone().passed_objects(0), objects);

        // The gradual prefix grows towards the whole map, so counts start at
        // zero and are bumped as objects are consumed.
        let attrs = setup.attrs;

        let diff_objects = DifficultyValues::create_difficulty_objects(
            clock_rate,
            &setup.scaling_factor,
            &prepared,
        );

        let skills = Skills::new(attrs.great_hit_window, mods.ap());

        Self {
            mods,
            prepared,
            diff_objects,
            state: DifficultyState {
                skills,
                attrs,
                processed: 0,
            },
        }
    }

    /// Restore a gradual calculation from a previously taken [`state`] and
    /// the same map and settings it was taken from.
    ///
    /// [`state`]: GradualDifficulty::state
    pub fn with_state(
        difficulty: Difficulty,
        objects: &HitObjects,
        state: DifficultyState,
    ) -> Self {
        let mut this = Self::new(difficulty, objects);
        this.state = state;

        this
    }

    /// The committed state, suitable to snapshot and [`resume from`] later.
    ///
    /// [`resume from`]: GradualDifficulty::with_state
    pub const fn state(&self) -> &DifficultyState {
        &self.state
    }

    /// The total amount of hit objects of the map.
    pub fn n_objects(&self) -> usize {
        self.prepared.len()
    }

    /// Advance the calculation to the prefix of `k` hit objects and return
    /// the attributes of that prefix.
    ///
    /// `k` is clamped to the length of the map. The calculation only ever
    /// moves forward; requesting a smaller `k` than a previous call is a
    /// contract violation and panics.
    ///
    /// Work happens on a scratch copy of the state which is committed only on
    /// success, so after an [`Error::Cancelled`] the state still reflects the
    /// last successful call and the request can be retried as is.
    pub fn process_to(
        &mut self,
        k: usize,
        token: &CancellationToken,
    ) -> Result<DifficultyAttributes, Error> {
        let k = k.min(self.prepared.len());

        assert!(
            k >= self.state.processed,
            "a gradual calculation cannot move backwards \
            (requested {k} but {} objects are already processed)",
            self.state.processed,
        );

        let mut working = self.state.clone();

        while working.processed < k {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            Self::advance_one(&mut working, &self.prepared, &self.diff_objects);
        }

        let mut attrs = working.attrs.clone();
        DifficultyValues::eval(&mut attrs, self.mods, &working.skills);

        self.state = working;

        Ok(attrs)
    }

    fn advance_one(
        state: &mut DifficultyState,
        prepared: &[HitObject],
        diff_objects: &[DifficultyObject],
    ) {
        let i = state.processed;

        // The first hit object has no difficulty object
        if let Some(idx) = i.checked_sub(1) {
            state.skills.process(&diff_objects[idx], diff_objects);
        }

        match prepared[i].kind {
            HitObjectKind::Circle => state.attrs.n_circles += 1,
            HitObjectKind::Slider(ref slider) => {
                state.attrs.n_sliders += 1;
                state.attrs.max_combo += slider.nested_objects.len() as u32;
            }
            HitObjectKind::Spinner { .. } => state.attrs.n_spinners += 1,
        }

        state.attrs.max_combo += 1;
        state.processed += 1;
    }
}

impl Iterator for GradualDifficulty {
    type Item = DifficultyAttributes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.processed >= self.prepared.len() {
            return None;
        }

        Self::advance_one(&mut self.state, &self.prepared, &self.diff_objects);

        let mut attrs = self.state.attrs.clone();
        DifficultyValues::eval(&mut attrs, self.mods, &self.state.skills);

        Some(attrs)
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        // Skip the in-between prefixes without evaluating them.
        let skip = n.min(self.len());

        for _ in 0..skip {
            if self.state.processed >= self.prepared.len() {
                return None;
            }

            Self::advance_one(&mut self.state, &self.prepared, &self.diff_objects);
        }

        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();

        (len, Some(len))
    }
}

impl ExactSizeIterator for GradualDifficulty {
    fn len(&self) -> usize {
        self.prepared.len() - self.state.processed
    }
}
