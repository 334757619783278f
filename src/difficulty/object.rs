use crate::{
    model::hit_object::{HitObject, HitObjectKind},
    util::pos::Pos,
};

use super::scaling_factor::ScalingFactor;

/// Discriminant of the wrapped hit object, kept by value so the decorated
/// sequence owns no references into the map.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectClass {
    Circle,
    Slider,
    Spinner,
}

/// A hit object decorated with geometric and temporal features relative to
/// its neighbors.
///
/// Built strictly in index order; later objects may look backward through
/// [`previous`] but never mutate earlier ones.
///
/// [`previous`]: DifficultyObject::previous
#[derive(Clone, Debug, PartialEq)]
pub struct DifficultyObject {
    pub idx: usize,
    pub class: ObjectClass,
    pub start_time: f64,
    pub delta_time: f64,

    pub strain_time: f64,
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub angle: Option<f64>,
}

impl DifficultyObject {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    pub fn new(
        hit_object: &HitObject,
        last_object: &HitObject,
        last_last_object: Option<&HitObject>,
        clock_rate: f64,
        idx: usize,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let delta_time = (hit_object.start_time - last_object.start_time) / clock_rate;
        let start_time = hit_object.start_time / clock_rate;

        // Capped to 25ms to prevent difficulty calculation breaking from
        // near-simultaneous objects.
        let strain_time = delta_time.max(Self::MIN_DELTA_TIME);

        let class = match hit_object.kind {
            HitObjectKind::Circle => ObjectClass::Circle,
            HitObjectKind::Slider(_) => ObjectClass::Slider,
            HitObjectKind::Spinner { .. } => ObjectClass::Spinner,
        };

        let mut this = Self {
            idx,
            class,
            start_time,
            delta_time,
            strain_time,
            lazy_jump_dist: 0.0,
            min_jump_dist: 0.0,
            min_jump_time: 0.0,
            travel_dist: 0.0,
            travel_time: 0.0,
            angle: None,
        };

        this.set_distances(
            hit_object,
            last_object,
            last_last_object,
            clock_rate,
            scaling_factor,
        );

        this
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.class, ObjectClass::Slider)
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.class, ObjectClass::Spinner)
    }

    pub fn previous<'a>(&self, backwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        self.idx
            .checked_sub(backwards_idx + 1)
            .and_then(|idx| diff_objects.get(idx))
    }

    pub fn next<'a>(&self, forwards_idx: usize, diff_objects: &'a [Self]) -> Option<&'a Self> {
        diff_objects.get(self.idx + forwards_idx + 1)
    }

    /// How "cheesable" the jump to this object is by hitting both objects of
    /// a double with a single tap. `0.0` for not cheesable at all, up to
    /// `1.0` the more the current gap undercuts the following one.
    pub fn get_doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        let hit_window = if self.is_spinner() { 0.0 } else { hit_window };

        let curr_delta_time = self.delta_time.max(1.0);
        let next_delta_time = next.delta_time.max(1.0);
        let delta_diff = (next_delta_time - curr_delta_time).abs();
        let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
        let window_ratio = (curr_delta_time / hit_window).min(1.0).powf(2.0);

        1.0 - speed_ratio.powf(1.0 - window_ratio)
    }

    fn set_distances(
        &mut self,
        hit_object: &HitObject,
        last_object: &HitObject,
        last_last_object: Option<&HitObject>,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) {
        if let HitObjectKind::Slider(ref slider) = hit_object.kind {
            self.travel_dist = f64::from(
                slider.lazy_travel_dist
                    * ((1.0 + slider.repeat_count() as f64 / 2.5).powf(1.0 / 2.5)) as f32,
            );

            self.travel_time = (hit_object.lazy_travel_time() / clock_rate).max(Self::MIN_DELTA_TIME);
        }

        if hit_object.is_spinner() || last_object.is_spinner() {
            return;
        }

        let scaling_factor = scaling_factor.factor;

        let last_cursor_pos = Self::get_end_cursor_pos(last_object);

        self.lazy_jump_dist = f64::from(
            (hit_object.stacked_pos() * scaling_factor - last_cursor_pos * scaling_factor).length(),
        );
        self.min_jump_time = self.strain_time;
        self.min_jump_dist = self.lazy_jump_dist;

        if let HitObjectKind::Slider(ref last_slider) = last_object.kind {
            let last_travel_time =
                (last_object.lazy_travel_time() / clock_rate).max(Self::MIN_DELTA_TIME);
            self.min_jump_time = (self.strain_time - last_travel_time).max(Self::MIN_DELTA_TIME);

            // * The cursor doesn't need to travel the full nominal distance:
            // * releasing early anywhere inside the follow radius is enough.
            let tail_pos = last_slider.tail().map_or(last_object.pos, |tail| tail.pos);
            let stacked_tail_pos = tail_pos + last_object.stack_offset;

            let tail_jump_dist =
                (stacked_tail_pos - hit_object.stacked_pos()).length() * scaling_factor;

            let diff = f64::from(Self::MAX_SLIDER_RADIUS - Self::ASSUMED_SLIDER_RADIUS);
            let min = f64::from(tail_jump_dist - Self::MAX_SLIDER_RADIUS);
            self.min_jump_dist = ((self.lazy_jump_dist - diff).min(min)).max(0.0);
        }

        if let Some(last_last_object) = last_last_object.filter(|h| !h.is_spinner()) {
            let last_last_cursor_pos = Self::get_end_cursor_pos(last_last_object);

            let v1 = last_last_cursor_pos - last_object.stacked_pos();
            let v2 = hit_object.stacked_pos() - last_cursor_pos;

            let dot = v1.dot(v2);
            let det = v1.x * v2.y - v1.y * v2.x;

            self.angle = Some(f64::from(det).atan2(f64::from(dot)).abs());
        }
    }

    /// Walks the cursor lazily through a slider's nested events, recording
    /// how far it realistically has to travel and where it ends up.
    ///
    /// Run once per slider before decoration; recomputes from scratch so a
    /// second pass yields identical values.
    pub fn compute_slider_cursor_pos(h: &mut HitObject, radius: f64) {
        let stacked_head_pos = h.pos + h.stack_offset;
        let stack_offset = h.stack_offset;

        let HitObjectKind::Slider(ref mut slider) = h.kind else {
            return;
        };

        slider.lazy_travel_dist = 0.0;
        slider.lazy_end_pos = stacked_head_pos;

        let mut curr_cursor_pos = stacked_head_pos;
        let scaling_factor = f64::from(Self::NORMALIZED_RADIUS) / radius;

        for i in 0..slider.nested_objects.len() {
            let nested = &slider.nested_objects[i];

            let curr_movement = nested.pos + stack_offset - curr_cursor_pos;
            let mut curr_movement_len = scaling_factor * f64::from(curr_movement.length());

            // * Amount of movement required so that the cursor position needs to be updated.
            let required_movement = if nested.is_repeat() {
                f64::from(Self::NORMALIZED_RADIUS)
            } else {
                f64::from(Self::ASSUMED_SLIDER_RADIUS)
            };

            if curr_movement_len > required_movement {
                curr_cursor_pos += curr_movement
                    * (((curr_movement_len - required_movement) / curr_movement_len) as f32);
                curr_movement_len *= (curr_movement_len - required_movement) / curr_movement_len;
                slider.lazy_travel_dist += curr_movement_len as f32;
            }

            if i == slider.nested_objects.len() - 1 {
                slider.lazy_end_pos = curr_cursor_pos;
            }
        }
    }

    fn get_end_cursor_pos(hit_object: &HitObject) -> Pos {
        if let HitObjectKind::Slider(ref slider) = hit_object.kind {
            // Already includes the stack offset; filled by
            // `compute_slider_cursor_pos`.
            slider.lazy_end_pos
        } else {
            hit_object.stacked_pos()
        }
    }
}
