pub use self::{aim::Aim, speed::Speed};

use super::object::DifficultyObject;

pub mod aim;
pub mod speed;
pub mod strain;

/// All skills a difficulty calculation runs, advanced in lockstep.
#[derive(Clone, Debug, PartialEq)]
pub struct Skills {
    pub aim: Aim,
    pub aim_no_sliders: Aim,
    pub speed: Speed,
}

impl Skills {
    pub fn new(hit_window: f64, has_autopilot_mod: bool) -> Self {
        Self {
            aim: Aim::new(true),
            aim_no_sliders: Aim::new(false),
            speed: Speed::new(hit_window, has_autopilot_mod),
        }
    }

    pub fn process(&mut self, curr: &DifficultyObject, diff_objects: &[DifficultyObject]) {
        self.aim.process(curr, diff_objects);
        self.aim_no_sliders.process(curr, diff_objects);
        self.speed.process(curr, diff_objects);
    }
}
