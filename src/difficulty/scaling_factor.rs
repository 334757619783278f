use crate::{difficulty::object::DifficultyObject, util::pos::Pos};

/// Radius of a hit object at circle size 0, in playfield pixels.
pub const OBJECT_RADIUS: f32 = 64.0;

const BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE: f32 = 1.00041;

/// Fields around the scaling of hit objects.
///
/// All objects of a map share the same circle size, so the radius-derived
/// normalization is computed once and shared by the whole calculation.
pub struct ScalingFactor {
    /// `NORMALIZED_RADIUS / radius`, adjusted if `radius < 30`.
    pub factor: f32,
    pub radius: f64,
    pub scale: f32,
}

impl ScalingFactor {
    pub fn new(cs: f64) -> Self {
        let scale = (f64::from(1.0_f32) - f64::from(0.7_f32) * ((cs - 5.0) / 5.0)) as f32 / 2.0
            * BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE;

        let radius = f64::from(OBJECT_RADIUS * scale);
        let factor = DifficultyObject::NORMALIZED_RADIUS as f32 / radius as f32;

        // Bonus for really small circles so their jumps are not undervalued
        // by the normalization.
        let factor_with_small_circle_bonus = if radius < 30.0 {
            factor * (1.0 + (30.0 - radius as f32).min(5.0) / 50.0)
        } else {
            factor
        };

        Self {
            factor: factor_with_small_circle_bonus,
            radius,
            scale,
        }
    }

    pub fn stack_offset(&self, stack_height: i32) -> Pos {
        let stack_offset = stack_height as f32 * self.scale * -6.4;

        Pos::new(stack_offset, stack_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::ScalingFactor;

    #[test]
    fn smaller_circles_scale_harder() {
        let cs4 = ScalingFactor::new(4.0);
        let cs7 = ScalingFactor::new(7.0);

        assert!(cs7.radius < cs4.radius);
        assert!(cs7.factor > cs4.factor);
    }

    #[test]
    fn small_circle_bonus_kicks_in_below_radius_30() {
        let tiny = ScalingFactor::new(10.0);
        assert!(tiny.radius < 30.0);

        let unadjusted = super::DifficultyObject::NORMALIZED_RADIUS as f32 / tiny.radius as f32;
        assert!(tiny.factor > unadjusted);
    }
}
