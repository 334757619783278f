use crate::performance::Performance;

/// The result of a difficulty calculation.
///
/// Produced once per (map, modifier-set) combination and immutable
/// afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyAttributes {
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The difficulty of the speed skill.
    pub speed: f64,
    /// The ratio of the aim strain with and without considering sliders.
    pub slider_factor: f64,
    /// The number of sliders weighted by difficulty.
    pub aim_difficult_slider_count: f64,
    /// Weighted sum of aim strains.
    pub aim_difficult_strain_count: f64,
    /// The number of clickable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Weighted sum of speed strains.
    pub speed_difficult_strain_count: f64,
    /// The approach rate, after mods and clock rate.
    pub ar: f64,
    /// The overall difficulty, after mods and clock rate.
    pub od: f64,
    /// The hit window for a great (300) in milliseconds.
    pub great_hit_window: f64,
    /// The hit window for a good (100) in milliseconds.
    pub ok_hit_window: f64,
    /// The hit window for a meh (50) in milliseconds.
    pub meh_hit_window: f64,
    /// The amount of circles.
    pub n_circles: u32,
    /// The amount of sliders.
    pub n_sliders: u32,
    /// The amount of spinners.
    pub n_spinners: u32,
    /// The maximum achievable combo.
    pub max_combo: u32,
    /// The final star rating.
    pub stars: f64,
}

impl DifficultyAttributes {
    /// Return the maximum combo.
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Return the amount of hit objects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Returns a builder for performance calculation.
    pub fn performance(self) -> Performance {
        self.into()
    }
}

/// The result of a performance calculation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceAttributes {
    /// The difficulty attributes that were used for the performance
    /// calculation.
    pub difficulty: DifficultyAttributes,
    /// The final performance points.
    pub pp: f64,
    /// The aim portion of the final pp.
    pub pp_aim: f64,
    /// The speed portion of the final pp.
    pub pp_speed: f64,
    /// The accuracy portion of the final pp.
    pub pp_acc: f64,
    /// Misses including an approximated amount of slider breaks.
    pub effective_miss_count: f64,
    /// Estimated standard deviation of the player's hit timing error on
    /// speed notes, in milliseconds.
    pub speed_deviation: Option<f64>,
}

impl PerformanceAttributes {
    /// Return the star value.
    pub const fn stars(&self) -> f64 {
        self.difficulty.stars
    }

    /// Return the performance point value.
    pub const fn pp(&self) -> f64 {
        self.pp
    }

    /// Return the maximum combo of the map.
    pub const fn max_combo(&self) -> u32 {
        self.difficulty.max_combo
    }
}

impl From<PerformanceAttributes> for DifficultyAttributes {
    fn from(attrs: PerformanceAttributes) -> Self {
        attrs.difficulty
    }
}

/// The per-skill strain peaks of a difficulty calculation.
///
/// Suitable to plot the difficulty of a map over time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Strains {
    /// Time in milliseconds inbetween two strain values.
    pub section_length: f64,
    /// Strain peaks of the aim skill.
    pub aim: Vec<f64>,
    /// Strain peaks of the aim skill without sliders.
    pub aim_no_sliders: Vec<f64>,
    /// Strain peaks of the speed skill.
    pub speed: Vec<f64>,
}
