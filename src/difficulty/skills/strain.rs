use crate::util::{difficulty::lerp, float_ext::FloatExt};

/// Time between two strain sections in milliseconds. Sections are aligned to
/// absolute time, not to the first object.
pub const SECTION_LENGTH: f64 = 400.0;

/// Weight decay applied per section when summing sorted peaks.
pub const DECAY_WEIGHT: f64 = 0.9;

/// Exponent applied to a section peak when it is archived. Slightly compresses
/// outlier sections.
pub const PEAK_EXPONENT: f64 = 0.99;

pub fn strain_decay(ms: f64, strain_decay_base: f64) -> f64 {
    f64::powf(strain_decay_base, ms / 1000.0)
}

/// Per-skill rolling state of the strain simulation.
///
/// This is the entire memory a skill carries between objects, so cloning it
/// and the processed-object cursor is enough to resume a calculation later.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrainState {
    pub curr_strain: f64,
    /// Rhythm multiplier of the most recent object; only the speed skill
    /// writes anything other than `1.0` here.
    pub curr_rhythm: f64,
    pub curr_section_peak: f64,
    pub curr_section_end: f64,
    pub strain_peaks: Vec<f64>,
    pub object_strains: Vec<f64>,
    /// Strain values at sliders, kept to estimate difficult sliders later.
    pub slider_strains: Vec<f64>,
}

impl StrainState {
    pub fn new() -> Self {
        Self {
            curr_strain: 0.0,
            curr_rhythm: 1.0,
            curr_section_peak: 0.0,
            curr_section_end: 0.0,
            strain_peaks: Vec::with_capacity(64),
            object_strains: Vec::with_capacity(256),
            slider_strains: Vec::new(),
        }
    }

    /// Aligns the first section boundary to absolute time.
    pub fn start_first_section(&mut self, start_time: f64) {
        self.curr_section_end = (start_time / SECTION_LENGTH).ceil() * SECTION_LENGTH;
    }

    pub fn save_current_peak(&mut self) {
        self.strain_peaks.push(self.curr_section_peak.powf(PEAK_EXPONENT));
    }

    pub fn start_new_section_from(&mut self, initial_strain: f64) {
        // * The maximum strain of the new section is not zero by default
        // * This means we need to capture the strain level at the beginning of the new section,
        // * and use that as the initial peak level.
        self.curr_section_peak = initial_strain;
        self.curr_section_end += SECTION_LENGTH;
    }

    /// Records the strain of one object, sanitizing non-finite values to the
    /// last finite strain so a single degenerate object cannot poison every
    /// following section.
    pub fn record(&mut self, strain: f64) -> f64 {
        let strain = if strain.is_finite() {
            strain
        } else {
            self.object_strains.last().copied().unwrap_or(0.0)
        };

        self.curr_section_peak = strain.max(self.curr_section_peak);
        self.object_strains.push(strain);

        strain
    }

    /// All section peaks including the still-open section.
    pub fn current_strain_peaks(&self) -> Vec<f64> {
        let mut peaks = self.strain_peaks.clone();
        peaks.push(self.curr_section_peak.powf(PEAK_EXPONENT));

        peaks
    }

    pub fn difficulty_value(
        &self,
        reduced_section_count: usize,
        reduced_strain_baseline: f64,
    ) -> f64 {
        difficulty_value(
            self.current_strain_peaks(),
            reduced_section_count,
            reduced_strain_baseline,
            DECAY_WEIGHT,
        )
    }

    pub fn count_top_weighted_strains(&self, difficulty_value: f64) -> f64 {
        count_top_weighted_strains(&self.object_strains, difficulty_value)
    }
}

pub fn difficulty_value(
    current_strain_peaks: Vec<f64>,
    reduced_section_count: usize,
    reduced_strain_baseline: f64,
    decay_weight: f64,
) -> f64 {
    let mut difficulty = 0.0;
    let mut weight = 1.0;

    // * Sections with 0 strain are excluded to avoid worst-case time complexity of the following sort.
    // * These sections will not contribute to the difficulty.
    let mut peaks = current_strain_peaks;
    peaks.retain(|&peak| peak > 0.0);
    peaks.sort_unstable_by(|a, b| b.total_cmp(a));

    // * We are reducing the highest strains first to account for extreme difficulty spikes.
    let peaks_iter = peaks.iter_mut().take(reduced_section_count);

    for (i, strain) in peaks_iter.enumerate() {
        let clamped = f64::from((i as f32 / reduced_section_count as f32).clamp(0.0, 1.0));
        let scale = f64::log10(lerp(1.0, 10.0, clamped));
        *strain *= lerp(reduced_strain_baseline, 1.0, scale);
    }

    peaks.sort_unstable_by(|a, b| b.total_cmp(a));

    // * Difficulty is the weighted sum of the highest strains from every section.
    // * We're sorting from highest to lowest strain.
    for strain in peaks {
        difficulty += strain * weight;
        weight *= decay_weight;
    }

    difficulty
}

pub fn count_top_weighted_strains(object_strains: &[f64], difficulty_value: f64) -> f64 {
    if object_strains.is_empty() {
        return 0.0;
    }

    // * What would the top strain be if all strain values were identical
    let consistent_top_strain = difficulty_value / 10.0;

    if FloatExt::eq(consistent_top_strain, 0.0) {
        return object_strains.len() as f64;
    }

    // * Use a weighted sum of all strains. Constants are arbitrary and give nice values
    object_strains
        .iter()
        .map(|s| 1.1 / (1.0 + f64::exp(-10.0 * (s / consistent_top_strain - 0.88))))
        .sum()
}

pub fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_halves_strain_over_time() {
        let at_zero = strain_decay(0.0, 0.3);
        let at_half = strain_decay(500.0, 0.3);
        let at_full = strain_decay(1000.0, 0.3);

        assert!((at_zero - 1.0).abs() < f64::EPSILON);
        assert!(at_half > at_full);
        assert!((at_full - 0.3).abs() < 1e-12);
    }

    #[test]
    fn peaks_are_weighted_by_decay() {
        let peaks = vec![4.0, 2.0, 1.0];
        let value = difficulty_value(peaks, 0, 0.75, 0.9);

        // 4 + 2 * 0.9 + 1 * 0.81
        assert!((value - 6.61).abs() < 1e-12);
    }

    #[test]
    fn zero_sections_do_not_contribute() {
        let with_zeros = difficulty_value(vec![4.0, 0.0, 2.0, 0.0], 0, 0.75, 0.9);
        let without = difficulty_value(vec![4.0, 2.0], 0, 0.75, 0.9);

        assert!((with_zeros - without).abs() < f64::EPSILON);
    }

    #[test]
    fn reduced_sections_nerf_the_top_peak() {
        let nerfed = difficulty_value(vec![10.0], 1, 0.75, 0.9);

        assert!((nerfed - 7.5).abs() < 1e-12);
    }

    #[test]
    fn saved_peaks_are_compressed() {
        let mut state = StrainState::new();
        state.curr_section_peak = 2.0;
        state.save_current_peak();

        assert!((state.strain_peaks[0] - 2.0_f64.powf(0.99)).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_strain_falls_back_to_last_value() {
        let mut state = StrainState::new();
        state.record(3.0);
        let sanitized = state.record(f64::NAN);

        assert!((sanitized - 3.0).abs() < f64::EPSILON);
        assert!((state.curr_section_peak - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_object_strains_count_zero() {
        let state = StrainState::new();

        assert!(state.count_top_weighted_strains(5.0).abs() < f64::EPSILON);
    }
}
