pub const fn bpm_to_milliseconds(bpm: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / i32_unwrap_or(delimiter, 4) as f64 / bpm
}

pub const fn milliseconds_to_bpm(ms: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / (ms * i32_unwrap_or(delimiter, 4) as f64)
}

// `Option::unwrap_or` is not const
const fn i32_unwrap_or(option: Option<i32>, default: i32) -> i32 {
    match option {
        Some(value) => value,
        None => default,
    }
}

pub fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    start + (end - start) * amount
}

pub fn reverse_lerp(x: f64, start: f64, end: f64) -> f64 {
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

pub fn smoothstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * (3.0 - 2.0 * x)
}

pub fn smootherstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

// `f64::exp` is not const
pub fn logistic(x: f64, midpoint_offset: f64, multiplier: f64, max_value: Option<f64>) -> f64 {
    max_value.unwrap_or(1.0) / (1.0 + f64::exp(multiplier * (midpoint_offset - x)))
}

/// Maps a difficulty value in `[0, 10]` onto the corresponding
/// min/mid/max range the game uses for AR and OD.
pub fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid + (mid - min) * (difficulty - 5.0) / 5.0
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_range_endpoints() {
        assert!((difficulty_range(0.0, 1800.0, 1200.0, 450.0) - 1800.0).abs() < f64::EPSILON);
        assert!((difficulty_range(5.0, 1800.0, 1200.0, 450.0) - 1200.0).abs() < f64::EPSILON);
        assert!((difficulty_range(10.0, 1800.0, 1200.0, 450.0) - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn smoothstep_is_clamped() {
        assert!((smoothstep(-1.0, 0.0, 1.0)).abs() < f64::EPSILON);
        assert!((smoothstep(2.0, 0.0, 1.0) - 1.0).abs() < f64::EPSILON);
    }
}
