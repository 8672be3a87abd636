//! Sample type and saturation

/// Audio sample, nominally in `[SAMPLE_MIN, SAMPLE_MAX]`
pub type Sample = f32;

/// Lowest representable sample value
pub const SAMPLE_MIN: Sample = -1.0;

/// Highest representable sample value
pub const SAMPLE_MAX: Sample = 1.0;

/// Saturate a sample to the valid range.
#[inline]
pub fn clamp_sample(x: Sample) -> Sample {
    if x > SAMPLE_MAX {
        SAMPLE_MAX
    } else if x < SAMPLE_MIN {
        SAMPLE_MIN
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_sample() {
        assert_eq!(clamp_sample(1.5), SAMPLE_MAX);
        assert_eq!(clamp_sample(-3.0), SAMPLE_MIN);
        assert_eq!(clamp_sample(0.25), 0.25);
        assert_eq!(clamp_sample(SAMPLE_MAX), SAMPLE_MAX);
    }
}
