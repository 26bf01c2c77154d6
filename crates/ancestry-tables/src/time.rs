//! Conversion between the internal time convention and "time since present".
//!
//! Internally every birth time is a forward generation count. Downstream
//! tree-sequence consumers conventionally measure time *backward* from the
//! present. Rather than flipping signs ad hoc wherever the two conventions
//! meet, the conversion lives here and is applied only at the export
//! boundary.

/// Convert a generation counter to an internal birth time.
///
/// The single place where the integer generation counter meets the float
/// time axis. Generation counts in any realistic run sit far below 2^53,
/// so the conversion is exact.
#[allow(clippy::cast_precision_loss)]
pub const fn generation_time(generation: u64) -> f64 {
    generation as f64
}

/// Convert a forward birth time to time measured backward from the present.
///
/// `current_generation` is the generation the simulation has reached; a
/// node born then has age `0.0`, and founders have age equal to the run
/// length.
pub const fn to_time_ago(current_generation: f64, birth_time: f64) -> f64 {
    current_generation - birth_time
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn present_has_age_zero() {
        assert_eq!(to_time_ago(120.0, 120.0).to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn founders_age_equals_run_length() {
        assert_eq!(to_time_ago(2000.0, 0.0).to_bits(), 2000.0_f64.to_bits());
    }

    #[test]
    fn generation_counter_converts_exactly() {
        assert_eq!(generation_time(2000).to_bits(), 2000.0_f64.to_bits());
    }
}
