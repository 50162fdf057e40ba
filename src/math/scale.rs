//! Integer scaling helpers: power-of-two padding, power-of-ten rounding,
//! and free-parameter mask accounting.
//!
//! These are total functions over their valid domains; validation of caller
//! preconditions (e.g. `point_count > 0`) happens once, up front, in
//! `plan::Planner::new`.

/// Smallest power of two `>= n`.
///
/// Used to pad the per-fit point count for the engine's parallel reduction
/// phases, which require power-of-two strides.
///
/// # Panics
/// Debug-asserts `n > 0`. A zero point count is rejected during configuration
/// validation before planning ever calls this.
pub fn next_power_of_two(n: usize) -> usize {
    debug_assert!(n > 0, "point count must be positive");
    let mut padded = 1usize;
    while padded < n {
        padded *= 2;
    }
    padded
}

/// Round `n` down to a multiple of the power of ten just below its magnitude.
///
/// Examples: `103_427 -> 100_000`, `899_280 -> 800_000`, `7 -> 7`.
///
/// Chunk sizes are decluttered this way so that batch boundaries stay at
/// round, human-debuggable numbers across runs, at the cost of a small amount
/// of device utilization. Values `<= 10` pass through unchanged, so the
/// result never drops below 1 when the input is `>= 1`.
pub fn round_down_to_decade(n: usize) -> usize {
    let mut scale = 1usize;
    let mut magnitude = n;
    while magnitude > 10 {
        scale *= 10;
        magnitude /= 10;
    }
    n / scale * scale
}

/// Count the `true` entries of a free-parameter mask.
///
/// Recomputed in full whenever the mask changes; an all-false mask yields 0,
/// which downstream planning treats as a valid degenerate case.
pub fn count_free_parameters(mask: &[bool]) -> usize {
    mask.iter().filter(|&&free| free).count()
}
