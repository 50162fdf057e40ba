//! Occupancy planning: how many fits share one execution block.
//!
//! Grouping several independent fits into one block amortizes launch and
//! scheduling overhead, but the group must not claim more threads than the
//! device allows per block. We reserve a safety margin — the group may use at
//! most a quarter of the per-block thread limit — because the fitting engine
//! runs auxiliary per-thread state (reduction scratch, solver working
//! threads) alongside the per-point threads.

/// Candidate group sizes, scanned in order of preference.
pub const FITS_PER_BLOCK_CANDIDATES: [usize; 4] = [8, 4, 2, 1];

/// Largest candidate that divides `current_chunk_size` evenly and keeps
/// `fits_per_block * point_count` under a quarter of the thread limit.
///
/// Falls through to 1 when no larger candidate qualifies. 1 always satisfies
/// divisibility; if even 1 fails the occupancy bound (very large per-fit
/// point counts), 1 is still returned as the best available grouping rather
/// than an error.
pub fn fits_per_block(
    current_chunk_size: usize,
    point_count: usize,
    max_threads_per_block: usize,
) -> usize {
    let thread_budget = max_threads_per_block / 4;
    for &candidate in &FITS_PER_BLOCK_CANDIDATES {
        let is_divisible = current_chunk_size % candidate == 0;
        // A point count big enough to overflow the multiplication cannot
        // satisfy the budget either.
        let enough_threads = candidate
            .checked_mul(point_count)
            .is_some_and(|threads| threads < thread_budget);
        if is_divisible && enough_threads {
            return candidate;
        }
    }
    1
}
