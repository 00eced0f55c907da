//! Splitting the item list into contiguous per-lane chunks.

/// Splits `items` into at most `lane_count` contiguous chunks of
/// `ceil(len / lane_count)` items; the last chunk may be shorter.
///
/// Concatenating the chunks in order gives back `items`. An empty input
/// yields no chunks, and a lane count of 0 is treated as 1. Small inputs get
/// fewer chunks than lanes rather than empty ones.
pub fn partition<T: Clone>(items: &[T], lane_count: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let lanes = lane_count.max(1);
    let size = items.len().div_ceil(lanes);
    items.chunks(size).map(<[T]>::to_vec).collect()
}
