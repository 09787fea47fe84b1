//! Single-line compaction and merge toward index 0.
//!
//! All score semantics live here. A line is a row or column already oriented
//! so that the move direction points at index 0.

/// Result of merging one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMerge {
    /// New cell values, same length as the input.
    pub cells: Vec<u32>,
    /// One `(index, value)` per merge event; `index` is where the merged tile ends up.
    pub merges: Vec<(usize, u32)>,
}

impl LineMerge {
    pub fn score(&self) -> u64 {
        self.merges.iter().map(|&(_, v)| u64::from(v)).sum()
    }
}

/// Equal non-zero neighbours merge unless doubling would leave `u32`.
pub fn can_merge(a: u32, b: u32) -> bool {
    a != 0 && a == b && a.checked_mul(2).is_some()
}

/// Compact, merge equal neighbours in one left-to-right pass, compact again.
///
/// After a merge at `i` the slot `i + 1` holds 0, so the doubled tile is never
/// compared again in the same pass.
pub fn merge_line(line: &[u32]) -> LineMerge {
    let mut packed: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();
    let mut merged_at = Vec::new();

    for i in 0..packed.len().saturating_sub(1) {
        if can_merge(packed[i], packed[i + 1]) {
            packed[i] *= 2;
            packed[i + 1] = 0;
            merged_at.push(i);
        }
    }

    // Map pre-compaction indices to final positions while dropping the zeros.
    let mut cells = Vec::with_capacity(line.len());
    let mut merges = Vec::with_capacity(merged_at.len());
    let mut pending = merged_at.iter().peekable();
    for (i, &v) in packed.iter().enumerate() {
        if v == 0 {
            continue;
        }
        if pending.peek() == Some(&&i) {
            pending.next();
            merges.push((cells.len(), v));
        }
        cells.push(v);
    }
    cells.resize(line.len(), 0);

    LineMerge { cells, merges }
}
