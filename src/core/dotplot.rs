use crate::core::maf::{AlignmentBlock, Strand};

/// Plot-ready forward-strand alignment, in reference (x) and query (y) coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Segment {
    pub ref_start: u64,
    pub ref_end: u64,
    pub query_start: u64,
    pub query_end: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AxisBounds {
    pub x: (u64, u64),
    pub y: (u64, u64),
}

/// Keeps forward-strand query blocks, in input order. Reverse-strand
/// self-alignments are not plotted.
pub fn project(blocks: &[AlignmentBlock]) -> Vec<Segment> {
    blocks
        .iter()
        .filter(|b| b.query_orientation == Strand::Forward)
        .map(|b| Segment {
            ref_start: b.ref_start,
            ref_end: b.ref_end(),
            query_start: b.query_start,
            query_end: b.query_end(),
        })
        .collect()
}

/// `(0, max end)` on both axes; `(0, 0)` when there is nothing to plot.
pub fn axis_bounds(segments: &[Segment]) -> AxisBounds {
    let max_x = segments.iter().map(|s| s.ref_end).max().unwrap_or(0);
    let max_y = segments.iter().map(|s| s.query_end).max().unwrap_or(0);
    AxisBounds {
        x: (0, max_x),
        y: (0, max_y),
    }
}
