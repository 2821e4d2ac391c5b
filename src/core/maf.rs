//! Reader for the block-based pairwise alignment format (MAF) produced by
//! self-aligning an assembly.
//!
//! Only the first two sequence lines of each `a` block are read; the fields
//! kept are `name start size strand` (columns 1 to 4 of an `s` line).

use crate::core::error::QcError;
use crate::core::io::{self, InputData};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

/// One self-alignment event: a reference record paired with a query record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlignmentBlock {
    pub ref_name: String,
    pub ref_start: u64,
    pub ref_len: u64,
    pub ref_orientation: Strand,
    pub query_name: String,
    pub query_start: u64,
    pub query_len: u64,
    pub query_orientation: Strand,
}

impl AlignmentBlock {
    fn from_pair(reference: Component, query: Component) -> Self {
        Self {
            ref_name: reference.name,
            ref_start: reference.start,
            ref_len: reference.len,
            ref_orientation: reference.strand,
            query_name: query.name,
            query_start: query.start,
            query_len: query.len,
            query_orientation: query.strand,
        }
    }

    /// Parsed blocks never overflow here; hand-built ones saturate.
    pub fn ref_end(&self) -> u64 {
        self.ref_start.saturating_add(self.ref_len)
    }

    pub fn query_end(&self) -> u64 {
        self.query_start.saturating_add(self.query_len)
    }
}

#[derive(Debug)]
struct Component {
    name: String,
    start: u64,
    len: u64,
    strand: Strand,
}

enum State {
    Scanning,
    InBlock(BlockStage),
    Done,
}

enum BlockStage {
    Reference,
    Query(Component),
    Separator(AlignmentBlock),
}

/// Parses alignment blocks from a sequence of lines (without terminators).
pub fn parse_lines<'a, I>(lines: I) -> Result<Vec<AlignmentBlock>, QcError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut blocks = Vec::new();
    let mut state = State::Scanning;
    let mut line_no = 0usize;
    let mut iter = lines.into_iter();

    while !matches!(state, State::Done) {
        let Some(line) = iter.next() else {
            break;
        };
        line_no += 1;
        state = match state {
            State::Scanning => scan(line, line_no)?,
            State::InBlock(BlockStage::Reference) => {
                State::InBlock(BlockStage::Query(parse_component(line, line_no)?))
            }
            State::InBlock(BlockStage::Query(reference)) => {
                let query = parse_component(line, line_no)?;
                State::InBlock(BlockStage::Separator(AlignmentBlock::from_pair(
                    reference, query,
                )))
            }
            State::InBlock(BlockStage::Separator(block)) => {
                blocks.push(block);
                State::Scanning
            }
            State::Done => State::Done,
        };
    }

    match state {
        State::InBlock(_) => Err(QcError::format(
            line_no + 1,
            "alignment block truncated by end of input",
        )),
        State::Scanning | State::Done => Ok(blocks),
    }
}

fn scan(line: &str, line_no: usize) -> Result<State, QcError> {
    if line.starts_with('#') {
        Ok(State::Scanning)
    } else if line.starts_with('a') {
        Ok(State::InBlock(BlockStage::Reference))
    } else if line.trim().is_empty() {
        Ok(State::Done)
    } else {
        Err(QcError::format(
            line_no,
            format!("unexpected line outside alignment block: '{}'", snippet(line)),
        ))
    }
}

fn parse_component(line: &str, line_no: usize) -> Result<Component, QcError> {
    if line.trim().is_empty() {
        return Err(QcError::format(line_no, "expected sequence line, found blank line"));
    }
    let fields: Vec<&str> = line.split_whitespace().skip(1).take(4).collect();
    let [name, start, len, strand] = fields[..] else {
        return Err(QcError::format(
            line_no,
            format!("expected at least 5 fields in '{}'", snippet(line)),
        ));
    };
    let number = |v: &str, what: &str| {
        v.parse::<u64>()
            .map_err(|_| QcError::format(line_no, format!("invalid {} '{}'", what, v)))
    };
    let start = number(start, "start")?;
    let len = number(len, "length")?;
    if start.checked_add(len).is_none() {
        return Err(QcError::format(line_no, "coordinate overflow"));
    }
    Ok(Component {
        name: name.to_string(),
        start,
        len,
        strand: Strand::parse(strand).ok_or_else(|| {
            QcError::format(line_no, format!("invalid orientation '{}'", strand))
        })?,
    })
}

fn snippet(line: &str) -> String {
    line.chars().take(40).collect()
}

/// Reads one alignment file; the file is closed before returning.
pub fn parse(path: &Path) -> Result<Vec<AlignmentBlock>> {
    let data = InputData::open(path)?;
    let text = data.text(path)?;
    let blocks = parse_lines(io::lines(text))
        .with_context(|| format!("failed to parse alignment file {}", path.display()))?;
    info!(
        "parsed {} alignment blocks from {}",
        blocks.len(),
        path.display()
    );
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_BLOCKS: &str = "\
##maf version=1 scoring=lastz
# self alignment
a score=5000
s contig_1 0 500 + 3000 ACGT
s contig_1 0 300 + 3000 ACGT

a score=120
s contig_1 10 40 + 3000 ACGT
s contig_1 2900 40 - 3000 ACGT

";

    fn parse_str(text: &str) -> Result<Vec<AlignmentBlock>, QcError> {
        parse_lines(io::lines(text))
    }

    #[test]
    fn parses_blocks_in_file_order() {
        let blocks = parse_str(TWO_BLOCKS).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            AlignmentBlock {
                ref_name: "contig_1".to_string(),
                ref_start: 0,
                ref_len: 500,
                ref_orientation: Strand::Forward,
                query_name: "contig_1".to_string(),
                query_start: 0,
                query_len: 300,
                query_orientation: Strand::Forward,
            }
        );
        assert_eq!(blocks[0].ref_end(), 500);
        assert_eq!(blocks[0].query_end(), 300);
        assert_eq!(blocks[1].ref_start, 10);
        assert_eq!(blocks[1].query_start, 2900);
        assert_eq!(blocks[1].query_orientation, Strand::Reverse);
    }

    #[test]
    fn synthetic_files_yield_one_block_per_record() {
        for n in 0..5u64 {
            let mut text = String::from("# generated\n");
            for i in 0..n {
                text.push_str(&format!(
                    "a score={}\ns r {} 10 + 100 A\ns q {} 20 + 100 A\n\n",
                    i,
                    i,
                    i * 2
                ));
            }
            let blocks = parse_str(&text).unwrap();
            assert_eq!(blocks.len() as u64, n);
            for (i, b) in blocks.iter().enumerate() {
                assert_eq!(b.ref_start, i as u64);
                assert_eq!(b.query_start, i as u64 * 2);
            }
        }
    }

    #[test]
    fn empty_input_is_empty_result() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("# only comments\n#\n").unwrap().is_empty());
    }

    #[test]
    fn blank_line_ends_scanning() {
        let text = "a\ns r 0 10 + 100 A\ns q 0 10 + 100 A\n\n\na\ns r 5 10 + 100 A\n";
        let blocks = parse_str(text).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn header_without_records_is_truncated() {
        let err = parse_str("# c\na score=1\n").unwrap_err();
        assert_eq!(
            err,
            QcError::format(3, "alignment block truncated by end of input")
        );
    }

    #[test]
    fn missing_separator_is_truncated() {
        let err = parse_str("a\ns r 0 10 + 100 A\ns q 0 10 + 100 A\n").unwrap_err();
        assert!(matches!(err, QcError::Format { line: 4, .. }));
    }

    #[test]
    fn unknown_line_outside_block_is_rejected() {
        let err = parse_str("# c\ns r 0 10 + 100 A\n").unwrap_err();
        assert!(matches!(err, QcError::Format { line: 2, .. }));
    }

    #[test]
    fn malformed_records_are_rejected() {
        let short = parse_str("a\ns r 0\ns q 0 10 + 100 A\n\n").unwrap_err();
        assert!(matches!(short, QcError::Format { line: 2, .. }));

        let number = parse_str("a\ns r 0 10 + 100 A\ns q x 10 + 100 A\n\n").unwrap_err();
        assert!(matches!(number, QcError::Format { line: 3, .. }));

        let strand = parse_str("a\ns r 0 10 ? 100 A\ns q 0 10 + 100 A\n\n").unwrap_err();
        assert!(matches!(strand, QcError::Format { line: 2, .. }));

        let blank = parse_str("a\n\ns q 0 10 + 100 A\n\n").unwrap_err();
        assert!(matches!(blank, QcError::Format { line: 2, .. }));
    }

    #[test]
    fn coordinate_overflow_is_rejected() {
        let err = parse_str("a\ns r 18446744073709551615 10 + 100 A\ns q 0 10 + 100 A\n\n")
            .unwrap_err();
        assert_eq!(err, QcError::format(2, "coordinate overflow"));

        let query = parse_str("a\ns r 0 10 + 100 A\ns q 10 18446744073709551610 + 100 A\n\n")
            .unwrap_err();
        assert_eq!(query, QcError::format(3, "coordinate overflow"));

        let edge = parse_str("a\ns r 18446744073709551605 10 + 100 A\ns q 0 10 + 100 A\n\n")
            .unwrap();
        assert_eq!(edge[0].ref_end(), u64::MAX);
    }

    #[test]
    fn parse_attaches_path_to_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.maf");
        std::fs::write(&path, "a score=1\n")?;
        let err = parse(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.maf"));
        assert!(matches!(
            err.downcast_ref::<QcError>(),
            Some(QcError::Format { .. })
        ));
        Ok(())
    }
}
