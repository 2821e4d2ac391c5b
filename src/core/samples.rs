use crate::core::error::QcError;
use crate::core::table::TsvTable;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SampleSummaryRow {
    pub filename: String,
    pub n_seqs: u64,
    pub n_bases: u64,
    pub min_length: u64,
    pub max_length: u64,
    pub mean_quality: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReadRecord {
    pub filename: String,
    pub read_length: u64,
    pub mean_quality: f64,
}

/// One sample's summary row and all of its reads, in table order.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBundle<'a> {
    pub summary: &'a SampleSummaryRow,
    pub reads: Vec<&'a ReadRecord>,
}

impl SampleSummaryRow {
    const COLUMNS: &'static [&'static str] = &[
        "filename",
        "n_seqs",
        "n_bases",
        "min_length",
        "max_length",
        "mean_quality",
    ];

    pub fn from_table(table: &TsvTable) -> Result<Vec<Self>, QcError> {
        table.deserialize(Self::COLUMNS)
    }
}

impl ReadRecord {
    const COLUMNS: &'static [&'static str] = &["filename", "read_length", "mean_quality"];

    pub fn from_table(table: &TsvTable) -> Result<Vec<Self>, QcError> {
        table.deserialize(Self::COLUMNS)
    }
}

/// Groups reads by sample and pairs each group with its unique summary row.
///
/// Samples are the distinct filenames of `reads`, keyed in lexicographic
/// order; a summary row without reads is not reported.
pub fn join<'a>(
    summary: &'a [SampleSummaryRow],
    reads: &'a [ReadRecord],
) -> Result<BTreeMap<String, SampleBundle<'a>>, QcError> {
    let mut grouped: BTreeMap<&str, Vec<&ReadRecord>> = BTreeMap::new();
    for read in reads {
        grouped.entry(read.filename.as_str()).or_default().push(read);
    }

    let mut bundles = BTreeMap::new();
    for (key, reads) in grouped {
        let mut matches = summary.iter().filter(|row| row.filename == key);
        let row = match (matches.next(), matches.count()) {
            (Some(row), 0) => row,
            (None, _) => {
                return Err(QcError::KeyLookup {
                    key: key.to_string(),
                    matches: 0,
                });
            }
            (Some(_), rest) => {
                return Err(QcError::KeyLookup {
                    key: key.to_string(),
                    matches: rest + 1,
                });
            }
        };
        bundles.insert(
            key.to_string(),
            SampleBundle {
                summary: row,
                reads,
            },
        );
    }
    Ok(bundles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, n: u64, bases: u64, minl: u64, maxl: u64, q: f64) -> SampleSummaryRow {
        SampleSummaryRow {
            filename: name.to_string(),
            n_seqs: n,
            n_bases: bases,
            min_length: minl,
            max_length: maxl,
            mean_quality: q,
        }
    }

    fn read(name: &str, len: u64, q: f64) -> ReadRecord {
        ReadRecord {
            filename: name.to_string(),
            read_length: len,
            mean_quality: q,
        }
    }

    #[test]
    fn pairs_each_sample_with_its_summary() {
        let reads = vec![read("A", 100, 30.0), read("A", 200, 28.0), read("B", 150, 31.0)];
        let rows = vec![
            summary("A", 2, 300, 100, 200, 29.0),
            summary("B", 1, 150, 150, 150, 31.0),
        ];
        let bundles = join(&rows, &reads).unwrap();
        assert_eq!(bundles.len(), 2);

        let a = &bundles["A"];
        assert_eq!(a.summary, &rows[0]);
        assert_eq!(a.reads, vec![&reads[0], &reads[1]]);

        let b = &bundles["B"];
        assert_eq!(b.summary, &rows[1]);
        assert_eq!(b.reads, vec![&reads[2]]);
    }

    #[test]
    fn key_order_is_sorted_and_repeatable() {
        let reads = vec![
            read("zeta", 1, 1.0),
            read("alpha", 2, 2.0),
            read("mid", 3, 3.0),
            read("alpha", 4, 4.0),
        ];
        let rows = vec![
            summary("mid", 1, 3, 3, 3, 3.0),
            summary("zeta", 1, 1, 1, 1, 1.0),
            summary("alpha", 2, 6, 2, 4, 3.0),
        ];
        let first = join(&rows, &reads).unwrap();
        let second = join(&rows, &reads).unwrap();
        let keys: Vec<&String> = first.keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
        assert_eq!(first, second);
        assert_eq!(first["alpha"].reads[1].read_length, 4);
    }

    #[test]
    fn summary_rows_without_reads_are_omitted() {
        let reads = vec![read("A", 10, 10.0)];
        let rows = vec![summary("A", 1, 10, 10, 10, 10.0), summary("B", 0, 0, 0, 0, 0.0)];
        let bundles = join(&rows, &reads).unwrap();
        assert!(bundles.contains_key("A"));
        assert!(!bundles.contains_key("B"));
    }

    #[test]
    fn missing_and_ambiguous_keys_fail() {
        let reads = vec![read("A", 10, 10.0), read("C", 10, 10.0)];
        let rows = vec![summary("A", 1, 10, 10, 10, 10.0)];
        assert_eq!(
            join(&rows, &reads),
            Err(QcError::KeyLookup {
                key: "C".to_string(),
                matches: 0
            })
        );

        let dup = vec![
            summary("A", 1, 10, 10, 10, 10.0),
            summary("A", 1, 10, 10, 10, 10.0),
        ];
        assert_eq!(
            join(&dup, &reads[..1]),
            Err(QcError::KeyLookup {
                key: "A".to_string(),
                matches: 2
            })
        );
    }

    #[test]
    fn loads_typed_rows_from_tables() {
        let summary_table = TsvTable::parse(
            "filename\tn_seqs\tn_bases\tmin_length\tmax_length\tmean_quality\n\
             A\t2\t300\t100\t200\t29.0\n",
        )
        .unwrap();
        let rows = SampleSummaryRow::from_table(&summary_table).unwrap();
        assert_eq!(rows, vec![summary("A", 2, 300, 100, 200, 29.0)]);

        let reads_table = TsvTable::parse(
            "read_id\tfilename\tread_length\tmean_quality\nr1\tA\t100\t30.0\nr2\tA\t200\t28.0\n",
        )
        .unwrap();
        let reads = ReadRecord::from_table(&reads_table).unwrap();
        assert_eq!(reads, vec![read("A", 100, 30.0), read("A", 200, 28.0)]);

        let no_quality = TsvTable::parse("filename\tread_length\nA\t1\n").unwrap();
        assert_eq!(
            ReadRecord::from_table(&no_quality),
            Err(QcError::MissingColumn {
                column: "mean_quality".to_string()
            })
        );

        let quoted = TsvTable::parse(
            "filename\tread_length\tmean_quality\n\"run\t1.fastq\"\t10\t12.5\n",
        )
        .unwrap();
        assert_eq!(
            ReadRecord::from_table(&quoted).unwrap(),
            vec![read("run\t1.fastq", 10, 12.5)]
        );

        let bad_length = TsvTable::parse("filename\tread_length\tmean_quality\nA\t1.5\t10\n")
            .unwrap();
        assert_eq!(
            ReadRecord::from_table(&bad_length),
            Err(QcError::InvalidValue {
                line: 2,
                column: "read_length".to_string(),
                value: "1.5".to_string()
            })
        );
    }
}
