use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "clone-qc",
    version,
    about = "Clone validation QC report from assembly and read summaries"
)]
pub struct Cli {
    /// Per-assembly statistics table (TSV), shown verbatim
    #[arg(long = "assembly_summary")]
    pub assembly_summary: PathBuf,

    /// Self-alignment MAF file per assembly
    #[arg(long = "assembly_mafs", num_args = 1.., required = true)]
    pub assembly_mafs: Vec<PathBuf>,

    /// Per-read table (TSV): filename, read_length, mean_quality
    #[arg(long = "reads_summary")]
    pub reads_summary: PathBuf,

    /// Per-sample summary table (TSV): filename, n_seqs, n_bases, min_length, max_length, mean_quality
    #[arg(long = "fastq_summary")]
    pub fastq_summary: PathBuf,

    #[arg(long, default_value = "report.html")]
    pub out: PathBuf,

    /// Histogram bins per chart
    #[arg(long, default_value_t = 30)]
    pub bins: usize,

    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_flags() {
        let cli = Cli::try_parse_from([
            "clone-qc",
            "--assembly_summary",
            "a.tsv",
            "--assembly_mafs",
            "x.maf",
            "y.maf",
            "--reads_summary",
            "reads.tsv",
            "--fastq_summary",
            "summary.tsv",
            "-vv",
        ])
        .unwrap();
        assert_eq!(
            cli.assembly_mafs,
            vec![PathBuf::from("x.maf"), PathBuf::from("y.maf")]
        );
        assert_eq!(cli.out, PathBuf::from("report.html"));
        assert_eq!(cli.bins, 30);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn missing_flag_is_a_usage_error() {
        let res = Cli::try_parse_from([
            "clone-qc",
            "--assembly_summary",
            "a.tsv",
            "--reads_summary",
            "reads.tsv",
            "--fastq_summary",
            "summary.tsv",
        ]);
        assert!(res.is_err());
    }
}
