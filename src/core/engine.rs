use crate::core::dotplot;
use crate::core::hist::Histogram;
use crate::core::maf;
use crate::core::model::{ReportStyle, fmt_float};
use crate::core::samples::{self, ReadRecord, SampleBundle, SampleSummaryRow};
use crate::core::table::TsvTable;
use crate::report::{Block, Chart, ChartOptions, ChartRenderer, Section};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const REPORT_TITLE: &str = "Clone Validation";
pub const REPORT_LEAD: &str = "Results generated through the wf-clone-validation nextflow workflow provided by Oxford Nanopore Technologies";

const ASSEMBLIES_TEXT: &str = "This tab contains a basic table of stats for each final assembly, as well as dotplots generated by self-alignment. These dotplots should be a near-perfect diagonal line if the assembly has worked.";
const SAMPLES_TEXT: &str = "This tab contains visualisations of read length and average quality for the final, filtered datasets used in assembly, from each of the samples respectively. I.e, this is post-host filtering and downsampling.";

pub struct RunConfig {
    pub assembly_summary: PathBuf,
    pub assembly_mafs: Vec<PathBuf>,
    /// per-read table
    pub reads_summary: PathBuf,
    /// per-sample summary table
    pub fastq_summary: PathBuf,
    pub style: ReportStyle,
}

/// Builds both report sections. Nothing is written; any error aborts the whole report.
pub fn run<R: ChartRenderer>(cfg: &RunConfig, renderer: &R) -> Result<Vec<Section>> {
    let t = Instant::now();
    let assemblies = build_assemblies_section(
        &cfg.assembly_summary,
        &cfg.assembly_mafs,
        &cfg.style,
        renderer,
    )?;
    log_stage("assemblies", t);

    let t = Instant::now();
    let samples =
        build_samples_section(&cfg.fastq_summary, &cfg.reads_summary, &cfg.style, renderer)?;
    log_stage("samples", t);

    Ok(vec![assemblies, samples])
}

pub fn build_assemblies_section<R: ChartRenderer>(
    summary_path: &Path,
    mafs: &[PathBuf],
    style: &ReportStyle,
    renderer: &R,
) -> Result<Section> {
    let table = TsvTable::read(summary_path)?;
    if table.is_empty() {
        warn!("{} has no assembly rows", summary_path.display());
    }
    let table_chart = renderer.render_table(&table, style.table_max_height(table.len()))?;

    let mut dotplots = Vec::with_capacity(mafs.len());
    for maf_path in mafs {
        dotplots.push(dotplot_assembly(maf_path, style, renderer)?);
    }

    Ok(Section {
        title: "Assemblies".to_string(),
        blocks: vec![
            Block::Description(ASSEMBLIES_TEXT.to_string()),
            Block::Table(table_chart),
            Block::Grid {
                columns: style.grid_columns,
                charts: dotplots,
            },
        ],
    })
}

pub fn dotplot_assembly<R: ChartRenderer>(
    path: &Path,
    style: &ReportStyle,
    renderer: &R,
) -> Result<Chart> {
    let blocks = maf::parse(path)?;
    let segments = dotplot::project(&blocks);
    let bounds = dotplot::axis_bounds(&segments);
    debug!(
        "{}: {} of {} blocks on the forward strand",
        path.display(),
        segments.len(),
        blocks.len()
    );
    let opts = ChartOptions {
        title: path.display().to_string(),
        x_label: "position".to_string(),
        y_label: "position".to_string(),
        width: style.dotplot_size.0,
        height: style.dotplot_size.1,
    };
    renderer.render_scatter_segments(&segments, bounds, &opts)
}

pub fn build_samples_section<R: ChartRenderer>(
    summary_path: &Path,
    reads_path: &Path,
    style: &ReportStyle,
    renderer: &R,
) -> Result<Section> {
    let summary_table = TsvTable::read(summary_path)?;
    let summary = SampleSummaryRow::from_table(&summary_table)
        .with_context(|| format!("failed to load sample summary {}", summary_path.display()))?;
    let reads_table = TsvTable::read(reads_path)?;
    let reads = ReadRecord::from_table(&reads_table)
        .with_context(|| format!("failed to load read table {}", reads_path.display()))?;

    let bundles = samples::join(&summary, &reads).with_context(|| {
        format!(
            "failed to match {} against {}",
            reads_path.display(),
            summary_path.display()
        )
    })?;
    info!("joined {} samples from {} reads", bundles.len(), reads.len());

    let mut length_plots = Vec::with_capacity(bundles.len());
    let mut qual_plots = Vec::with_capacity(bundles.len());
    for (name, bundle) in &bundles {
        length_plots.push(length_histogram(name, bundle, style, renderer)?);
        qual_plots.push(quality_histogram(name, bundle, style, renderer)?);
    }

    Ok(Section {
        title: "Samples".to_string(),
        blocks: vec![
            Block::Description(SAMPLES_TEXT.to_string()),
            Block::Grid {
                columns: style.grid_columns,
                charts: length_plots,
            },
            Block::Grid {
                columns: style.grid_columns,
                charts: qual_plots,
            },
        ],
    })
}

pub fn length_title(name: &str, s: &SampleSummaryRow) -> String {
    format!(
        "{}: {} seqs, {} bp, {} min, {} max",
        name, s.n_seqs, s.n_bases, s.min_length, s.max_length
    )
}

pub fn quality_title(name: &str, s: &SampleSummaryRow) -> String {
    format!("{}: {} mean q-score", name, fmt_float(s.mean_quality))
}

fn length_histogram<R: ChartRenderer>(
    name: &str,
    bundle: &SampleBundle<'_>,
    style: &ReportStyle,
    renderer: &R,
) -> Result<Chart> {
    let longest = bundle.reads.iter().map(|r| r.read_length).max().unwrap_or(0);
    let hist = Histogram::from_values(
        bundle.reads.iter().map(|r| r.read_length as f64),
        style.bins,
    );
    debug!("{}: {} read lengths binned", name, hist.total());
    let domain = (0.0, longest.saturating_add(style.length_padding) as f64);
    let opts = ChartOptions {
        title: length_title(name, bundle.summary),
        x_label: "Length".to_string(),
        y_label: "Count".to_string(),
        width: style.histogram_size.0,
        height: style.histogram_size.1,
    };
    renderer.render_histogram(&hist, domain, &opts)
}

fn quality_histogram<R: ChartRenderer>(
    name: &str,
    bundle: &SampleBundle<'_>,
    style: &ReportStyle,
    renderer: &R,
) -> Result<Chart> {
    let hist = Histogram::from_values(bundle.reads.iter().map(|r| r.mean_quality), style.bins);
    let opts = ChartOptions {
        title: quality_title(name, bundle.summary),
        x_label: "Mean Quality".to_string(),
        y_label: "Count".to_string(),
        width: style.histogram_size.0,
        height: style.histogram_size.1,
    };
    renderer.render_histogram(&hist, style.quality_domain, &opts)
}

pub fn log_stage(name: &str, t: Instant) {
    debug!("stage={} time={}", name, fmt_dur(t.elapsed()));
}

pub fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
