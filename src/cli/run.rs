use crate::cli::args::Cli;
use crate::core::engine::{self, REPORT_LEAD, REPORT_TITLE, RunConfig, fmt_dur, log_stage};
use crate::core::model::ReportStyle;
use crate::report::html::HtmlReport;
use crate::report::svg::SvgRenderer;
use crate::report::ReportSink;
use anyhow::{Result, bail};
use clap::Parser;
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    run(cli)
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: Cli) -> Result<()> {
    let t0 = Instant::now();

    stage("preflight", || {
        require_file(&args.assembly_summary)?;
        for maf in &args.assembly_mafs {
            require_file(maf)?;
        }
        require_file(&args.reads_summary)?;
        require_file(&args.fastq_summary)?;
        if args.bins == 0 {
            bail!("--bins must be >= 1");
        }
        Ok(())
    })?;

    let config = RunConfig {
        assembly_summary: args.assembly_summary,
        assembly_mafs: args.assembly_mafs,
        reads_summary: args.reads_summary,
        fastq_summary: args.fastq_summary,
        style: ReportStyle {
            bins: args.bins,
            ..ReportStyle::default()
        },
    };

    let renderer = SvgRenderer::new(config.style.clone());
    let sections = engine::run(&config, &renderer)?;

    let t_write = Instant::now();
    HtmlReport::new(&args.out).write(REPORT_TITLE, REPORT_LEAD, &sections)?;
    log_stage("write", t_write);

    info!("wrote {}", args.out.display());
    debug!("total={}", fmt_dur(t0.elapsed()));
    Ok(())
}

fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("input file not found: {}", path.display());
    }
    Ok(())
}

fn stage<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    log_stage(name, t);
    res
}
