use crate::core::dotplot::{AxisBounds, Segment};
use crate::core::hist::Histogram;
use crate::core::table::TsvTable;
use anyhow::Result;

pub mod html;
pub mod svg;

/// Rendered chart or table, ready to embed in the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Chart(String);

impl Chart {
    pub fn new(markup: String) -> Self {
        Chart(markup)
    }

    pub fn markup(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

pub trait ChartRenderer {
    /// Bars outside `domain` are clipped.
    fn render_histogram(
        &self,
        hist: &Histogram,
        domain: (f64, f64),
        opts: &ChartOptions,
    ) -> Result<Chart>;

    fn render_scatter_segments(
        &self,
        segments: &[Segment],
        bounds: AxisBounds,
        opts: &ChartOptions,
    ) -> Result<Chart>;

    fn render_table(&self, table: &TsvTable, max_height: u32) -> Result<Chart>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Description(String),
    Table(Chart),
    Grid { columns: usize, charts: Vec<Chart> },
}

/// One tab of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub title: String,
    pub blocks: Vec<Block>,
}

pub trait ReportSink {
    fn write(&mut self, title: &str, lead: &str, sections: &[Section]) -> Result<()>;
}
