use crate::core::dotplot::{AxisBounds, Segment};
use crate::core::hist::Histogram;
use crate::core::model::ReportStyle;
use crate::core::table::TsvTable;
use crate::report::{Chart, ChartOptions, ChartRenderer};
use anyhow::Result;
use std::fmt::Write as FmtWrite;

const LEFT: f64 = 56.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 30.0;
const BOTTOM: f64 = 38.0;

/// Inline SVG charts and HTML tables.
pub struct SvgRenderer {
    style: ReportStyle,
}

impl SvgRenderer {
    pub fn new(style: ReportStyle) -> Self {
        Self { style }
    }

    fn open(&self, out: &mut String, opts: &ChartOptions) -> Result<Frame> {
        let (mt, mr, mb, ml) = self.style.margin;
        writeln!(
            out,
            "<div class=\"plot\" style=\"margin:{}px {}px {}px {}px\">",
            mt, mr, mb, ml
        )?;
        let w = opts.width as f64;
        let h = opts.height as f64;
        writeln!(
            out,
            "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            w, h, w, h
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"18\" font-size=\"12\" font-weight=\"bold\" fill=\"#333\">{}</text>",
            LEFT,
            escape(&opts.title)
        )?;
        let frame = Frame {
            left: LEFT,
            top: TOP,
            plot_w: (w - LEFT - RIGHT).max(1.0),
            plot_h: (h - TOP - BOTTOM).max(1.0),
        };
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
            frame.left, frame.top, frame.plot_w, frame.plot_h
        )?;
        Ok(frame)
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
}

impl Frame {
    fn x(&self, v: f64, min: f64, max: f64) -> f64 {
        self.left + (v - min) / (max - min).max(1e-6) * self.plot_w
    }

    fn y(&self, v: f64, min: f64, max: f64) -> f64 {
        self.top + self.plot_h - (v - min) / (max - min).max(1e-6) * self.plot_h
    }
}

impl ChartRenderer for SvgRenderer {
    fn render_histogram(
        &self,
        hist: &Histogram,
        domain: (f64, f64),
        opts: &ChartOptions,
    ) -> Result<Chart> {
        let mut out = String::with_capacity(8 * 1024);
        let f = self.open(&mut out, opts)?;
        let (x_min, x_max) = domain;
        let max_y = hist.max_count() as f64;
        draw_y_axis_ticks(&mut out, f, 0.0, max_y, 4)?;
        draw_x_axis_ticks(&mut out, f, x_min, x_max, 5)?;
        draw_axis_labels(&mut out, f, &opts.x_label, &opts.y_label)?;
        if x_max > x_min && max_y > 0.0 {
            for (lo, hi, count) in hist.bars() {
                let lo = lo.max(x_min);
                let hi = hi.min(x_max);
                if hi <= lo || count == 0 {
                    continue;
                }
                let x0 = f.x(lo, x_min, x_max);
                let x1 = f.x(hi, x_min, x_max);
                let y0 = f.y(count as f64, 0.0, max_y);
                writeln!(
                    out,
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" data-count=\"{}\"/>",
                    x0,
                    y0,
                    (x1 - x0).max(1.0),
                    f.top + f.plot_h - y0,
                    self.style.bar_color,
                    count
                )?;
            }
        }
        writeln!(out, "</svg></div>")?;
        Ok(Chart::new(out))
    }

    fn render_scatter_segments(
        &self,
        segments: &[Segment],
        bounds: AxisBounds,
        opts: &ChartOptions,
    ) -> Result<Chart> {
        let mut out = String::with_capacity(8 * 1024 + segments.len() * 96);
        let f = self.open(&mut out, opts)?;
        let (x_min, x_max) = (bounds.x.0 as f64, bounds.x.1 as f64);
        let (y_min, y_max) = (bounds.y.0 as f64, bounds.y.1 as f64);
        draw_y_axis_ticks(&mut out, f, y_min, y_max, 5)?;
        draw_x_axis_ticks(&mut out, f, x_min, x_max, 5)?;
        draw_axis_labels(&mut out, f, &opts.x_label, &opts.y_label)?;
        for s in segments {
            writeln!(
                out,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.5\" data-ref=\"{}-{}\" data-query=\"{}-{}\"/>",
                f.x(s.ref_start as f64, x_min, x_max),
                f.y(s.query_start as f64, y_min, y_max),
                f.x(s.ref_end as f64, x_min, x_max),
                f.y(s.query_end as f64, y_min, y_max),
                self.style.segment_color,
                s.ref_start,
                s.ref_end,
                s.query_start,
                s.query_end
            )?;
        }
        writeln!(out, "</svg></div>")?;
        Ok(Chart::new(out))
    }

    fn render_table(&self, table: &TsvTable, max_height: u32) -> Result<Chart> {
        let mut out = String::with_capacity(1024 + table.len() * 128);
        writeln!(
            out,
            "<div class=\"table-wrap\" style=\"max-height:{}px\">",
            max_height
        )?;
        writeln!(out, "<table class=\"table\">")?;
        out.push_str("<tr>");
        for h in &table.header {
            write!(out, "<th>{}</th>", escape(h))?;
        }
        out.push_str("</tr>\n");
        for row in &table.rows {
            out.push_str("<tr>");
            for cell in row {
                write!(out, "<td>{}</td>", escape(cell))?;
            }
            out.push_str("</tr>\n");
        }
        writeln!(out, "</table></div>")?;
        Ok(Chart::new(out))
    }
}

fn draw_y_axis_ticks(
    out: &mut String,
    f: Frame,
    min_y: f64,
    max_y: f64,
    ticks: usize,
) -> Result<()> {
    for v in axis_ticks(min_y, max_y, ticks) {
        let y = f.y(v, min_y, max_y);
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{:.2}\" x2=\"{}\" y2=\"{:.2}\" stroke=\"#eee\"/>",
            f.left,
            y,
            f.left + f.plot_w,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{:.2}\" font-size=\"10\" fill=\"#666\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            f.left - 4.0,
            y,
            tick_label(v)
        )?;
    }
    Ok(())
}

fn draw_x_axis_ticks(
    out: &mut String,
    f: Frame,
    min_x: f64,
    max_x: f64,
    ticks: usize,
) -> Result<()> {
    for v in axis_ticks(min_x, max_x, ticks) {
        let x = f.x(v, min_x, max_x);
        writeln!(
            out,
            "<line x1=\"{:.2}\" y1=\"{}\" x2=\"{:.2}\" y2=\"{}\" stroke=\"#eee\"/>",
            x,
            f.top,
            x,
            f.top + f.plot_h
        )?;
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{}\" font-size=\"10\" fill=\"#666\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            x,
            f.top + f.plot_h + 4.0,
            tick_label(v)
        )?;
    }
    Ok(())
}

fn draw_axis_labels(out: &mut String, f: Frame, x_label: &str, y_label: &str) -> Result<()> {
    let x = f.left + f.plot_w / 2.0;
    let y = f.top + f.plot_h + 26.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
        x,
        y,
        escape(x_label)
    )?;
    let yx = f.left - 40.0;
    let yy = f.top + f.plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx,
        yy,
        yx,
        yy,
        escape(y_label)
    )?;
    Ok(())
}

/// Tick values inside `[lo, hi]`, about `target` of them, spaced by
/// 1, 2 or 5 times a power of ten.
fn axis_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if target < 2 || span.is_nan() || span <= 1e-9 {
        return Vec::new();
    }
    let raw = span / (target - 1) as f64;
    let pow = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0]
        .into_iter()
        .map(|m| m * pow)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * pow);
    let first = (lo / step - 1e-9).ceil() as i64;
    let last = (hi / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn tick_label(v: f64) -> String {
    let hundredths = (v * 100.0).round() / 100.0;
    if hundredths == 0.0 {
        "0".to_string()
    } else {
        hundredths.to_string()
    }
}

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
