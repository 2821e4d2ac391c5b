/// Presentation constants shared by every chart and table in the report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportStyle {
    pub bar_color: &'static str,
    pub segment_color: &'static str,
    /// top, right, bottom, left
    pub margin: (u32, u32, u32, u32),
    pub dotplot_size: (u32, u32),
    pub histogram_size: (u32, u32),
    pub bins: usize,
    pub table_row_height: u32,
    pub table_height: u32,
    pub grid_columns: usize,
    pub length_padding: u64,
    pub quality_domain: (f64, f64),
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            bar_color: "#6495ed",
            segment_color: "#1f77b4",
            margin: (10, 10, 40, 10),
            dotplot_size: (440, 400),
            histogram_size: (400, 300),
            bins: 30,
            table_row_height: 25,
            table_height: 400,
            grid_columns: 2,
            length_padding: 200,
            quality_domain: (0.0, 30.0),
        }
    }
}

impl ReportStyle {
    /// Display height of a table with `rows` data rows plus a header.
    pub fn table_max_height(&self, rows: usize) -> u32 {
        let capped = self.table_row_height as usize * (rows + 1);
        self.table_height.min(capped.min(u32::MAX as usize) as u32)
    }
}

/// Formats a float the way the workflow prints it: whole numbers keep one decimal.
pub fn fmt_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}
