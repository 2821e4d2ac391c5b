use crate::report::svg::escape;
use crate::report::{Block, ReportSink, Section};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the report as one self-contained HTML file with a tab per section.
pub struct HtmlReport {
    path: PathBuf,
}

impl HtmlReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for HtmlReport {
    fn write(&mut self, title: &str, lead: &str, sections: &[Section]) -> Result<()> {
        let html = render(title, lead, sections)?;
        write_atomic(&self.path, html.as_bytes())
    }
}

pub fn render(title: &str, lead: &str, sections: &[Section]) -> Result<String> {
    let mut html = String::with_capacity(256 * 1024);
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", escape(title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, ".lead{{color:#555;font-size:16px;margin-bottom:16px;}}")?;
    writeln!(
        html,
        ".tabs{{border-bottom:1px solid #ddd;margin:16px 0 0 0;}}"
    )?;
    writeln!(
        html,
        ".tabs button{{background:none;border:1px solid transparent;border-bottom:none;padding:8px 16px;font-size:14px;cursor:pointer;}}"
    )?;
    writeln!(
        html,
        ".tabs button.active{{border-color:#ddd;background:#fff;margin-bottom:-1px;font-weight:bold;}}"
    )?;
    writeln!(html, ".panel{{display:none;padding-top:8px;}}")?;
    writeln!(html, ".panel.active{{display:block;}}")?;
    writeln!(
        html,
        ".desc{{display:block;width:100%;padding:25px 0 0 0;font-size:16px;margin-bottom:0;}}"
    )?;
    writeln!(
        html,
        ".grid{{display:grid;gap:0;align-items:start;}}"
    )?;
    writeln!(
        html,
        ".table-wrap{{overflow:auto;margin:12px 0 20px 0;}}"
    )?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;width:100%;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:left;}}"
    )?;
    writeln!(html, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    writeln!(html, "<h1>{}</h1>", escape(title))?;
    writeln!(html, "<p class=\"lead\">{}</p>", escape(lead))?;

    writeln!(html, "<div class=\"tabs\">")?;
    for (i, section) in sections.iter().enumerate() {
        writeln!(
            html,
            "<button class=\"{}\" data-tab=\"tab-{}\">{}</button>",
            if i == 0 { "active" } else { "" },
            i,
            escape(&section.title)
        )?;
    }
    writeln!(html, "</div>")?;

    for (i, section) in sections.iter().enumerate() {
        writeln!(
            html,
            "<div class=\"panel{}\" id=\"tab-{}\">",
            if i == 0 { " active" } else { "" },
            i
        )?;
        for block in &section.blocks {
            write_block(&mut html, block)?;
        }
        writeln!(html, "</div>")?;
    }

    html.push_str("<script>");
    html.push_str(r#"document.querySelectorAll('.tabs button').forEach(b=>{b.addEventListener('click',()=>{document.querySelectorAll('.tabs button').forEach(x=>x.classList.remove('active'));document.querySelectorAll('.panel').forEach(p=>p.classList.remove('active'));b.classList.add('active');document.getElementById(b.getAttribute('data-tab')).classList.add('active');});});"#);
    html.push_str("</script>");
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn write_block(out: &mut String, block: &Block) -> Result<()> {
    match block {
        Block::Description(text) => {
            writeln!(out, "<p class=\"desc lead\">{}</p>", escape(text))?;
        }
        Block::Table(chart) => {
            out.push_str(chart.markup());
        }
        Block::Grid { columns, charts } => {
            writeln!(
                out,
                "<div class=\"grid\" style=\"grid-template-columns:repeat({},max-content)\">",
                (*columns).max(1)
            )?;
            for chart in charts {
                out.push_str(chart.markup());
            }
            writeln!(out, "</div>")?;
        }
    }
    Ok(())
}

/// Writes next to `path` and renames into place, so a failed write leaves no file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    let result = (|| -> Result<()> {
        let file = File::create(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;
        let mut w = BufWriter::new(file);
        w.write_all(bytes)?;
        w.flush()?;
        Ok(())
    })();

    match result.and_then(|_| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to move report to {}", path.display()))
    }) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Chart;

    fn sections() -> Vec<Section> {
        vec![
            Section {
                title: "Assemblies".to_string(),
                blocks: vec![
                    Block::Description("stats & dotplots".to_string()),
                    Block::Table(Chart::new("<table id=\"t\"></table>".to_string())),
                    Block::Grid {
                        columns: 2,
                        charts: vec![Chart::new("<svg id=\"d1\"></svg>".to_string())],
                    },
                ],
            },
            Section {
                title: "Samples".to_string(),
                blocks: vec![],
            },
        ]
    }

    #[test]
    fn sections_become_tabs_in_order() -> Result<()> {
        let html = render("Clone Validation", "lead <text>", &sections())?;
        let a = html.find("data-tab=\"tab-0\">Assemblies").unwrap_or(usize::MAX);
        let s = html.find("data-tab=\"tab-1\">Samples").unwrap_or(0);
        assert!(a < s);
        assert!(html.contains("lead &lt;text&gt;"));
        assert!(html.contains("stats &amp; dotplots"));
        assert!(html.contains("<table id=\"t\"></table>"));
        assert!(html.contains("repeat(2,max-content)"));
        Ok(())
    }

    #[test]
    fn writes_report_without_leftovers() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("report.html");
        HtmlReport::new(&path).write("T", "L", &sections())?;
        assert!(fs::read_to_string(&path)?.contains("<h1>T</h1>"));
        assert!(!dir.path().join("report.html.tmp").exists());
        Ok(())
    }

    #[test]
    fn failed_write_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.html");
        assert!(HtmlReport::new(&path).write("T", "L", &[]).is_err());
        assert!(!path.exists());
    }
}
