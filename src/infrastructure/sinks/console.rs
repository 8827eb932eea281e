//! Console sink: renders the report as an aligned text table on stdout.

use crate::domain::entities::Report;
use crate::domain::errors::Result;
use crate::ports::sink_port::SinkPort;

pub struct ConsoleSink;

impl SinkPort for ConsoleSink {
    fn write(&self, report: &Report) -> Result<()> {
        println!("{}", report.name);
        print!("{}", render_text(report));
        Ok(())
    }
}

/// Renders the report with each column padded to its widest cell.
pub fn render_text(report: &Report) -> String {
    let mut widths: Vec<usize> = report.columns.iter().map(|c| c.len()).collect();
    let rendered_rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();
    for row in &rendered_rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    let render_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:>width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    out.push_str(&render_line(
        report.columns.iter().map(|c| c.as_str()).collect(),
    ));
    out.push('\n');
    for row in &rendered_rows {
        out.push_str(&render_line(row.iter().map(|c| c.as_str()).collect()));
        out.push('\n');
    }
    out
}
