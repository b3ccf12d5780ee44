//! Box-drawn summary printed after a run.

use crate::transpile::Stats;
use std::fmt;
use std::path::Path;

/// Input/output comparison for one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub infile: String,
    pub outfile: String,
    pub stats: Stats,
    pub in_size: u64,
    pub out_size: u64,
}

impl Report {
    /// Only the final path component of each file is shown.
    pub fn new(infile: &Path, outfile: &Path, stats: Stats, in_size: u64, out_size: u64) -> Self {
        Report {
            infile: file_name(infile),
            outfile: file_name(outfile),
            stats,
            in_size,
            out_size,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn kib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        let rows: [(&str, String, String); 6] = [
            ("", self.infile.clone(), self.outfile.clone()),
            (
                "Instructions",
                s.instructions_in.to_string(),
                s.instructions_out.to_string(),
            ),
            (
                "(Transpiled)",
                format!("({})", s.transpiled_in),
                format!("({})", s.transpiled_out),
            ),
            ("(Native)", format!("({})", s.native), format!("({})", s.native)),
            ("File Size (b)", self.in_size.to_string(), self.out_size.to_string()),
            ("(Kb)", kib(self.in_size), kib(self.out_size)),
        ];

        let w = rows
            .iter()
            .flat_map(|(_, a, b)| [a.chars().count(), b.chars().count()])
            .max()
            .unwrap_or(0);
        let hline = "─".repeat(w);

        writeln!(f, "                ┌─{hline}─┬─{hline}─┐")?;
        writeln!(f, "                │ {:<w$} │ {:<w$} │", rows[0].1, rows[0].2)?;
        writeln!(f, "┌───────────────┼─{hline}─┼─{hline}─┤")?;
        for (title, a, b) in &rows[1..4] {
            writeln!(f, "│ {title:<13} │ {a:<w$} │ {b:<w$} │")?;
        }
        writeln!(f, "├───────────────┼─{hline}─┼─{hline}─┤")?;
        for (title, a, b) in &rows[4..] {
            writeln!(f, "│ {title:<13} │ {a:<w$} │ {b:<w$} │")?;
        }
        writeln!(f, "└───────────────┴─{hline}─┴─{hline}─┘")
    }
}
