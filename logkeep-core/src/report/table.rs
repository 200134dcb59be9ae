use std::fmt::Write;

/// A two-column ASCII table with `+---+---+` rules, one space of padding on
/// each side of a cell, a right-aligned left column and a left-aligned right
/// column. Widths are character counts over the header and every row.
pub struct TwoColumn {
    left_header: String,
    right_header: String,
    rows: Vec<(String, String)>,
}

impl TwoColumn {
    pub fn new(left_header: &str, right_header: &str) -> Self {
        Self {
            left_header: left_header.to_owned(),
            right_header: right_header.to_owned(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.rows.push((left.into(), right.into()));
    }

    /// Render the table. No trailing newline after the bottom rule. An empty
    /// table still shows the header block, closed by a second rule.
    pub fn render(&self) -> String {
        let width = |header: &str, pick: fn(&(String, String)) -> &String| {
            self.rows
                .iter()
                .map(|row| pick(row).chars().count())
                .chain([header.chars().count()])
                .max()
                .unwrap_or(0)
        };
        let left_w = width(&self.left_header, |r| &r.0);
        let right_w = width(&self.right_header, |r| &r.1);

        let rule = format!("+-{}-+-{}-+", "-".repeat(left_w), "-".repeat(right_w));
        let line = |left: &str, right: &str| {
            format!(
                "| {:>lw$} | {:<rw$} |",
                left,
                right,
                lw = left_w,
                rw = right_w
            )
        };

        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", line(&self.left_header, &self.right_header));
        let _ = writeln!(out, "{rule}");
        for (left, right) in &self.rows {
            let _ = writeln!(out, "{}", line(left, right));
        }
        let _ = write!(out, "{rule}");
        out
    }
}
