//! Terminal output helpers.
//!
//! - `clear_screen` - wipe the console before a directory listing
//! - `print_entries` - numbered file/directory listing used for selection
//! - `Table` - box-drawn table sized to the terminal, used for the run summary

use crate::walk::FileSystemEntry;
use colored::*;
use console::{Term, measure_text_width, truncate_str};

pub fn clear_screen() {
    // not a tty (piped or under test): nothing to clear
    let _ = Term::stdout().clear_screen();
}

pub fn print_entries(entries: &[FileSystemEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let kind = if entry.is_file {
            "File:     ".normal()
        } else {
            "Directory:".cyan()
        };
        println!(
            "  {:>3}. {} {}",
            i.to_string().bold(),
            kind,
            entry.path.display()
        );
    }
}

pub fn print_step(icon: &str, message: &str) {
    println!("\n{} {}", icon.cyan(), message.bold());
}

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        if self.headers.is_empty() {
            return;
        }
        let (_, term_width) = Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }

    /// Column widths shrink widest-first until the table fits `max_width`.
    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(&flatten(cell)));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some((idx, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    fn render(&self, max_width: usize) -> Vec<String> {
        let widths = self.column_widths(max_width);
        let separator = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cells.join(mid), right)
        };
        let row_line = |cells: &[String], bold: bool| {
            let mut line = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let text = truncate_str(&flatten(cell), *width, "...").to_string();
                let padding = width.saturating_sub(measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                line.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
            }
            line
        };

        let mut lines = vec![separator("┌", "┬", "┐"), row_line(&self.headers, true)];
        lines.push(separator("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(row_line(row, false));
        }
        lines.push(separator("└", "┴", "┘"));
        lines
    }
}

fn flatten(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
