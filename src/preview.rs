use serde::Serialize;

use crate::ingest::LoadedFile;

/// Columns wider than this are cut in the terminal dump.
pub const MAX_COLUMN_WIDTH: usize = 40;

/// A loaded file as shown to the user: header plus non-blank rows, each row
/// padded or cut to the header width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TablePreview {
    pub fn from_file(file: &LoadedFile) -> Self {
        let width = file.table.headers.len();
        let rows = file
            .table
            .data_rows()
            .map(|row| {
                (0..width)
                    .map(|i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            name: file.name.clone(),
            headers: file.table.headers.clone(),
            rows,
        }
    }

    pub fn info(&self) -> String {
        format!("Rows: {} | Columns: {}", self.rows.len(), self.headers.len())
    }

    /// Fixed-width text rendering, one column per header, cells cut at
    /// [`MAX_COLUMN_WIDTH`] characters.
    pub fn render_fixed_width(&self) -> String {
        let rule = "=".repeat(80);
        let mut out = format!("{rule}\nCSV FILE: {}\n{rule}\n", self.name);

        if self.headers.is_empty() {
            out.push_str("(Empty file)\n");
            return out;
        }

        let widths: Vec<usize> = (0..self.headers.len())
            .map(|i| {
                std::iter::once(&self.headers)
                    .chain(&self.rows)
                    .map(|row| row[i].chars().count())
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();

        let header_line = format_row(&self.headers, &widths);
        out.push_str(&header_line);
        out.push('\n');
        out.push_str(&"-".repeat(header_line.chars().count()));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format_row(row, &widths));
            out.push('\n');
        }

        out.push_str(&format!("\nTotal rows: {}\n{rule}\n", self.rows.len()));
        out
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let cut: String = cell.chars().take(width).collect();
            format!("{:<width$}", cut, width = width)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
