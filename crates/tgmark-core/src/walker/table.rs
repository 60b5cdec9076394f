use unicode_width::UnicodeWidthStr;

const COLUMN_SEPARATOR: &str = " | ";
const HEADER_SEPARATOR: &str = "-+-";

/// Collects table cells as plain text and lays them out as monospaced rows.
#[derive(Debug, Clone, Default)]
pub(super) struct TableBuffer {
    /// Finished rows; the first one is the header.
    rows: Vec<Vec<String>>,
    /// Current row being built.
    current_row: Vec<String>,
    /// Current cell text being collected.
    current_cell: String,
}

impl TableBuffer {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Appends cell text. Line breaks collapse into single spaces.
    pub(super) fn push_cell_text(&mut self, text: &str) {
        if text.contains(['\n', '\r']) {
            let flattened = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
            self.current_cell.push_str(&flattened);
        } else {
            self.current_cell.push_str(text);
        }
    }

    pub(super) fn finish_cell(&mut self) {
        let cell = std::mem::take(&mut self.current_cell);
        self.current_row.push(cell);
    }

    pub(super) fn finish_row(&mut self) {
        let row = std::mem::take(&mut self.current_row);
        self.rows.push(row);
    }

    /// Renders left-justified columns joined by `" | "`, with a dashed
    /// separator under the header when the table has a body.
    pub(super) fn render(&self) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return String::new();
        }

        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (index, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(column, &width)| {
                    let cell = row.get(column).map(String::as_str).unwrap_or_default();
                    let padding = width.saturating_sub(cell.width());
                    format!("{cell}{}", " ".repeat(padding))
                })
                .collect();
            lines.push(cells.join(COLUMN_SEPARATOR));

            if index == 0 && self.rows.len() > 1 {
                let dashes: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
                lines.push(dashes.join(HEADER_SEPARATOR));
            }
        }
        lines.join("\n")
    }
}
