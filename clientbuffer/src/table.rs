use itertools::Itertools;

/// A plain-text table in the relay's module output style
///
/// ```text
/// +--------+-----------+
/// | Client | Connected |
/// +--------+-----------+
/// | *phone | yes       |
/// +--------+-----------+
/// ```
#[derive(Clone, Debug, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<T: ToString>(columns: impl IntoIterator<Item = T>) -> Self {
        Self {
            columns: columns.into_iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row. Missing cells are left blank and extra cells are dropped.
    pub fn add_row<T: ToString>(&mut self, cells: impl IntoIterator<Item = T>) {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.columns.len())
            .map(|c| c.to_string())
            .collect();
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn render(&self) -> Vec<String> {
        let widths: Vec<usize> = (0..self.columns.len())
            .map(|i| {
                std::iter::once(&self.columns[i])
                    .chain(self.rows.iter().map(|r| &r[i]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let separator = format!(
            "+{}+",
            widths.iter().map(|w| "-".repeat(w + 2)).join("+")
        );
        let format_row = |row: &[String]| {
            format!(
                "| {} |",
                row.iter()
                    .zip(&widths)
                    .map(|(cell, w)| format!("{:<width$}", cell, width = w))
                    .join(" | ")
            )
        };

        let mut lines = vec![separator.clone(), format_row(&self.columns), separator.clone()];
        lines.extend(self.rows.iter().map(|r| format_row(r)));
        lines.push(separator);
        lines
    }
}
