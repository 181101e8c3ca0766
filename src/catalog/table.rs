/// A loosely-typed tabular dataset: named columns, string cells.
///
/// Rows may be shorter than the header (ragged input); absent cells read as missing.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, col), `None` if the row is too short or the cell is blank.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.push_row(vec!["1".into(), "  ".into()]);
        t.push_row(vec!["2".into()]);
        t
    }

    #[test]
    fn test_column_index() {
        let t = sample_table();
        assert_eq!(t.column_index("b"), Some(1));
        assert_eq!(t.column_index("c"), None);
    }

    #[test]
    fn test_blank_and_ragged_cells_are_missing() {
        let t = sample_table();
        assert_eq!(t.cell(0, 0), Some("1"));
        assert_eq!(t.cell(0, 1), None);
        assert_eq!(t.cell(1, 1), None);
        assert_eq!(t.cell(5, 0), None);
    }
}
