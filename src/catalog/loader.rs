use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::table::Table;
use super::{CatalogError, Result};

/// Load a CSV file with a header row into a [`Table`].
pub fn load_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_csv(file)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV from any reader. Ragged rows are accepted; short rows read as missing cells.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut table = Table::new(columns);

    for record in rdr.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_headers_and_rows() {
        let data = "name_song, energy\nA,0.5\n\"B, live\",0.7\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["name_song", "energy"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 0), Some("B, live"));
        assert_eq!(table.cell(1, 1), Some("0.7"));
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let data = "a,b,c\n1,2\n";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.cell(0, 1), Some("2"));
        assert_eq!(table.cell(0, 2), None);
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv(Path::new("/nonexistent/songs.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
