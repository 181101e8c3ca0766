pub mod loader;
pub mod table;

use thiserror::Error;

use crate::{FEATURE_COLUMNS, FEATURE_DIM, ID_COLUMN};
pub use table::Table;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Dataset is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("Need at least 2 songs with complete features, found {eligible}")]
    EmptyCatalog { eligible: usize },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Fewest eligible songs that make a recommendation meaningful.
pub const MIN_ELIGIBLE: usize = 2;

/// A song and its raw audio features, in [`FEATURE_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct SongRecord {
    pub name: String,
    pub features: [f64; FEATURE_DIM],
}

/// All eligible songs from a dataset, in input order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub records: Vec<SongRecord>,
    /// Rows in the input table, eligible or not.
    pub total_rows: usize,
}

impl Catalog {
    /// Validate the schema and keep every row whose ten features are all present and finite.
    pub fn from_table(table: &Table) -> Result<Self> {
        let id_col = table.column_index(ID_COLUMN);
        let feature_cols: Vec<Option<usize>> =
            FEATURE_COLUMNS.iter().map(|c| table.column_index(c)).collect();

        let missing: Vec<String> = std::iter::once((ID_COLUMN, id_col))
            .chain(FEATURE_COLUMNS.iter().copied().zip(feature_cols.iter().copied()))
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::Schema { missing });
        }

        let id_col = id_col.unwrap_or_default();
        let feature_cols: Vec<usize> = feature_cols.into_iter().flatten().collect();

        let records: Vec<SongRecord> = (0..table.len())
            .filter_map(|row| {
                let mut features = [0.0_f64; FEATURE_DIM];
                for (d, &col) in feature_cols.iter().enumerate() {
                    features[d] = parse_feature(table.cell(row, col)?)?;
                }
                let name = table.cell(row, id_col).unwrap_or("").to_string();
                Some(SongRecord { name, features })
            })
            .collect();

        let dropped = table.len() - records.len();
        if dropped > 0 {
            log::warn!("Dropped {} rows with missing or non-numeric features", dropped);
        }

        if records.len() < MIN_ELIGIBLE {
            return Err(CatalogError::EmptyCatalog {
                eligible: records.len(),
            });
        }

        log::debug!("{} eligible songs out of {} rows", records.len(), table.len());
        Ok(Self {
            records,
            total_rows: table.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped for missing features.
    pub fn dropped_rows(&self) -> usize {
        self.total_rows - self.records.len()
    }

    /// Feature vectors in record order.
    pub fn feature_rows(&self) -> Vec<[f64; FEATURE_DIM]> {
        self.records.iter().map(|r| r.features).collect()
    }
}

/// Numeric cell → feature value. NaN and infinities count as missing.
fn parse_feature(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
