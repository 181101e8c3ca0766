//! The loaded recommender: working catalog + similarity matrix.
//!
//! Build order: validate the table, drop rows with missing features, fit the
//! scaler on every eligible row and standardize, then sample rows from the
//! standardized matrix and compute similarity over the sample. A [`Session`]
//! never changes after construction; reloading builds a new one.

use indicatif::ProgressBar;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError, MIN_ELIGIBLE, SongRecord, Table};
use crate::normalize::Scaler;
use crate::recommend::{self, QueryError, Recommendation};
use crate::sample::{self, DEFAULT_CAP, DEFAULT_SEED};
use crate::similarity::{SimilarityError, SimilarityMatrix};
use crate::{FEATURE_COLUMNS, FEATURE_DIM};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Similarity(#[from] SimilarityError),
    #[error("Sample cap must be at least {min}, got {cap}", min = MIN_ELIGIBLE)]
    CapTooSmall { cap: usize },
}

/// Knobs for building a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum working catalog size.
    pub sample_cap: usize,
    /// Sampling seed.
    pub seed: u64,
    /// Threads for the similarity build. 0 = rayon default.
    pub workers: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_CAP,
            seed: DEFAULT_SEED,
            workers: 0,
        }
    }
}

/// Counts gathered while building a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub total_rows: usize,
    pub eligible_rows: usize,
    pub dropped_rows: usize,
    pub working_size: usize,
    pub degenerate_rows: usize,
    pub constant_features: Vec<&'static str>,
}

#[derive(Debug)]
pub struct Session {
    songs: Vec<SongRecord>,
    names: Vec<String>,
    normalized: Vec<[f64; FEATURE_DIM]>,
    scaler: Scaler,
    matrix: SimilarityMatrix,
    stats: SessionStats,
}

impl Session {
    pub fn from_table(
        table: &Table,
        opts: &SessionOptions,
        pb: &ProgressBar,
    ) -> Result<Self, SessionError> {
        let catalog = Catalog::from_table(table)?;
        Self::from_catalog(catalog, opts, pb)
    }

    pub fn from_catalog(
        catalog: Catalog,
        opts: &SessionOptions,
        pb: &ProgressBar,
    ) -> Result<Self, SessionError> {
        if opts.sample_cap < MIN_ELIGIBLE {
            return Err(SessionError::CapTooSmall {
                cap: opts.sample_cap,
            });
        }

        let (scaler, normalized_all) = Scaler::fit_transform(&catalog.feature_rows());

        let constant_features: Vec<&'static str> = scaler
            .constant_columns()
            .into_iter()
            .map(|d| FEATURE_COLUMNS[d])
            .collect();
        if !constant_features.is_empty() {
            log::warn!(
                "Constant features normalize to 0: {}",
                constant_features.join(", ")
            );
        }

        let picked = sample::sample_indices(catalog.len(), opts.sample_cap, opts.seed);
        let songs = sample::take_rows(&catalog.records, &picked);
        let normalized = sample::take_rows(&normalized_all, &picked);
        let names: Vec<String> = songs.iter().map(|s| s.name.clone()).collect();

        log::info!(
            "Working catalog: {} of {} eligible songs (cap {}, seed {})",
            songs.len(),
            catalog.len(),
            opts.sample_cap,
            opts.seed
        );

        let matrix = SimilarityMatrix::compute(&normalized, opts.workers, pb)?;

        let stats = SessionStats {
            total_rows: catalog.total_rows,
            eligible_rows: catalog.len(),
            dropped_rows: catalog.dropped_rows(),
            working_size: songs.len(),
            degenerate_rows: matrix.degenerate_count(),
            constant_features,
        };

        Ok(Self {
            songs,
            names,
            normalized,
            scaler,
            matrix,
            stats,
        })
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Song identifiers in working-catalog order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn song(&self, index: usize) -> Option<&SongRecord> {
        self.songs.get(index)
    }

    /// Standardized feature vector of a working-catalog row.
    pub fn normalized(&self, index: usize) -> Option<&[f64; FEATURE_DIM]> {
        self.normalized.get(index)
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// First row whose identifier equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Top `top_n` songs most similar to row `query`.
    pub fn recommend(
        &self,
        query: usize,
        top_n: usize,
    ) -> Result<Vec<Recommendation>, QueryError> {
        recommend::recommend(&self.matrix, &self.names, query, top_n)
    }

    /// Like [`Session::recommend`], resolving the query by identifier.
    pub fn recommend_by_name(
        &self,
        name: &str,
        top_n: usize,
    ) -> Result<Vec<Recommendation>, QueryError> {
        let query = self
            .find(name)
            .ok_or_else(|| QueryError::UnknownSong(name.to_string()))?;
        self.recommend(query, top_n)
    }
}

/// Whether a dataset has been successfully loaded.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Ready(Session),
}

impl SessionState {
    /// Build a fresh session from `table`, replacing any previous one.
    ///
    /// On failure the state is left `Uninitialized`; a previous session is never
    /// kept alongside a failed reload.
    pub fn load(
        &mut self,
        table: &Table,
        opts: &SessionOptions,
        pb: &ProgressBar,
    ) -> Result<(), SessionError> {
        *self = Self::Uninitialized;
        *self = Self::Ready(Session::from_table(table, opts, pb)?);
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Ready(session) => Some(session),
            Self::Uninitialized => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
