pub mod catalog;
pub mod config;
pub mod normalize;
pub mod recommend;
pub mod sample;
pub mod session;
pub mod similarity;

/// Column holding the song identifier.
pub const ID_COLUMN: &str = "name_song";

/// Audio feature columns, in feature-vector order.
pub const FEATURE_COLUMNS: [&str; FEATURE_DIM] = [
    "danceability",
    "energy",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
];

/// Dimension of a song's feature vector.
pub const FEATURE_DIM: usize = 10;

/// Application name for XDG paths
pub const APP_NAME: &str = "songsim";
