use std::path::PathBuf;

/// Errors that can occur when querying or mutating a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("column {col} is out of range (board has {cols} columns)")]
    OutOfRange { col: usize, cols: usize },

    #[error("cell ({row}, {col}) is occupied or outside the grid")]
    InvalidCell { row: usize, col: usize },

    #[error("snapshot rows must be non-empty and of equal length")]
    MalformedSnapshot,
}

/// Errors that can occur during an MCTS search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("the game is already decided; a finished board cannot be searched")]
    GameOver,

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("search tree invariant violated: {0}")]
    InvariantViolation(String),

    #[error("board error: {0}")]
    Board(#[from] BoardError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
