//! Error types for topology and migration scope configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration and resolution operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a topology or resolving a migration scope.
///
/// Every variant is fatal for the migration that triggered it: a scope that
/// cannot be resolved must never degrade into an empty target list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown cluster: {0}")]
    UnknownCluster(String),

    #[error("cluster {0} has no shards")]
    EmptyCluster(String),

    #[error("cluster {0} is defined more than once")]
    DuplicateCluster(String),

    #[error("sequence {sequence} is defined more than once in cluster {cluster}")]
    DuplicateSequence { cluster: String, sequence: String },

    #[error("cluster {cluster} has a blank connection identifier")]
    EmptyConnection { cluster: String },

    #[error("cluster scope names no clusters")]
    EmptyClusterScope,

    #[error("migration {migration} declares a blank shard identifier")]
    BlankShard { migration: String },

    #[error("migration {migration} declares more than one scope kind")]
    ConflictingScope { migration: String },

    #[error("unknown migration: {0}")]
    UnknownMigration(String),

    #[error("migration {migration}: {source}")]
    InvalidMigration {
        migration: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Attach the name of the migration whose scope produced this error.
    pub fn in_migration(self, migration: &str) -> Self {
        ConfigError::InvalidMigration {
            migration: migration.to_string(),
            source: Box::new(self),
        }
    }
}
