//! shardmig-core: the data a migration router works over.
//!
//! A [`Topology`] is loaded once from configuration and never mutated. Each
//! migration carries an immutable [`Scope`], and the runner hands a fresh
//! [`ExecutionContext`] to the resolution engine for every execution pass.
//!
//! # Components
//!
//! - **`topology`**: clusters, primary shards and sequence shards
//! - **`scope`**: migration scopes and per-pass execution contexts
//! - **`config`**: topology and migration manifest files (TOML)
//! - **`error`**: configuration errors shared by every shardmig crate

pub mod config;
pub mod error;
pub mod scope;
pub mod topology;

pub use config::{
    ClusterConfig, MigrationDeclaration, MigrationManifest, SequenceConfig, ShardConfig,
    TopologyConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use scope::{ClusterSet, ExecutionContext, Scope};
pub use topology::{Cluster, SequenceShard, ShardRef, Topology};
