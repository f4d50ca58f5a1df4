//! Topology and migration manifest parsers.
//!
//! Both files are TOML. Clusters and migrations are arrays of tables so that
//! declaration order survives parsing.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::scope::Scope;
use crate::topology::{Cluster, SequenceShard, ShardRef, Topology};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyConfig {
    #[serde(default)]
    pub clusters: Vec<ClusterConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    pub name: String,
    #[serde(default)]
    pub shards: Vec<ShardConfig>,
    #[serde(default)]
    pub sequences: Vec<SequenceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShardConfig {
    pub connection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceConfig {
    pub name: String,
    pub connection: String,
}

impl TopologyConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        parse_file(path)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate and freeze into a [`Topology`].
    pub fn into_topology(self) -> ConfigResult<Topology> {
        let clusters = self
            .clusters
            .into_iter()
            .map(|c| Cluster {
                name: c.name,
                shards: c
                    .shards
                    .into_iter()
                    .map(|s| ShardRef::new(s.connection))
                    .collect(),
                sequence_shards: c
                    .sequences
                    .into_iter()
                    .map(|s| SequenceShard {
                        name: s.name,
                        shard: ShardRef::new(s.connection),
                    })
                    .collect(),
            })
            .collect();

        let topology = Topology::new(clusters)?;
        info!(clusters = topology.len(), "loaded topology");
        Ok(topology)
    }
}

impl Topology {
    /// Load and validate a topology file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        TopologyConfig::from_file(path)?.into_topology()
    }
}

/// The migrations known to a runner, in run order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationManifest {
    #[serde(default)]
    pub migrations: Vec<MigrationDeclaration>,
}

/// One migration's scope, as declared by its author.
///
/// At most one of `clusters`, `shards` and `all_clusters` may be set.
/// Declaring none of them makes the migration master-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationDeclaration {
    pub name: String,
    pub version: Option<u64>,
    #[serde(default)]
    pub clusters: Vec<String>,
    #[serde(default)]
    pub shards: Vec<String>,
    #[serde(default)]
    pub all_clusters: bool,
}

impl MigrationDeclaration {
    pub fn master_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            clusters: Vec::new(),
            shards: Vec::new(),
            all_clusters: false,
        }
    }

    /// Resolve the declaration into a [`Scope`].
    ///
    /// `all_clusters` expands to every cluster of `topology` in declaration
    /// order, and fails when the topology has none.
    pub fn scope(&self, topology: &Topology) -> ConfigResult<Scope> {
        let declared = [
            self.all_clusters,
            !self.clusters.is_empty(),
            !self.shards.is_empty(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if declared > 1 {
            return Err(ConfigError::ConflictingScope {
                migration: self.name.clone(),
            });
        }
        if self.shards.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankShard {
                migration: self.name.clone(),
            });
        }

        let scope = if self.all_clusters {
            if topology.is_empty() {
                return Err(ConfigError::EmptyClusterScope);
            }
            Scope::clusters(topology.cluster_names())
        } else if !self.clusters.is_empty() {
            Scope::clusters(self.clusters.iter().cloned())
        } else if !self.shards.is_empty() {
            Scope::shards(self.shards.iter().cloned())
        } else {
            Scope::MasterOnly
        };
        Ok(scope)
    }

    /// Whether `key` is this migration's name or version.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.version.is_some_and(|v| v.to_string() == key)
    }
}

impl MigrationManifest {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        parse_file(path)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Find a migration by name or version.
    pub fn find(&self, key: &str) -> ConfigResult<&MigrationDeclaration> {
        self.migrations
            .iter()
            .find(|m| m.matches(key))
            .ok_or_else(|| ConfigError::UnknownMigration(key.to_string()))
    }

    /// Check every migration's scope against `topology` before anything runs.
    pub fn validate(&self, topology: &Topology) -> ConfigResult<()> {
        for migration in &self.migrations {
            migration
                .scope(topology)
                .and_then(|scope| topology.validate_scope(&scope))
                .map_err(|e| e.in_migration(&migration.name))?;
        }
        Ok(())
    }
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TOPOLOGY: &str = r#"
[[clusters]]
name = "user_cluster"
[[clusters.shards]]
connection = "user_shard_1"
[[clusters.shards]]
connection = "user_shard_2"

[[clusters]]
name = "mod_cluster"
[[clusters.shards]]
connection = "mod_shard_1"
[[clusters.sequences]]
name = "user_seq"
connection = "mod_seq"
"#;

    fn topology() -> Topology {
        TopologyConfig::from_toml_str(TOPOLOGY)
            .unwrap()
            .into_topology()
            .unwrap()
    }

    #[test]
    fn test_parse_topology() {
        let topology = topology();

        assert_eq!(
            topology.cluster_names().collect::<Vec<_>>(),
            vec!["user_cluster", "mod_cluster"]
        );
        let cluster = topology.lookup_cluster("mod_cluster").unwrap();
        assert_eq!(cluster.sequence_shards[0].name, "user_seq");
        assert_eq!(cluster.sequence_connections().collect::<Vec<_>>(), vec!["mod_seq"]);
    }

    #[test]
    fn test_parse_empty_topology() {
        let config = TopologyConfig::from_toml_str("").unwrap();
        assert!(config.into_topology().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = TopologyConfig::from_toml_str(
            r#"
[[clusters]]
name = "user_cluster"
shard = "typo"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TOPOLOGY.as_bytes()).unwrap();

        let topology = Topology::from_file(file.path()).unwrap();
        assert_eq!(topology.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = TopologyConfig::from_file(Path::new("/nonexistent/topology.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[clusters]]\nname = 42\n").unwrap();

        let err = TopologyConfig::from_file(file.path()).unwrap_err();
        match err {
            ConfigError::ParseFile { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_clusters_needs_clusters() {
        let empty = TopologyConfig::default().into_topology().unwrap();
        let mut decl = MigrationDeclaration::master_only("add_audit_columns");
        decl.all_clusters = true;

        let err = decl.scope(&empty).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyClusterScope));

        let manifest = MigrationManifest {
            migrations: vec![decl],
        };
        let err = manifest.validate(&empty).unwrap_err();
        match err {
            ConfigError::InvalidMigration { migration, source } => {
                assert_eq!(migration, "add_audit_columns");
                assert!(matches!(*source, ConfigError::EmptyClusterScope));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_blank_shard_id() {
        let manifest = MigrationManifest::from_toml_str(
            r#"
[[migrations]]
name = "backfill"
shards = ["user_shard_1", " "]
"#,
        )
        .unwrap();

        let err = manifest.migrations[0].scope(&topology()).unwrap_err();
        assert!(matches!(err, ConfigError::BlankShard { migration } if migration == "backfill"));
        assert!(manifest.validate(&topology()).is_err());
    }

    #[test]
    fn test_declaration_scopes() {
        let topology = topology();
        let manifest = MigrationManifest::from_toml_str(
            r#"
[[migrations]]
name = "create_settings"
version = 20240101000000

[[migrations]]
name = "create_users"
clusters = ["user_cluster"]

[[migrations]]
name = "backfill_first_shard"
shards = ["user_shard_1"]

[[migrations]]
name = "add_audit_columns"
all_clusters = true
"#,
        )
        .unwrap();

        let scopes: Vec<Scope> = manifest
            .migrations
            .iter()
            .map(|m| m.scope(&topology).unwrap())
            .collect();

        assert_eq!(scopes[0], Scope::MasterOnly);
        assert_eq!(scopes[1], Scope::clusters(["user_cluster"]));
        assert_eq!(scopes[2], Scope::shards(["user_shard_1"]));
        assert_eq!(scopes[3], Scope::clusters(["user_cluster", "mod_cluster"]));
    }

    #[test]
    fn test_conflicting_declaration() {
        let mut decl = MigrationDeclaration::master_only("broken");
        decl.clusters.push("user_cluster".to_string());
        decl.shards.push("user_shard_1".to_string());

        let err = decl.scope(&topology()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingScope { migration } if migration == "broken"
        ));
    }

    #[test]
    fn test_find_by_name_or_version() {
        let manifest = MigrationManifest::from_toml_str(
            r#"
[[migrations]]
name = "create_users"
version = 42
"#,
        )
        .unwrap();

        assert!(manifest.find("create_users").is_ok());
        assert!(manifest.find("42").is_ok());
        assert!(matches!(manifest.find("43").unwrap_err(), ConfigError::UnknownMigration(_)));
    }

    #[test]
    fn test_validate_names_failing_migration() {
        let manifest = MigrationManifest::from_toml_str(
            r#"
[[migrations]]
name = "create_users"
clusters = ["user_cluster"]

[[migrations]]
name = "create_events"
clusters = ["event_cluster"]
"#,
        )
        .unwrap();

        let err = manifest.validate(&topology()).unwrap_err();
        match err {
            ConfigError::InvalidMigration { migration, source } => {
                assert_eq!(migration, "create_events");
                assert!(matches!(*source, ConfigError::UnknownCluster(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
