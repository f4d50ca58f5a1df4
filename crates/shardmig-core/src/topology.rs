//! Cluster topology: the read-only shard layout migrations are routed over.
//!
//! Cluster order is the order clusters were declared in configuration, and
//! that order drives resolution order. A `Topology` exposes no mutation API
//! once built, so it can be shared across threads without locking.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::scope::Scope;

/// A physical database connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardRef {
    pub connection_id: String,
}

impl ShardRef {
    pub fn new(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
        }
    }
}

/// A shard that stores auto-increment counters for a named sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceShard {
    pub name: String,
    pub shard: ShardRef,
}

/// A named group of shards migrated together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    /// Primary shards, in declared order.
    pub shards: Vec<ShardRef>,
    /// Sequence shards, in declared order. Empty unless the cluster emulates
    /// global ids under modulo partitioning.
    pub sequence_shards: Vec<SequenceShard>,
}

impl Cluster {
    pub fn new(name: impl Into<String>, shards: Vec<ShardRef>) -> Self {
        Self {
            name: name.into(),
            shards,
            sequence_shards: Vec::new(),
        }
    }

    pub fn with_sequence(
        mut self,
        name: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        self.sequence_shards.push(SequenceShard {
            name: name.into(),
            shard: ShardRef::new(connection_id),
        });
        self
    }

    pub fn primary_connections(&self) -> impl Iterator<Item = &str> {
        self.shards.iter().map(|s| s.connection_id.as_str())
    }

    pub fn sequence_connections(&self) -> impl Iterator<Item = &str> {
        self.sequence_shards
            .iter()
            .map(|s| s.shard.connection_id.as_str())
    }
}

/// The full cluster layout, loaded once per process.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    clusters: Vec<Cluster>,
    by_name: HashMap<String, usize>,
}

impl Topology {
    /// Build a topology from clusters in declaration order.
    ///
    /// Rejects duplicate cluster names, duplicate sequence names within a
    /// cluster and blank connection identifiers. A cluster without primary
    /// shards is accepted here and rejected once a migration targets it.
    pub fn new(clusters: Vec<Cluster>) -> ConfigResult<Self> {
        let mut by_name = HashMap::with_capacity(clusters.len());

        for (idx, cluster) in clusters.iter().enumerate() {
            if by_name.insert(cluster.name.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateCluster(cluster.name.clone()));
            }

            let blank = cluster
                .primary_connections()
                .chain(cluster.sequence_connections())
                .any(|c| c.trim().is_empty());
            if blank {
                return Err(ConfigError::EmptyConnection {
                    cluster: cluster.name.clone(),
                });
            }

            let mut sequences = HashSet::new();
            for seq in &cluster.sequence_shards {
                if !sequences.insert(seq.name.as_str()) {
                    return Err(ConfigError::DuplicateSequence {
                        cluster: cluster.name.clone(),
                        sequence: seq.name.clone(),
                    });
                }
            }
        }

        Ok(Self { clusters, by_name })
    }

    /// Look up a cluster by name.
    pub fn lookup_cluster(&self, name: &str) -> ConfigResult<&Cluster> {
        self.by_name
            .get(name)
            .map(|&idx| &self.clusters[idx])
            .ok_or_else(|| ConfigError::UnknownCluster(name.to_string()))
    }

    /// Look up a cluster a migration is about to target.
    ///
    /// Unlike [`lookup_cluster`](Self::lookup_cluster), a cluster without
    /// primary shards is an error here.
    pub fn target_cluster(&self, name: &str) -> ConfigResult<&Cluster> {
        let cluster = self.lookup_cluster(name)?;
        if cluster.shards.is_empty() {
            return Err(ConfigError::EmptyCluster(name.to_string()));
        }
        Ok(cluster)
    }

    /// Check that a cluster scope names at least one cluster, and that every
    /// cluster it names exists and has shards.
    pub fn validate_scope(&self, scope: &Scope) -> ConfigResult<()> {
        if let Scope::Clusters(names) = scope {
            if names.is_empty() {
                return Err(ConfigError::EmptyClusterScope);
            }
            for name in names.iter() {
                self.target_cluster(name)?;
            }
        }
        Ok(())
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
