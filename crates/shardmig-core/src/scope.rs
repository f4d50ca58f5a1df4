//! Migration scopes and execution contexts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered set of cluster names.
///
/// Repeated names are dropped on construction, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterSet(Vec<String>);

impl ClusterSet {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ClusterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in iter {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        ClusterSet(names)
    }
}

/// Where a migration applies. Exactly one kind is active per migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "targets", rename_all = "snake_case")]
pub enum Scope {
    /// Only the master/default connection. The scope of any migration that
    /// declares nothing.
    #[default]
    MasterOnly,
    /// Every shard of the named clusters, sequence shards included.
    Clusters(ClusterSet),
    /// Explicit connection ids, used verbatim.
    Shards(Vec<String>),
}

impl Scope {
    pub fn clusters<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope::Clusters(names.into_iter().collect())
    }

    pub fn shards<I, S>(connection_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope::Shards(connection_ids.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scope::MasterOnly => "master_only",
            Scope::Clusters(_) => "clusters",
            Scope::Shards(_) => "shards",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::MasterOnly => write!(f, "master-only"),
            Scope::Clusters(names) => {
                write!(f, "clusters({})", names.iter().collect::<Vec<_>>().join(", "))
            }
            Scope::Shards(ids) => write!(f, "shards({})", ids.join(", ")),
        }
    }
}

/// The pass a runner is currently executing.
///
/// Built fresh by the runner for every pass; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// `None` for the master pass, otherwise the shard being iterated.
    pub current_shard: Option<String>,
}

impl ExecutionContext {
    pub fn master() -> Self {
        Self { current_shard: None }
    }

    pub fn shard(connection_id: impl Into<String>) -> Self {
        Self {
            current_shard: Some(connection_id.into()),
        }
    }

    pub fn is_master_pass(&self) -> bool {
        self.current_shard.is_none()
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current_shard {
            Some(shard) => write!(f, "{shard}"),
            None => write!(f, "master"),
        }
    }
}
