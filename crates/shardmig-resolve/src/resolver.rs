//! Scope resolution: which connections a migration touches, and whether the
//! routing layer takes part in a pass.
//!
//! Every function here is pure over its inputs. Calling one twice with the
//! same topology, scope and context yields the same answer regardless of
//! what was resolved before.

use std::collections::HashSet;

use shardmig_core::{ConfigError, ConfigResult, ExecutionContext, Scope, Topology};
use tracing::{debug, warn};

/// Compute the ordered list of connections a migration must be applied to.
///
/// - `Shards(ids)` returns `ids` as declared, with no cluster lookup.
/// - `Clusters(names)` returns the primary shards of every named cluster in
///   order, followed by the sequence shards of the same clusters in the same
///   order. Primary shards never interleave with sequence shards.
/// - `MasterOnly` returns nothing.
///
/// A cluster scope naming no clusters is an error. Connection ids shared
/// between clusters are kept, not deduplicated.
pub fn resolve_target_shards(topology: &Topology, scope: &Scope) -> ConfigResult<Vec<String>> {
    let targets: Vec<String> = match scope {
        Scope::MasterOnly => Vec::new(),
        Scope::Shards(ids) => ids.clone(),
        Scope::Clusters(names) => {
            if names.is_empty() {
                return Err(ConfigError::EmptyClusterScope);
            }
            let clusters = names
                .iter()
                .map(|name| topology.target_cluster(name))
                .collect::<ConfigResult<Vec<_>>>()?;

            let primaries = clusters.iter().flat_map(|c| c.primary_connections());
            let sequences = clusters.iter().flat_map(|c| c.sequence_connections());
            primaries.chain(sequences).map(str::to_string).collect()
        }
    };

    let mut seen = HashSet::new();
    if let Some(repeated) = targets.iter().find(|t| !seen.insert(t.as_str())) {
        warn!(
            scope = %scope,
            connection = %repeated,
            "resolved targets repeat a connection; it will be migrated more than once"
        );
    }

    debug!(scope = %scope, targets = targets.len(), "resolved target shards");
    Ok(targets)
}

/// Whether the migration declares any shard-level scope.
///
/// This does not check membership of a particular shard: a cluster-scoped
/// migration is sharded on every pass, including passes over connections
/// outside its clusters.
pub fn is_sharded(scope: &Scope) -> bool {
    !matches!(scope, Scope::MasterOnly)
}

/// Whether the migration runs exactly once, on the master pass.
pub fn runs_only_on_master(scope: &Scope, ctx: &ExecutionContext) -> bool {
    matches!(scope, Scope::MasterOnly) && ctx.is_master_pass()
}

/// Whether the pass executes on its connection as-is, without the query
/// routing layer.
///
/// Sharded migrations always bypass routing: the runner already holds the
/// exact connection. A master-only migration bypasses routing on the master
/// pass only; on a shard pass it must stay visible to the routing layer so
/// the pass can be suppressed there.
pub fn bypasses_shard_routing(scope: &Scope, ctx: &ExecutionContext) -> bool {
    if is_sharded(scope) {
        return true;
    }
    ctx.is_master_pass()
}
