//! Migration plans: the ordered passes a runner walks for one migration.
//!
//! The master pass always comes first. A sharded migration then gets one
//! pass per resolved target in resolution order. A master-only migration
//! gets one pass per shard the runner visits over the whole manifest, so the
//! runner can skip it there or hand it to the routing layer. Runners are
//! expected to walk passes sequentially so schema-version bookkeeping stays
//! consistent per shard.

use std::collections::HashSet;

use serde::Serialize;
use shardmig_core::{ConfigResult, ExecutionContext, MigrationManifest, Scope, Topology};
use tracing::info;

use crate::adapter::{Decision, ExecutionAdapter};
use crate::resolver::{is_sharded, resolve_target_shards, runs_only_on_master};

/// One execution pass and what the runner does in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pass {
    pub context: ExecutionContext,
    pub decision: Decision,
}

/// The iteration plan for a single migration.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub migration: String,
    pub scope: Scope,
    pub sharded: bool,
    pub master_only: bool,
    pub targets: Vec<String>,
    pub passes: Vec<Pass>,
}

impl MigrationPlan {
    /// Plan a migration on its own: the master pass plus its targets.
    pub fn build(
        topology: &Topology,
        migration: &str,
        scope: &Scope,
        adapter: &ExecutionAdapter,
    ) -> ConfigResult<Self> {
        Self::build_for_run(topology, migration, scope, adapter, &[])
    }

    /// Plan a migration inside a run that visits `run_shards`.
    ///
    /// Sharded migrations only get passes for their own targets. Master-only
    /// migrations get a pass for every shard in `run_shards`.
    pub fn build_for_run(
        topology: &Topology,
        migration: &str,
        scope: &Scope,
        adapter: &ExecutionAdapter,
        run_shards: &[String],
    ) -> ConfigResult<Self> {
        let targets = resolve_target_shards(topology, scope)
            .map_err(|e| e.in_migration(migration))?;
        let shard_passes = if is_sharded(scope) { &targets[..] } else { run_shards };

        let master = ExecutionContext::master();
        let passes = std::iter::once(master.clone())
            .chain(shard_passes.iter().map(|t| ExecutionContext::shard(t.as_str())))
            .map(|context| Pass {
                decision: adapter.decide(scope, &context),
                context,
            })
            .collect();

        Ok(Self {
            migration: migration.to_string(),
            scope: scope.clone(),
            sharded: is_sharded(scope),
            master_only: runs_only_on_master(scope, &master),
            targets,
            passes,
        })
    }

    /// Number of passes that run the migration.
    pub fn executed_passes(&self) -> usize {
        self.passes.iter().filter(|p| p.decision.executes()).count()
    }
}

/// Every shard a run over `manifest` visits, in first-resolved order.
pub fn run_shards(
    topology: &Topology,
    manifest: &MigrationManifest,
) -> ConfigResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut shards = Vec::new();

    for m in &manifest.migrations {
        let scope = m.scope(topology).map_err(|e| e.in_migration(&m.name))?;
        let targets = resolve_target_shards(topology, &scope)
            .map_err(|e| e.in_migration(&m.name))?;
        for target in targets {
            if seen.insert(target.clone()) {
                shards.push(target);
            }
        }
    }

    Ok(shards)
}

/// Validate a manifest, then plan every migration in it in manifest order.
pub fn plan_manifest(
    topology: &Topology,
    manifest: &MigrationManifest,
    adapter: &ExecutionAdapter,
) -> ConfigResult<Vec<MigrationPlan>> {
    manifest.validate(topology)?;
    let shards = run_shards(topology, manifest)?;

    let plans = manifest
        .migrations
        .iter()
        .map(|m| {
            let scope = m.scope(topology).map_err(|e| e.in_migration(&m.name))?;
            MigrationPlan::build_for_run(topology, &m.name, &scope, adapter, &shards)
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    info!(
        migrations = plans.len(),
        shards = shards.len(),
        passes = plans.iter().map(|p| p.passes.len()).sum::<usize>(),
        "planned migrations"
    );
    Ok(plans)
}
