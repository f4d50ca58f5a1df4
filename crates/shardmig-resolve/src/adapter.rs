//! Execution adapter: the per-pass decision a migration runner consumes.

use serde::{Deserialize, Serialize};
use shardmig_core::{ExecutionContext, Scope};
use tracing::debug;

use crate::resolver::bypasses_shard_routing;

/// What the runner does with one (migration, pass) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The pass is a no-op for this migration.
    Skip,
    /// Run on the pass connection as-is.
    ExecuteDirect,
    /// Resolve the connection through the routing layer first.
    ExecuteViaRouting,
}

impl Decision {
    pub fn executes(&self) -> bool {
        !matches!(self, Decision::Skip)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Skip => "skip",
            Decision::ExecuteDirect => "execute-direct",
            Decision::ExecuteViaRouting => "execute-via-routing",
        }
    }
}

/// Stateless glue between a runner and the resolver.
#[derive(Debug, Clone, Default)]
pub struct ExecutionAdapter {
    /// Shard pass on which master-only migrations are handed to the routing
    /// layer. Every other shard pass skips them.
    pub master_slot: Option<String>,
}

impl ExecutionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master_slot(connection_id: impl Into<String>) -> Self {
        Self {
            master_slot: Some(connection_id.into()),
        }
    }

    /// Decide how the runner handles `scope` during the pass `ctx`.
    pub fn decide(&self, scope: &Scope, ctx: &ExecutionContext) -> Decision {
        let decision = if bypasses_shard_routing(scope, ctx) {
            Decision::ExecuteDirect
        } else if self.is_master_slot(ctx) {
            // Only a master-only migration on a shard pass gets here.
            Decision::ExecuteViaRouting
        } else {
            Decision::Skip
        };

        debug!(
            scope = %scope,
            pass = %ctx,
            decision = decision.label(),
            "decided execution pass"
        );
        decision
    }

    fn is_master_slot(&self, ctx: &ExecutionContext) -> bool {
        match (&self.master_slot, &ctx.current_shard) {
            (Some(slot), Some(shard)) => slot == shard,
            _ => false,
        }
    }
}
