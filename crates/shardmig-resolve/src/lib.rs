//! shardmig-resolve: scope resolution and execution routing for migrations
//! over a sharded topology.
//!
//! This crate decides *which* connections a migration touches and *how* each
//! pass reaches its connection. It performs no I/O and holds no state; the
//! migration runner owns connections, ordering and retries.
//!
//! # Components
//!
//! - **`resolver`**: target shard resolution and routing predicates
//! - **`adapter`**: per-pass skip / direct / routed decisions
//! - **`plan`**: ordered pass plans for migrations and manifests
//! - **`report`**: text rendering of plans

pub mod adapter;
pub mod plan;
pub mod report;
pub mod resolver;

pub use adapter::{Decision, ExecutionAdapter};
pub use plan::{MigrationPlan, Pass, plan_manifest, run_shards};
pub use resolver::{
    bypasses_shard_routing, is_sharded, resolve_target_shards, runs_only_on_master,
};
