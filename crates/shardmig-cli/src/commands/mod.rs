pub mod inspect;
pub mod plan;

use std::path::PathBuf;

use anyhow::Context;
use shardmig_core::{MigrationDeclaration, MigrationManifest, Topology};
use tracing::debug;

/// Paths of the two configuration files every command reads.
pub struct Files {
    topology: PathBuf,
    migrations: PathBuf,
}

impl Files {
    pub fn new(topology: &str, migrations: &str) -> Self {
        Self {
            topology: PathBuf::from(topology),
            migrations: PathBuf::from(migrations),
        }
    }

    pub fn load(&self) -> anyhow::Result<(Topology, MigrationManifest)> {
        debug!(
            topology = %self.topology.display(),
            migrations = %self.migrations.display(),
            "loading configuration"
        );
        let topology = Topology::from_file(&self.topology)
            .with_context(|| format!("loading topology {}", self.topology.display()))?;
        let manifest = MigrationManifest::from_file(&self.migrations)
            .with_context(|| format!("loading migrations {}", self.migrations.display()))?;
        Ok((topology, manifest))
    }
}

/// Narrow a manifest to a single migration when one is named.
pub fn select(
    manifest: MigrationManifest,
    key: Option<&str>,
) -> anyhow::Result<MigrationManifest> {
    let Some(key) = key else {
        return Ok(manifest);
    };
    let migration: MigrationDeclaration = manifest.find(key)?.clone();
    Ok(MigrationManifest {
        migrations: vec![migration],
    })
}
