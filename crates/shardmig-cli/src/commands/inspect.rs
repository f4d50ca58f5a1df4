use shardmig_resolve::report::format_targets;
use shardmig_resolve::resolve_target_shards;

use super::{Files, select};

pub fn validate(files: &Files) -> anyhow::Result<()> {
    let (topology, manifest) = files.load()?;
    manifest.validate(&topology)?;

    println!(
        "✓ {} migrations resolve against {} clusters",
        manifest.migrations.len(),
        topology.len()
    );
    Ok(())
}

pub fn targets(files: &Files, migration: Option<&str>) -> anyhow::Result<()> {
    let (topology, manifest) = files.load()?;
    let manifest = select(manifest, migration)?;

    for decl in &manifest.migrations {
        let scope = decl.scope(&topology).map_err(|e| e.in_migration(&decl.name))?;
        let targets = resolve_target_shards(&topology, &scope)
            .map_err(|e| e.in_migration(&decl.name))?;
        print!("{}", format_targets(&decl.name, &targets));
    }
    Ok(())
}
