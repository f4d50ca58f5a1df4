use shardmig_resolve::{ExecutionAdapter, MigrationPlan, plan_manifest, report, run_shards};

use super::Files;

pub fn plan(
    files: &Files,
    migration: Option<&str>,
    master_slot: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let (topology, manifest) = files.load()?;
    let adapter = ExecutionAdapter { master_slot };

    let plans = match migration {
        // A single migration still visits every shard the full run visits.
        Some(key) => {
            let declaration = manifest.find(key)?;
            manifest.validate(&topology)?;
            let shards = run_shards(&topology, &manifest)?;
            let scope = declaration.scope(&topology)?;
            vec![MigrationPlan::build_for_run(
                &topology,
                &declaration.name,
                &scope,
                &adapter,
                &shards,
            )?]
        }
        None => plan_manifest(&topology, &manifest, &adapter)?,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        _ => {
            print!("{}", report::format_plan(&plans));
        }
    }

    Ok(())
}
