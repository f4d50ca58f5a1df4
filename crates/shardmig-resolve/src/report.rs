//! Human-readable rendering of migration plans.

use crate::plan::MigrationPlan;

/// Render plans as a text table, one block per migration.
pub fn format_plan(plans: &[MigrationPlan]) -> String {
    let mut out = String::new();

    for plan in plans {
        out.push_str(&format!("{}  [{}]\n", plan.migration, plan.scope));

        let width = plan
            .passes
            .iter()
            .map(|p| p.context.to_string().len())
            .max()
            .unwrap_or(0);
        for pass in &plan.passes {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                pass.context.to_string(),
                pass.decision.label(),
            ));
        }

        out.push_str(&format!(
            "  {} of {} passes execute\n\n",
            plan.executed_passes(),
            plan.passes.len()
        ));
    }

    out
}

/// Render resolved targets, one connection per line.
pub fn format_targets(migration: &str, targets: &[String]) -> String {
    if targets.is_empty() {
        return format!("{migration}: master only\n");
    }
    let mut out = format!("{migration}:\n");
    for target in targets {
        out.push_str(&format!("  {target}\n"));
    }
    out
}
