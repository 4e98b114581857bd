//! The `attendance dashboard` command.

use anyhow::Result;

use super::{percentage_badge, Context};

pub fn execute(ctx: &Context, json: bool) -> Result<()> {
    let dashboard = ctx.dashboard_service().build(ctx.owner()?)?;
    let summaries = dashboard.summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No subjects yet. Add one with `attendance subjects add <name>`.");
        return Ok(());
    }

    let width = summaries
        .iter()
        .map(|summary| summary.subject.name.chars().count())
        .max()
        .unwrap_or(0);
    for summary in &summaries {
        let stats = &summary.stats;
        let mut line = format!(
            "{:<width$}  {:>9}  {}/{}",
            summary.subject.name,
            percentage_badge(stats),
            stats.present,
            stats.total
        );
        if stats.classes_needed > 0 {
            line.push_str(&format!("  need {}", stats.classes_needed));
        }
        println!("{line}");
    }
    Ok(())
}
