//! The `attendance stats` command.

use anyhow::Result;
use attendance_core::SubjectId;

use super::records::format_record;
use super::{percentage_badge, Context};

pub fn execute(ctx: &Context, subject_id: SubjectId, json: bool) -> Result<()> {
    let service = ctx.subject_service();
    service.owned_subject(ctx.owner()?, subject_id)?;
    let detail = service.subject_detail(subject_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let stats = &detail.stats;
    println!("{}", detail.subject.name);
    println!("  attendance   {}", percentage_badge(stats));
    if let Some(zone) = stats.zone {
        println!("  zone         {}", zone.label());
    }
    println!(
        "  classes      {} present / {} absent / {} total",
        stats.present, stats.absent, stats.total
    );
    println!(
        "  other        {} holiday / {} no class",
        stats.holiday_count, stats.no_class_count
    );
    if stats.classes_needed > 0 {
        println!(
            "  to target    attend the next {} classes",
            stats.classes_needed
        );
    }

    if !detail.records.is_empty() {
        println!();
        println!("History:");
        for record in &detail.records {
            println!("  {}", format_record(record));
        }
    }
    Ok(())
}
