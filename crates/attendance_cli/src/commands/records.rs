//! The `attendance records` commands.

use anyhow::Result;
use attendance_core::{AttendanceRecord, RecordId, SubjectId};

use super::Context;

pub fn list(ctx: &Context, subject_id: SubjectId) -> Result<()> {
    let service = ctx.subject_service();
    service.owned_subject(ctx.owner()?, subject_id)?;
    let detail = service.subject_detail(subject_id)?;
    println!("{}", detail.subject.name);
    if detail.records.is_empty() {
        println!("  no attendance records");
        return Ok(());
    }
    for record in &detail.records {
        println!("  {}", format_record(record));
    }
    Ok(())
}

pub fn remove(ctx: &Context, id: RecordId) -> Result<()> {
    let service = ctx.subject_service();
    service.owned_record(ctx.owner()?, id)?;
    service.delete_record(id)?;
    println!("Deleted record {id}");
    Ok(())
}

pub(super) fn format_record(record: &AttendanceRecord) -> String {
    format!(
        "{}  {:<9} teacher={} taken={}  {}",
        record.date,
        record.status.label(),
        flag(record.teacher_present),
        flag(record.attendance_taken),
        record.id
    )
}

fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}
