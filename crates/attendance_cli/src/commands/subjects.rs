//! The `attendance subjects` commands.

use anyhow::Result;
use attendance_core::SubjectId;

use super::Context;

pub fn add(ctx: &Context, name: &str) -> Result<()> {
    let subject = ctx.subject_service().create_subject(ctx.owner()?, name)?;
    println!("Added {} ({})", subject.name, subject.id);
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let subjects = ctx.subject_service().list_subjects(ctx.owner()?)?;
    if subjects.is_empty() {
        println!("No subjects yet. Add one with `attendance subjects add <name>`.");
        return Ok(());
    }
    for subject in &subjects {
        println!("{}  {}", subject.id, subject.name);
    }
    Ok(())
}

pub fn remove(ctx: &Context, id: SubjectId) -> Result<()> {
    let service = ctx.subject_service();
    let subject = service.owned_subject(ctx.owner()?, id)?;
    service.delete_subject(id)?;
    println!("Deleted {} and its attendance history", subject.name);
    Ok(())
}
