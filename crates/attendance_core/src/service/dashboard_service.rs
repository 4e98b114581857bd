//! Dashboard aggregation.
//!
//! # Responsibility
//! - Compute one independent statistics snapshot per subject.
//! - Keep the per-subject fetch loop separate from the pure aggregation.
//!
//! # Invariants
//! - No cross-subject aggregation: each snapshot uses only that subject's
//!   records.
//! - A subject without records maps to the zero-state statistics.
//! - The map is fully populated before a `Dashboard` is returned.

use crate::model::record::AttendanceRecord;
use crate::model::subject::{Subject, SubjectId, UserId};
use crate::repo::record_repo::{AttendanceRepository, StatusFilter};
use crate::repo::subject_repo::SubjectRepository;
use crate::repo::RepoResult;
use crate::stats::{compute_stats, AttendanceStats, StatsConfig};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Computes a statistics snapshot per subject from pre-fetched records.
///
/// Subjects may repeat; their record sets are merged.
pub fn summarize_subjects<I>(snapshots: I, config: &StatsConfig) -> BTreeMap<SubjectId, AttendanceStats>
where
    I: IntoIterator<Item = (SubjectId, Vec<AttendanceRecord>)>,
{
    let mut grouped: BTreeMap<SubjectId, Vec<AttendanceRecord>> = BTreeMap::new();
    for (subject_id, records) in snapshots {
        grouped.entry(subject_id).or_default().extend(records);
    }

    grouped
        .into_iter()
        .map(|(subject_id, records)| (subject_id, compute_stats(&records, config)))
        .collect()
}

/// One card on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub subject: Subject,
    pub stats: AttendanceStats,
}

/// Dashboard read model: subjects in display order plus per-subject stats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    subjects: Vec<Subject>,
    stats: BTreeMap<SubjectId, AttendanceStats>,
}

impl Dashboard {
    /// Subjects, newest first.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Mapping from subject id to its statistics snapshot.
    pub fn stats(&self) -> &BTreeMap<SubjectId, AttendanceStats> {
        &self.stats
    }

    /// Statistics of one subject; zero state when unknown.
    pub fn stats_for(&self, subject_id: SubjectId) -> AttendanceStats {
        self.stats.get(&subject_id).copied().unwrap_or_default()
    }

    /// Cards in display order.
    pub fn summaries(&self) -> Vec<SubjectSummary> {
        self.subjects
            .iter()
            .map(|subject| SubjectSummary {
                subject: subject.clone(),
                stats: self.stats_for(subject.id),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Builds dashboards from each subject's full record history.
pub struct DashboardService<S: SubjectRepository, A: AttendanceRepository> {
    subjects: S,
    records: A,
    config: StatsConfig,
}

impl<S: SubjectRepository, A: AttendanceRepository> DashboardService<S, A> {
    pub fn new(subjects: S, records: A, config: StatsConfig) -> Self {
        Self {
            subjects,
            records,
            config,
        }
    }

    /// Loads the owner's subjects and computes statistics for each.
    ///
    /// Snapshots match the subject detail view, holiday and no-class counts
    /// included.
    pub fn build(&self, owner_id: UserId) -> RepoResult<Dashboard> {
        let started_at = Instant::now();
        let subjects = self.subjects.list_subjects(owner_id)?;

        let mut snapshots = Vec::with_capacity(subjects.len());
        for subject in &subjects {
            let records = self
                .records
                .list_records(subject.id, StatusFilter::All)?;
            snapshots.push((subject.id, records));
        }

        let mut stats = summarize_subjects(snapshots, &self.config);
        for subject in &subjects {
            stats.entry(subject.id).or_default();
        }

        info!(
            "event=dashboard_build module=service status=ok subjects={} duration_ms={}",
            subjects.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Dashboard { subjects, stats })
    }
}
