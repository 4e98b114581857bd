//! Subcommand implementations and the shared command context.

pub mod dashboard;
pub mod mark;
pub mod records;
pub mod stats;
pub mod subjects;

use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use attendance_core::db::open_db;
use attendance_core::{
    default_log_level, init_logging_with, DashboardService, LogLevel, LoggingOptions,
    SqliteAttendanceRepository, SqliteSubjectRepository, StatsConfig, SubjectService, UserId,
};
use log::info;
use rusqlite::Connection;

/// Raw global flags.
pub struct Settings {
    pub db: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub owner: Option<UserId>,
    pub threshold: f64,
}

/// Open store plus resolved configuration for one invocation.
pub struct Context {
    conn: Connection,
    owner: Option<UserId>,
    config: StatsConfig,
}

impl Context {
    /// Validates flags, starts logging and opens the store.
    pub fn open(settings: &Settings) -> Result<Self> {
        let config = StatsConfig::with_target(settings.threshold)
            .with_context(|| format!("invalid --threshold {}", settings.threshold))?;

        let log_dir = match &settings.log_dir {
            Some(dir) => absolute(dir)?,
            None => data_dir()?.join("logs"),
        };
        let level = match &settings.log_level {
            Some(raw) => raw.parse::<LogLevel>().map_err(|err| anyhow!(err))?,
            None => default_log_level(),
        };
        init_logging_with(LoggingOptions {
            level,
            log_dir,
            echo_warnings: true,
        })
        .map_err(|err| anyhow!(err))
        .context("failed to initialize logging")?;

        let db_path = match &settings.db {
            Some(path) => path.clone(),
            None => data_dir()?.join("attendance.sqlite3"),
        };
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = open_db(&db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?;

        info!(
            "event=cli_start module=cli status=ok signed_in={} threshold={}",
            settings.owner.is_some(),
            config.target_threshold()
        );
        Ok(Self {
            conn,
            owner: settings.owner,
            config,
        })
    }

    /// The signed-in user, required by owner-scoped commands.
    pub fn owner(&self) -> Result<UserId> {
        self.owner
            .ok_or_else(|| anyhow!("not signed in; pass --owner or set ATTENDANCE_OWNER"))
    }

    pub fn subject_service(
        &self,
    ) -> SubjectService<SqliteSubjectRepository<'_>, SqliteAttendanceRepository<'_>> {
        SubjectService::new(
            SqliteSubjectRepository::new(&self.conn),
            SqliteAttendanceRepository::new(&self.conn),
            self.config,
        )
    }

    pub fn dashboard_service(
        &self,
    ) -> DashboardService<SqliteSubjectRepository<'_>, SqliteAttendanceRepository<'_>> {
        DashboardService::new(
            SqliteSubjectRepository::new(&self.conn),
            SqliteAttendanceRepository::new(&self.conn),
            self.config,
        )
    }
}

fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("attendance"))
        .ok_or_else(|| anyhow!("no data directory on this platform; pass --db and --log-dir"))
}

fn absolute(path: &std::path::Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("failed to resolve current directory")?
        .join(path))
}

/// Renders a percentage with its zone badge, e.g. `82% [S]`.
pub fn percentage_badge(stats: &attendance_core::AttendanceStats) -> String {
    match stats.zone {
        Some(zone) => format!("{}% [{}]", stats.percentage, zone.badge()),
        None => format!("{}%", stats.percentage),
    }
}
