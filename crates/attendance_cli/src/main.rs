//! attendance CLI: track per-subject class attendance from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

use commands::mark::{CollegeArg, MarkArg, YesNo};
use commands::Settings;

#[derive(Parser)]
#[command(name = "attendance", version, about = "Per-subject class attendance tracker")]
struct Cli {
    /// SQLite database file (default: <data dir>/attendance/attendance.sqlite3)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory for rolling log files (default: <data dir>/attendance/logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Signed-in user id
    #[arg(long, global = true, env = "ATTENDANCE_OWNER")]
    owner: Option<Uuid>,

    /// Target attendance ratio used for "classes needed"
    #[arg(long, global = true, default_value = "0.75")]
    threshold: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    Subjects {
        #[command(subcommand)]
        command: SubjectsCommand,
    },

    /// Record attendance for one subject
    Mark {
        /// Subject id
        #[arg(long)]
        subject: Uuid,

        /// Is college on today?
        #[arg(long, value_enum)]
        college: CollegeArg,

        /// Class date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        /// Did the teacher come?
        #[arg(long, value_enum)]
        teacher: Option<YesNo>,

        /// Was attendance taken?
        #[arg(long, value_enum)]
        taken: Option<YesNo>,

        /// Your attendance
        #[arg(long, value_enum)]
        status: Option<MarkArg>,
    },

    /// Inspect or remove attendance records
    Records {
        #[command(subcommand)]
        command: RecordsCommand,
    },

    /// Show statistics and history for one subject
    Stats {
        /// Subject id
        subject: Uuid,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show statistics for every subject
    Dashboard {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SubjectsCommand {
    /// Create a subject
    Add {
        /// Subject name
        name: String,
    },
    /// List subjects, newest first
    List,
    /// Delete a subject and all of its records
    Remove {
        /// Subject id
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum RecordsCommand {
    /// List a subject's records, newest first
    List {
        /// Subject id
        subject: Uuid,
    },
    /// Delete one record
    Remove {
        /// Record id
        id: Uuid,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = Settings {
        db: cli.db,
        log_dir: cli.log_dir,
        log_level: cli.log_level,
        owner: cli.owner,
        threshold: cli.threshold,
    };

    let result = commands::Context::open(&settings).and_then(|ctx| match cli.command {
        Commands::Subjects { command } => match command {
            SubjectsCommand::Add { name } => commands::subjects::add(&ctx, &name),
            SubjectsCommand::List => commands::subjects::list(&ctx),
            SubjectsCommand::Remove { id } => commands::subjects::remove(&ctx, id),
        },
        Commands::Mark {
            subject,
            college,
            date,
            teacher,
            taken,
            status,
        } => commands::mark::execute(
            &ctx,
            subject,
            commands::mark::Answers {
                college,
                date,
                teacher,
                taken,
                status,
            },
        ),
        Commands::Records { command } => match command {
            RecordsCommand::List { subject } => commands::records::list(&ctx, subject),
            RecordsCommand::Remove { id } => commands::records::remove(&ctx, id),
        },
        Commands::Stats { subject, json } => commands::stats::execute(&ctx, subject, json),
        Commands::Dashboard { json } => commands::dashboard::execute(&ctx, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
