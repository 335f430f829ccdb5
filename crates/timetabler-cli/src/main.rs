use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use dotenvy::dotenv;

use timetabler_cli::request::load_request;
use timetabler_cli::seeder::{self, SeedConfig};
use timetabler_config::SchedulingConfig;
use timetabler_db::{PgEntryStore, init_db_pool, run_migrations};
use timetabler_models::{ClassId, SchoolId};
use timetabler_observability::init_basic_console_logging;
use timetabler_scheduling::{EntryStore, TimetableGenerator};

#[derive(Parser)]
#[command(name = "timetabler-cli")]
#[command(about = "Timetabler CLI - Generation, seeding and cleanup tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one class timetable from a JSON request file
    Generate {
        /// Path to a request in the shape of POST /api/timetable/generate
        #[arg(short = 'r', long)]
        request: PathBuf,
    },
    /// Seed generated timetables for fake classes
    Seed {
        /// Number of classes to create
        #[arg(short = 'c', long, default_value = "3")]
        classes: usize,

        /// Number of subjects per class
        #[arg(short = 's', long, default_value = "6")]
        subjects: usize,

        /// Academic year label
        #[arg(long, default_value = "2024-2025")]
        academic_year: String,

        /// School to seed into (random if omitted)
        #[arg(long)]
        school: Option<SchoolId>,
    },
    /// Delete every entry of one class in one academic year
    Clear {
        #[arg(long)]
        school: SchoolId,

        #[arg(long)]
        academic_year: String,

        #[arg(long)]
        class: ClassId,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let store = PgEntryStore::new(pool);

    let scheduling = SchedulingConfig::from_env();

    match cli.command {
        Commands::Generate { request } => handle_generate(&store, &scheduling, request).await,
        Commands::Seed {
            classes,
            subjects,
            academic_year,
            school,
        } => {
            let mut config = SeedConfig::new(classes, subjects).with_academic_year(academic_year);
            if let Some(school_id) = school {
                config = config.with_school(school_id);
            }
            handle_seed(&store, &scheduling, config).await
        }
        Commands::Clear {
            school,
            academic_year,
            class,
            yes,
        } => handle_clear(&store, school, &academic_year, class, yes).await,
    }
}

async fn handle_generate(
    store: &PgEntryStore,
    scheduling: &SchedulingConfig,
    path: PathBuf,
) -> anyhow::Result<()> {
    let request = load_request(&path, &scheduling.generation_defaults)?;

    let result = TimetableGenerator::new(store)
        .generate(&request)
        .await
        .context("Timetable generation failed")?;

    println!("✅ Created {} entries", result.created.len());
    for entry in &result.created {
        println!(
            "   {} {} {} ({})",
            entry.details.day_of_week,
            entry.time_range(),
            entry.details.subject_name,
            entry.details.teacher_name
        );
    }

    if !result.shortfalls.is_empty() {
        println!("⚠️  Shortfalls:");
        for shortfall in &result.shortfalls {
            println!(
                "   {}: {}/{} periods",
                shortfall.subject_name, shortfall.scheduled, shortfall.required
            );
        }
    }

    Ok(())
}

async fn handle_seed(
    store: &PgEntryStore,
    scheduling: &SchedulingConfig,
    config: SeedConfig,
) -> anyhow::Result<()> {
    let requests = seeder::generate_class_requests(&config, &scheduling.generation_defaults);
    let summary = seeder::seed_timetables(store, &requests)
        .await
        .context("Error seeding timetables")?;

    println!(
        "✅ Seeded {} classes for school {} ({} entries, {} shortfalls)",
        summary.classes, config.school_id, summary.entries, summary.shortfalls
    );
    Ok(())
}

async fn handle_clear(
    store: &PgEntryStore,
    school_id: SchoolId,
    academic_year: &str,
    class_id: ClassId,
    yes: bool,
) -> anyhow::Result<()> {
    let count = store
        .find_by_class_all_days(class_id, academic_year)
        .await?
        .iter()
        .filter(|e| e.details.school_id == school_id)
        .count();

    if count == 0 {
        println!("Nothing to clear.");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} timetable entries of class {} ({})?",
                count, class_id, academic_year
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let deleted = store
        .delete_class_entries(school_id, academic_year, class_id)
        .await?;
    println!("✅ Deleted {} entries", deleted);
    Ok(())
}
