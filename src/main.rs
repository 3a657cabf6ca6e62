use anyhow::{Context, Result};
use baby_tombola::{
    render_charts, select_winner, ActualForm, Config, EntryStore, StoreBackend,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Organizer tools for the baby tombola
#[derive(Parser)]
#[command(name = "tombola", version)]
struct Cli {
    /// Storage backend (csv or sqlite); overrides TOMBOLA_STORE
    #[arg(long)]
    store: Option<String>,

    /// CSV file with the entries; overrides TOMBOLA_ENTRIES
    #[arg(long)]
    entries: Option<PathBuf>,

    /// SQLite database; overrides TOMBOLA_DB
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every stored guess
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rank the guesses against the actual stats
    Winner {
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: String,
        /// Length in centimeters
        #[arg(long)]
        length: String,
        /// Weight in grams
        #[arg(long)]
        weight: String,
        #[arg(long)]
        gender: String,
        /// Write length.svg, weight.svg and date_offset.svg into this directory
        #[arg(long)]
        charts: Option<PathBuf>,
    },
    /// Delete every stored guess
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(store) = &cli.store {
        config.backend = store.parse::<StoreBackend>()?;
    }
    if let Some(entries) = cli.entries {
        config.entries_path = entries;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let store = config.open_store().context("Failed to open entry store")?;

    match cli.command {
        Command::List { json } => run_list(store.as_ref(), json),
        Command::Winner {
            dob,
            length,
            weight,
            gender,
            charts,
        } => {
            let form = ActualForm {
                dob,
                length,
                weight,
                gender,
            };
            run_winner(store.as_ref(), &form, charts)
        }
        Command::Clear => {
            store.clear()?;
            println!("🗑️  All entries deleted ({})", store.describe());
            Ok(())
        }
    }
}

fn run_list(store: &dyn EntryStore, json: bool) -> Result<()> {
    let entries = store.read_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:>8} {:>8}  {}",
        "Name", "DateOfBirth", "Length", "Weight", "Gender"
    );
    for e in &entries {
        println!(
            "{:<20} {:<12} {:>8} {:>8}  {}",
            e.name, e.date_of_birth, e.length, e.weight, e.gender
        );
    }
    println!("\n{} entries", entries.len());

    Ok(())
}

fn run_winner(store: &dyn EntryStore, form: &ActualForm, charts_dir: Option<PathBuf>) -> Result<()> {
    let actual = form.parse()?;
    let standings = select_winner(store, &actual)?;

    for (rank, (_, entry, score)) in standings.ranked().into_iter().enumerate() {
        let score = if score.is_finite() {
            format!("{:.2}", score)
        } else {
            "unscorable".to_string()
        };
        println!("{:>3}. {:<20} {}", rank + 1, entry.name, score);
    }

    match standings.require_winner() {
        Ok((winner, score)) => println!("\n🏆 Winner: {} (score {:.2})", winner.name, score),
        Err(e) => println!("\n{}", e),
    }

    if let Some(dir) = charts_dir {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for chart in render_charts(&standings.entries, &actual, standings.winner)? {
            let path = dir.join(format!("{}.svg", chart.slug));
            fs::write(&path, &chart.svg)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("📊 {}", path.display());
        }
    }

    Ok(())
}
