//! nocisift: non-opioid cancer-pain drug candidate screening
//! Entry point for the command-line binary.

mod commands;
mod config;
mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nocisift")]
#[command(about = "Screen bioactive compounds against cancer-pain targets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable targets
    Targets,

    /// Retrieve, score and rank candidates for a target
    Search {
        /// Target display name or ChEMBL accession
        target: String,

        /// Potency ceiling in nM (defaults to search.potency_ceiling_nm)
        #[arg(long, value_name = "NM")]
        potency: Option<f64>,

        /// Maximum number of records to retrieve
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum drug score to display and save
        #[arg(long, value_name = "SCORE")]
        min_score: Option<f64>,

        /// Keep compounds that violate the Rule of Five
        #[arg(long, conflicts_with = "lipinski_only")]
        include_violations: bool,

        /// Drop compounds that violate the Rule of Five (defaults to search.lipinski_only)
        #[arg(long)]
        lipinski_only: bool,

        /// Write the result table to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Do not save results or log the search
        #[arg(long)]
        no_save: bool,
    },

    /// Descriptors, Rule of Five and risk for one structure
    Analyze {
        /// SMILES notation
        smiles: String,

        /// Write the structure card (SVG) to this file
        #[arg(long, value_name = "FILE")]
        svg: Option<PathBuf>,

        /// Card size in pixels
        #[arg(long, default_value_t = 300)]
        size: u32,

        /// Save as favorite under CUSTOM_<first 10 characters>
        #[arg(long)]
        favorite: bool,

        /// Note stored with the favorite
        #[arg(long)]
        note: Option<String>,
    },

    /// Saved candidates, best first
    Saved {
        /// Only candidates for this target
        #[arg(long)]
        target: Option<String>,

        /// Write the table to a CSV file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },

    /// Recent searches
    History {
        #[arg(long, default_value_t = 30)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    /// List favorites (default)
    List,
    /// Add or update a favorite
    Add {
        compound_id: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a favorite
    Remove { compound_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nocisift=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::Config::load()?;
    info!(
        mode = %config.descriptors.mode,
        database = %config.database.url,
        "Configuration loaded"
    );

    let app = commands::App::build(config).await?;

    match cli.command {
        Commands::Targets => app.targets(),
        Commands::Search { target, potency, limit, min_score, include_violations, lipinski_only, export, no_save } => {
            let lipinski_only = match (include_violations, lipinski_only) {
                (true, _) => Some(false),
                (_, true) => Some(true),
                _ => None,
            };
            let options = commands::SearchOptions {
                target,
                potency,
                limit,
                min_score,
                lipinski_only,
                export,
                save: !no_save,
            };
            app.search(options).await?
        }
        Commands::Analyze { smiles, svg, size, favorite, note } => {
            app.analyze(&smiles, svg.as_deref(), size, favorite, note.as_deref()).await?
        }
        Commands::Saved { target, export } => app.saved(target.as_deref(), export.as_deref()).await?,
        Commands::Favorites { action } => match action.unwrap_or(FavoriteAction::List) {
            FavoriteAction::List => app.list_favorites().await?,
            FavoriteAction::Add { compound_id, note } => app.add_favorite(&compound_id, note.as_deref()).await?,
            FavoriteAction::Remove { compound_id } => app.remove_favorite(&compound_id).await?,
        },
        Commands::History { limit } => app.history(limit).await?,
    }

    app.close().await;
    Ok(())
}
