mod commands;
mod config;
mod server;
mod templates;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{
    cmd_groups, cmd_import, cmd_list, cmd_nutrients, cmd_search, cmd_show, cmd_weights,
};
use crate::config::Config;
use foodbase_core::db::Database;
use foodbase_core::sr_import::{ImportOptions, import_into};

#[derive(Parser)]
#[command(
    name = "foodbase",
    version,
    about = "Import and browse the USDA nutrient database",
    long_about = "Import the USDA National Nutrient Database (SR flat files) into SQLite, \
                  then browse and edit it from the terminal or a small web UI."
)]
struct Cli {
    /// Path to the SQLite database (default: per-user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the caret-delimited SR files from a directory
    Import {
        /// Directory holding FD_GROUP.txt, FOOD_DES.txt, NUTR_DEF.txt, NUT_DATA.txt and WEIGHT.txt
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Keep inner spaces in text fields (only trim the ends)
        #[arg(long)]
        preserve_spaces: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the web UI
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Import the SR files from this directory before serving
        #[arg(long)]
        import: Option<PathBuf>,
        /// With --import, keep inner spaces in text fields (only trim the ends)
        #[arg(long, requires = "import")]
        preserve_spaces: bool,
    },
    /// List food groups
    Groups {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the foods in a group
    Show {
        /// Food group ID
        group_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List foods, one page at a time
    List {
        /// Page number, starting at 0
        #[arg(short, long, default_value = "0")]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the nutrition facts for a food
    Nutrients {
        /// Food ID
        food_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the household weights for a food
    Weights {
        /// Food ID
        food_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search food descriptions
    Search {
        /// Text to look for in the short or long description
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("foodbase=info,foodbase_core=info,tower_http=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;

    match cli.command {
        Commands::Import {
            dir,
            preserve_spaces,
            json,
        } => cmd_import(&config.db_path, &dir, preserve_spaces, json),
        Commands::Serve {
            port,
            bind,
            import,
            preserve_spaces,
        } => {
            if let Some(dir) = import {
                let options = ImportOptions { preserve_spaces };
                match import_into(&config.db_path, &dir, options)? {
                    Some(summary) => tracing::info!(
                        rows_read = summary.rows_read(),
                        rows_inserted = summary.rows_inserted(),
                        "import finished"
                    ),
                    None => tracing::warn!("import skipped, serving the existing database"),
                }
            }
            server::start_server(config.db_path, port, &bind).await
        }
        Commands::Groups { json } => cmd_groups(&open_db(&config)?, json),
        Commands::Show { group_id, json } => cmd_show(&open_db(&config)?, group_id, json),
        Commands::List { page, json } => cmd_list(&open_db(&config)?, page, json),
        Commands::Nutrients { food_id, json } => cmd_nutrients(&open_db(&config)?, food_id, json),
        Commands::Weights { food_id, json } => cmd_weights(&open_db(&config)?, food_id, json),
        Commands::Search { query, json } => cmd_search(&open_db(&config)?, &query, json),
    }
}

fn open_db(config: &Config) -> Result<Database> {
    Database::open(&config.db_path)
}
