//! CLI argument definitions for the slotlist binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use slotlist::AddNewAt;

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database file (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory tables persisted to a JSON file
    Inmemory,
}

/// Inspect and reorder position lists stored in a database
#[derive(Parser, Debug)]
#[command(name = "slotlist")]
#[command(about = "slotlist: dense integer ordering of rows in scoped lists")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub backend_config: BackendArgs,

    #[command(flatten)]
    pub list_config: ListArgs,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the list table lives
#[derive(clap::Args, Debug)]
pub struct BackendArgs {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "SLOTLIST_BACKEND")]
    pub backend: Backend,

    /// Data file.
    /// For SQLite: the database file (default slotlist.db)
    /// For InMemory: the JSON file (default slotlist.json)
    #[arg(short = 'D', long, env = "SLOTLIST_DATA")]
    pub data: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "SLOTLIST_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// How the list is configured: a JSON file or individual flags
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// JSON list configuration file
    #[arg(short, long, env = "SLOTLIST_CONFIG", conflicts_with_all = ["table", "scope"])]
    pub config: Option<PathBuf>,

    /// Table holding the list rows
    #[arg(short, long)]
    pub table: Option<String>,

    /// Identity column
    #[arg(long, default_value = slotlist::config::DEFAULT_PRIMARY_KEY)]
    pub primary_key: String,

    /// Position column
    #[arg(long, default_value = slotlist::config::DEFAULT_COLUMN)]
    pub column: String,

    /// Scope columns, comma separated. Omit for a table-wide list.
    #[arg(short, long, value_delimiter = ',')]
    pub scope: Vec<String>,

    /// Position of the first row in every list
    #[arg(
        long,
        default_value_t = slotlist::config::DEFAULT_TOP_OF_LIST,
        allow_negative_numbers = true
    )]
    pub top: i64,

    /// Placement of newly created rows
    #[arg(long, default_value = "bottom")]
    pub add_new_at: AddNewAt,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the list a row belongs to
    Show(RowArgs),
    /// Move a row within its list
    Move(MoveArgs),
    /// Insert a row at a position, shifting its peers
    Insert(InsertArgs),
    /// Take a row out of its list and close the gap
    Remove(RowArgs),
    /// Report gaps or duplicates in a row's list
    Check(RowArgs),
}

/// Arguments for commands that act on a single row
#[derive(clap::Args, Debug)]
pub struct RowArgs {
    /// Identity of the row
    #[arg(long)]
    pub id: String,
}

/// Direction for the move command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    /// To the first position
    Top,
    /// To the last position
    Bottom,
    /// Swap with the row above
    Higher,
    /// Swap with the row below
    Lower,
}

/// Arguments for the move command
#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    #[command(flatten)]
    pub row: RowArgs,

    /// Where to move the row
    #[arg(value_enum)]
    pub to: Direction,
}

/// Arguments for the insert command
#[derive(clap::Args, Debug)]
pub struct InsertArgs {
    #[command(flatten)]
    pub row: RowArgs,

    /// Target position
    #[arg(long, allow_negative_numbers = true)]
    pub at: i64,
}
