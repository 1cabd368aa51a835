use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bka", about = concat!("bka v", env!("CARGO_PKG_VERSION"), " - bakery shop admin from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the backend URL from the config
    #[arg(long = "api-url", global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reorder categories interactively (default)
    Tui,
    /// Show categories in display order, or move one
    Categories(CategoriesCmd),
    /// List records of a resource
    List(ListArgs),
    /// Show one record
    Show(ShowArgs),
    /// Create a record from JSON
    Create(CreateArgs),
    /// Update a record from JSON
    Update(UpdateArgs),
    /// Delete a record
    Delete(DeleteArgs),
    /// Export data for spreadsheets
    Export(ExportCmd),
    /// View or edit the config file
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Scope flags shared by the categories commands
#[derive(Args, Clone, Copy, Default)]
pub struct ScopeArgs {
    /// Only children of this parent category
    #[arg(long, value_name = "ID", conflicts_with = "top_level")]
    pub parent: Option<i64>,
    /// Only top-level categories
    #[arg(long)]
    pub top_level: bool,
}

#[derive(Args)]
pub struct CategoriesCmd {
    #[command(subcommand)]
    pub action: Option<CategoriesAction>,
    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Move a category onto another's position and save the order
    Mv(CategoryMvArgs),
}

#[derive(Args)]
pub struct CategoryMvArgs {
    /// Category to move
    pub id: i64,
    /// Category whose position it takes
    pub over: i64,
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Show the new order without saving
    #[arg(long)]
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Generic resources
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Resource (categories, products, orders, customers, coupons, commissions, owners)
    pub resource: String,
    /// Case-insensitive regex over all fields
    #[arg(long, short)]
    pub search: Option<String>,
    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,
    /// Sort by field (dotted paths allowed, e.g. customer.name)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (default from config)
    #[arg(long)]
    pub per_page: Option<usize>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub resource: String,
    pub id: String,
}

/// JSON body from an inline string or a file
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct BodyArgs {
    /// JSON object
    #[arg(long)]
    pub data: Option<String>,
    /// File containing a JSON object (`-` for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct CreateArgs {
    pub resource: String,
    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub resource: String,
    pub id: String,
    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub resource: String,
    pub id: String,
    /// Confirm the deletion
    #[arg(long, short)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportCmd {
    #[command(subcommand)]
    pub action: ExportAction,
}

#[derive(Subcommand)]
pub enum ExportAction {
    /// Orders as CSV for the ERP import
    Orders(ExportOrdersArgs),
}

#[derive(Args)]
pub struct ExportOrdersArgs {
    /// Row layout: items (one row per item) or summary (one row per order)
    #[arg(long, default_value = "items")]
    pub layout: String,
    /// Only orders with this status
    #[arg(long)]
    pub status: Option<String>,
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective config (default)
    Show,
    /// Print the config file path
    Path,
    /// Set a value, e.g. `bka config set api.token <cookie>`
    Set(ConfigSetArgs),
    /// Write a starter config file
    Init(ConfigInitArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key (api.base_url, api.token, list.per_page, export.bom, ui.colors.<slot>, ...)
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}
