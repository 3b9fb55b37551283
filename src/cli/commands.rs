use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bw", about = concat!("boardwalk v", env!("CARGO_PKG_VERSION"), " - kanban boards over markdown checkboxes"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different vault directory
    #[arg(short = 'C', long = "vault-dir", global = true)]
    pub vault_dir: Option<String>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default boardwalk.toml in the current directory
    Init(InitArgs),
    /// Print the board
    Board(BoardArgs),
    /// List tasks with their ids
    Tasks,
    /// Move a task to another column
    Move(MoveArgs),
    /// Re-print the board whenever notes change
    Watch(BoardArgs),
    /// Show the effective status table
    Statuses,
    /// Show or edit the status column order
    Order(OrderCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing boardwalk.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Default)]
pub struct BoardArgs {
    /// Column dimension (overrides board.group_by)
    #[arg(long)]
    pub group_by: Option<String>,
    /// Swim lane dimension (overrides board.lanes_by)
    #[arg(long)]
    pub lanes_by: Option<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task id, or a unique prefix of it
    pub id: String,
    /// Target column key (e.g. Done, In-Progress)
    pub column: String,
}

#[derive(Args)]
pub struct OrderCmd {
    #[command(subcommand)]
    pub action: OrderAction,
}

#[derive(Subcommand)]
pub enum OrderAction {
    /// Print the resolved column order
    Show,
    /// Save a custom column order
    Set {
        /// Column keys, first to last
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Drop the custom order
    Reset,
}
