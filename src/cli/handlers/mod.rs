mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, ConfigError};
use crate::io::scan::scan_vault;
use crate::io::store::FsStore;
use crate::io::watcher::{StoreEvent, VaultWatcher};
use crate::model::config::BoardConfig;
use crate::ops::mutation::MoveOutcome;
use crate::ops::query::{Query, VaultSource};
use crate::ops::refresh::RefreshCoordinator;
use crate::ops::session::{BoardSession, BoardUpdate};

/// How often `bw watch` drains watcher events
const WATCH_TICK: Duration = Duration::from_millis(50);

type VaultSession = BoardSession<VaultSource, FsStore>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let start = start_dir(cli.vault_dir.as_deref())?;

    let root = config_io::discover_root(&start);

    match cli.command {
        // Init writes into the start directory, not a discovered vault
        Commands::Init(args) => cmd_init(&start, args),
        Commands::Board(args) => cmd_board(&root, args, json),
        Commands::Tasks => cmd_tasks(&root, json),
        Commands::Move(args) => cmd_move(&root, args, json),
        Commands::Watch(args) => cmd_watch(&root, args, json),
        Commands::Statuses => cmd_statuses(&root, json),
        Commands::Order(args) => cmd_order(&root, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir(vault_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match vault_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

/// Load boardwalk.toml and apply command-line grouping overrides
fn load_config(root: &Path, args: &BoardArgs) -> Result<BoardConfig, ConfigError> {
    let mut config = config_io::load_config(root)?;
    if let Some(group_by) = &args.group_by {
        config.board.group_by = group_by.clone();
    }
    if let Some(lanes_by) = &args.lanes_by {
        config.board.lanes_by = Some(lanes_by.clone());
    }
    Ok(config)
}

fn open_session(root: &Path, config: &BoardConfig) -> VaultSession {
    BoardSession::new(
        VaultSource::new(root, config.clone()),
        FsStore::new(root),
    )
    .with_statuses(config.status_config())
    .with_policy(config.ordering_policy())
    .with_coordinator(RefreshCoordinator::new(
        config.refresh.debounce(),
        config.refresh.settle(),
    ))
}

/// Refresh once and fail with the query error if there is no board
fn refreshed_session(
    root: &Path,
    config: &BoardConfig,
) -> Result<VaultSession, Box<dyn std::error::Error>> {
    let mut session = open_session(root, config);
    session.refresh();
    if let Some(e) = session.error() {
        return Err(e.clone().into());
    }
    Ok(session)
}

fn print_update(update: BoardUpdate<'_>, json: bool) {
    match update {
        BoardUpdate::Ready(board) => {
            if json {
                match serde_json::to_string(&board_to_json(board)) {
                    Ok(line) => println!("{}", line),
                    Err(e) => eprintln!("error: {}", e),
                }
            } else {
                for line in format_board(board) {
                    println!("{}", line);
                }
                println!();
            }
        }
        BoardUpdate::QueryFailed(e) => eprintln!("error: {}", e),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(root: &Path, args: BoardArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(root, &args)?;
    let session = refreshed_session(root, &config)?;
    let Some(board) = session.board() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(board))?);
    } else {
        for line in format_board(board) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_tasks(root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(root)?;
    let query = Query::from_config(&config)?;
    let tasks: Vec<_> = scan_vault(root, config.status_config().as_ref())?
        .into_iter()
        .filter(|t| query.filter.matches(t))
        .collect();

    if json {
        let out: Vec<TaskJson> = tasks.iter().map(task_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if tasks.is_empty() {
        println!("no tasks");
    } else {
        for line in format_task_listing(&tasks) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_statuses(root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(root)?;
    let table = statuses_to_json(config.status_config().as_ref());
    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        for s in &table {
            println!("[{}] {} ({})", s.marker, s.name, s.status_type);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_move(root: &Path, args: MoveArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(root)?;
    let mut session = refreshed_session(root, &config)?;
    let task = session.find_task(&args.id)?;
    let outcome = session.apply_move(&task, &args.column, Instant::now())?;

    if json {
        let (name, line) = match outcome {
            MoveOutcome::Unchanged => ("unchanged", None),
            MoveOutcome::AlreadyPresent => ("already_present", None),
            MoveOutcome::Written { line } => ("written", Some(line + 1)),
        };
        let out = MoveJson {
            id: task.id.clone(),
            column: args.column.clone(),
            outcome: name,
            line,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match outcome {
        MoveOutcome::Written { line } => println!(
            "{} {} -> {} ({}:{})",
            short_id(&task.id),
            task.description,
            args.column,
            task.path().display(),
            line + 1
        ),
        MoveOutcome::Unchanged | MoveOutcome::AlreadyPresent => {
            println!("{} already in {}", short_id(&task.id), args.column)
        }
    }
    Ok(())
}

fn cmd_order(root: &Path, args: OrderCmd, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    match args.action {
        OrderAction::Show => {
            let config = config_io::load_config(root)?;
            let session = refreshed_session(root, &config)?;
            let keys = session.board().map(|b| b.column_keys()).unwrap_or_default();
            if json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else {
                for key in keys {
                    println!("{}", key);
                }
            }
        }
        OrderAction::Set { keys } => {
            let mut doc = config_io::read_config_doc(root)?;
            config_io::set_column_order(&mut doc, &keys);
            config_io::write_config_doc(root, &doc)?;
            println!("column order: {}", keys.join(", "));
        }
        OrderAction::Reset => {
            let mut doc = config_io::read_config_doc(root)?;
            config_io::reset_column_order(&mut doc);
            config_io::write_config_doc(root, &doc)?;
            println!("column order reset");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

fn cmd_watch(root: &Path, args: BoardArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // notify reports canonical paths
    let root = std::fs::canonicalize(root)?;
    let config = load_config(&root, &args)?;
    let watcher = VaultWatcher::start(&root)?;

    let mut session = open_session(&root, &config);
    session.subscribe(move |update| print_update(update, json));
    session.refresh();
    tracing::info!(root = %root.display(), "watching vault");

    loop {
        watch_step(&mut session, &watcher, &root, &args, Instant::now());
        thread::sleep(WATCH_TICK);
    }
}

/// One pass of the watch loop: drain watcher events, then refresh if due.
/// Returns whether the board was rebuilt.
fn watch_step(
    session: &mut VaultSession,
    watcher: &VaultWatcher,
    root: &Path,
    args: &BoardArgs,
    now: Instant,
) -> bool {
    for event in watcher.poll() {
        if event == StoreEvent::ConfigChanged {
            reload_config(session, root, args);
            session.request_refresh(now);
        } else {
            session.handle_event(&event, now);
        }
    }
    session.tick(now)
}

/// Apply an edited boardwalk.toml to a running session. A broken file keeps
/// the previous settings.
fn reload_config(session: &mut VaultSession, root: &Path, args: &BoardArgs) {
    match load_config(root, args) {
        Ok(config) => {
            session.set_statuses(config.status_config());
            session.set_policy(config.ordering_policy());
            session.source_mut().set_config(config);
            tracing::info!("configuration reloaded");
        }
        Err(e) => tracing::warn!(error = %e, "keeping previous configuration"),
    }
}
