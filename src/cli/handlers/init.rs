use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io::{CONFIG_FILE, DEFAULT_CONFIG, discover_root};

pub fn cmd_init(dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !args.force {
        return Err(format!("{} already exists in {}", CONFIG_FILE, dir.display()).into());
    }

    // Nested vaults work, but the outer one will no longer see these notes
    if let Some(parent) = dir.parent() {
        let outer = discover_root(parent);
        if outer.join(CONFIG_FILE).is_file() {
            eprintln!("Note: enclosing vault found at {}/", outer.display());
        }
    }

    fs::write(&path, DEFAULT_CONFIG)?;
    println!("Initialized boardwalk vault: {}", dir.display());
    Ok(())
}
