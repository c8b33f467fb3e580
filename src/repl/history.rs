use crate::repl::highlighter::ReplHelper;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const HISTORY_FILE_NAME: &str = "history.txt";

/// `<data dir>/cinder/history.txt`, falling back to the config dir.
pub(crate) fn get_history_path() -> Option<PathBuf> {
    let crate_name = env!("CARGO_PKG_NAME");
    dirs::data_dir().or_else(dirs::config_dir).map(|mut path| {
        path.push(crate_name);
        path.push(HISTORY_FILE_NAME);
        path
    })
}

pub(crate) fn load_history_from_path(rl: &mut Editor<ReplHelper, DefaultHistory>, history_path: &Path) {
    if let Some(parent_dir) = history_path.parent() {
        if let Err(e) = fs::create_dir_all(parent_dir) {
            warn!(dir = %parent_dir.display(), error = %e, "Failed to create history directory");
        }
    }
    if !history_path.exists() {
        info!(path = %history_path.display(), "No history yet, will create on exit");
        return;
    }
    match rl.load_history(history_path) {
        Ok(()) => info!(path = %history_path.display(), "Loaded history"),
        Err(err) => warn!(path = %history_path.display(), error = %err, "Could not load history"),
    }
}

pub(crate) fn save_history_to_path(rl: &mut Editor<ReplHelper, DefaultHistory>, history_path: &Path) {
    match rl.save_history(history_path) {
        Ok(()) => info!(path = %history_path.display(), "Saved history"),
        Err(err) => error!(path = %history_path.display(), error = %err, "Could not save history"),
    }
}
