use mafia_data::{FileStore, MemoryStore, SessionStore};
use std::path::{Path, PathBuf};

pub fn session_path_from_env() -> Option<PathBuf> {
    std::env::var_os("MAFIA_SESSION")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// In-memory unless a session file was requested, so a closed terminal
/// forgets the game the same way a closed tab does.
pub fn open_session_store(path: Option<PathBuf>) -> Box<dyn SessionStore> {
    match path {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

pub fn session_label(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| "memory".to_string())
}
