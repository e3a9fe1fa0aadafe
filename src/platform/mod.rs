// tabtree platform paths
// Where settings and saved sessions live on each OS.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "tabtree";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/tabtree` or `~/.config/tabtree`
/// - **macOS**: `~/Library/Application Support/tabtree`
/// - **Windows**: `%APPDATA%/tabtree`
pub fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        appdata_dir()
    } else if cfg!(target_os = "macos") {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    } else {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
}

/// Returns the data directory, used for saved sessions.
///
/// - **Linux**: `$XDG_DATA_HOME/tabtree` or `~/.local/share/tabtree`
/// - **macOS**: `~/Library/Application Support/tabtree`
/// - **Windows**: `%APPDATA%/tabtree`
pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        appdata_dir()
    } else if cfg!(target_os = "macos") {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    } else {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
}

fn appdata_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join(APP_DIR)
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join(APP_DIR),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join(APP_DIR),
    }
}
