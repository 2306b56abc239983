// HairNova platform paths
// Resolves where settings and the history database live on each OS.
//
// Linux follows XDG, macOS uses Application Support, Windows uses %APPDATA%.
// `HAIRNOVA_DATA_DIR` overrides the data directory everywhere, which is how
// the desktop shell points the RPC server at its own profile folder.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding [`get_data_dir`].
pub const DATA_DIR_ENV: &str = "HAIRNOVA_DATA_DIR";

#[cfg(target_os = "linux")]
fn base_dir(xdg_var: &str, fallback: &[&str]) -> PathBuf {
    if let Ok(xdg) = env::var(xdg_var) {
        return PathBuf::from(xdg).join("hairnova");
    }
    let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
    fallback
        .iter()
        .fold(PathBuf::from(home), |path, part| path.join(part))
        .join("hairnova")
}

/// Returns the directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        base_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join("HairNova")
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA")
            .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join("HairNova")
    }
}

/// Returns the directory holding the history database.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    #[cfg(target_os = "linux")]
    {
        base_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}
