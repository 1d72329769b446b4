use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where the log file goes: `$HOME/.local/state/tango`, falling back to
    /// the platform's local data dir.
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("tango"),
            )
        } else {
            ProjectDirs::from("", "", "tango").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
