use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::study::{Timing, DEFAULT_ADVANCE_DELAY_MS, DEFAULT_REVEAL_DELAY_MS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Word list to study; the bundled sample list when unset.
    pub vocab_path: Option<PathBuf>,
    pub shuffle: bool,
    pub auto_speak: bool,
    pub reveal_delay_ms: u64,
    pub advance_delay_ms: u64,
    /// Program plus leading arguments; the word is appended.
    pub speech_command: Option<Vec<String>>,
    pub wake_lock_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocab_path: None,
            shuffle: false,
            auto_speak: false,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
            speech_command: None,
            wake_lock_command: None,
        }
    }
}

impl From<&Config> for Timing {
    fn from(cfg: &Config) -> Self {
        Self {
            reveal_delay: Duration::from_millis(cfg.reveal_delay_ms),
            advance_delay: Duration::from_millis(cfg.advance_delay_ms),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tango") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tango_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "ignoring bad config: {e}"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            vocab_path: Some(PathBuf::from("/tmp/words.csv")),
            shuffle: true,
            auto_speak: true,
            reveal_delay_ms: 1500,
            advance_delay_ms: 800,
            speech_command: Some(vec!["espeak".into(), "-v".into(), "en-us".into()]),
            wake_lock_command: Some(vec!["caffeinate".into(), "-d".into()]),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_bad_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ nope").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "shuffle": true }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert!(cfg.shuffle);
        assert_eq!(cfg.reveal_delay_ms, DEFAULT_REVEAL_DELAY_MS);
    }

    #[test]
    fn timing_from_config() {
        let cfg = Config {
            reveal_delay_ms: 100,
            advance_delay_ms: 50,
            ..Config::default()
        };
        let timing = Timing::from(&cfg);
        assert_eq!(timing.reveal_delay, Duration::from_millis(100));
        assert_eq!(timing.advance_delay, Duration::from_millis(50));
    }
}
