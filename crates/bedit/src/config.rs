use anyhow::{Context, Result};
use bfile::DEFAULT_GAP;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::file_manager::backup_path;

const CONFIG_PATH_VAR: &str = "BEDIT_CONFIG_PATH";
const CONFIG_DIR_VAR: &str = "BEDIT_CONFIG_DIR";
const DEFAULT_PROMPT: &str = "> ";
const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub files: FileConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spacing between line numbers when a file is loaded.
    pub gap: u32,
    pub prompt: String,
    /// Ask before quitting with unsaved changes.
    pub confirm_quit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backup_on_save: bool,
    pub large_file_warning_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell used by `exec` instead of `sh` (or `cmd` on Windows).
    pub program: Option<String>,
    /// Argument placed before the command line, e.g. `/C` for `cmd` or
    /// `-Command` for `powershell`. Defaults to `-c`.
    pub flag: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            prompt: String::from(DEFAULT_PROMPT),
            confirm_quit: true,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            backup_on_save: false,
            large_file_warning_bytes: LARGE_FILE_THRESHOLD,
        }
    }
}

impl Config {
    /// Read the config file. Missing, empty and unparsable files are replaced by the
    /// defaults; an unparsable one is kept next to it as `config.json.bak` first. A
    /// file that exists but cannot be read is left untouched.
    pub async fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("No config directory on this platform, using defaults");
            return Self::default();
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, writing defaults", path.display());
                return Self::write_defaults().await;
            }
            Err(e) => {
                log::error!("Failed to read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        if content.trim().is_empty() {
            log::warn!("Config {} is empty, writing defaults", path.display());
            return Self::write_defaults().await;
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate();
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Failed to parse config {}: {}", path.display(), e);
                let backup = backup_path(&path);
                match tokio::fs::copy(&path, &backup).await {
                    Ok(_) => log::info!("Kept the broken config as {}", backup.display()),
                    Err(e) => log::warn!("Failed to keep the broken config: {}", e),
                }
                Self::write_defaults().await
            }
        }
    }

    pub async fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        let mut config = self.clone();
        config.validate();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    async fn write_defaults() -> Self {
        let config = Self::default();
        if let Err(e) = config.save().await {
            log::warn!("Could not write default config: {:#}", e);
        }
        config
    }

    /// Replace invalid values with their defaults. Returns `true` if anything changed.
    pub fn validate(&mut self) -> bool {
        let mut corrected = false;

        if self.editor.gap == 0 {
            log::warn!("Line gap 0 in config, using {}", DEFAULT_GAP);
            self.editor.gap = DEFAULT_GAP;
            corrected = true;
        }

        if self.editor.prompt.is_empty() {
            log::warn!("Empty prompt in config, using {:?}", DEFAULT_PROMPT);
            self.editor.prompt = DEFAULT_PROMPT.to_string();
            corrected = true;
        }

        for (name, value) in [
            ("shell.program", &mut self.shell.program),
            ("shell.flag", &mut self.shell.flag),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                log::warn!("Empty {} in config, ignoring it", name);
                *value = None;
                corrected = true;
            }
        }

        corrected
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var(CONFIG_DIR_VAR) {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "bedit", "bedit")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    /// Points the config at one file while alive. Tests touching the process
    /// environment hold it for their whole body, one at a time.
    struct ConfigEnv {
        previous: Vec<(&'static str, Option<String>)>,
        _lock: MutexGuard<'static, ()>,
    }

    impl ConfigEnv {
        fn at(path: &Path) -> Self {
            static LOCK: Mutex<()> = Mutex::new(());
            let lock = LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

            let previous = [CONFIG_PATH_VAR, CONFIG_DIR_VAR]
                .into_iter()
                .map(|name| (name, std::env::var(name).ok()))
                .collect();
            std::env::set_var(CONFIG_PATH_VAR, path);
            std::env::remove_var(CONFIG_DIR_VAR);

            Self { previous, _lock: lock }
        }
    }

    impl Drop for ConfigEnv {
        fn drop(&mut self) {
            for (name, value) in &self.previous {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.editor.gap, 10);
        assert_eq!(config.editor.prompt, "> ");
        assert!(config.editor.confirm_quit);
        assert!(!config.files.backup_on_save);
        assert_eq!(config.files.large_file_warning_bytes, 10 * 1024 * 1024);
        assert!(config.shell.program.is_none());
        assert!(config.shell.flag.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "editor": { "gap": 100 } }"#).unwrap();

        assert_eq!(config.editor.gap, 100);
        assert_eq!(config.editor.prompt, "> ");
        assert!(config.editor.confirm_quit);
        assert!(!config.files.backup_on_save);
    }

    #[test]
    fn test_validate_fixes_invalid_values() {
        let mut config = Config::default();
        assert!(!config.validate());

        config.editor.gap = 0;
        config.editor.prompt.clear();
        config.shell.program = Some("  ".to_string());
        config.shell.flag = Some(String::new());

        assert!(config.validate());
        assert_eq!(config.editor.gap, 10);
        assert_eq!(config.editor.prompt, "> ");
        assert!(config.shell.program.is_none());
        assert!(config.shell.flag.is_none());
    }

    #[tokio::test]
    async fn test_config_round_trip_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let _env = ConfigEnv::at(&path);

        let mut config = Config::default();
        config.editor.gap = 25;
        config.shell.program = Some("powershell".to_string());
        config.shell.flag = Some("-Command".to_string());
        config.save().await.unwrap();

        let loaded = Config::load().await;
        assert_eq!(loaded.editor.gap, 25);
        assert_eq!(loaded.shell.program.as_deref(), Some("powershell"));
        assert_eq!(loaded.shell.flag.as_deref(), Some("-Command"));
    }

    #[tokio::test]
    async fn test_missing_config_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bedit").join("config.json");
        let _env = ConfigEnv::at(&path);

        let config = Config::load().await;
        assert_eq!(config.editor.gap, 10);

        let content = std::fs::read_to_string(&path).unwrap();
        let written: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(written.editor.prompt, "> ");
    }

    #[tokio::test]
    async fn test_empty_config_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "  \n").unwrap();
        let _env = ConfigEnv::at(&path);

        Config::load().await;
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"gap\": 10"));
    }

    #[tokio::test]
    async fn test_broken_config_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let _env = ConfigEnv::at(&path);

        let config = Config::load().await;
        assert_eq!(config.editor.gap, 10);
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("config.json.bak")).unwrap(),
            "{ not json"
        );
    }

    #[tokio::test]
    async fn test_unwritable_location_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("config.json");
        let _env = ConfigEnv::at(&path);

        let config = Config::load().await;
        assert_eq!(config.editor.gap, 10);
        assert!(Config::default().save().await.is_err());
        assert!(!path.exists());
    }
}
