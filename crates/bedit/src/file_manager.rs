use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::Config;

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

pub struct FileManager {
    pub current_path: Option<PathBuf>,
    pub is_readonly: bool,
    backup_on_save: bool,
    large_file_threshold: u64,
}

impl FileManager {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            current_path: None,
            is_readonly: false,
            backup_on_save: config.files.backup_on_save,
            large_file_threshold: config.files.large_file_warning_bytes,
        }
    }

    pub fn get_current_path(&self) -> Option<&PathBuf> {
        self.current_path.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.current_path.is_some()
    }

    /// Bind a path that has not been read, e.g. a file that does not exist yet.
    pub fn set_path(&mut self, path: PathBuf) {
        self.current_path = Some(path);
        self.is_readonly = false;
    }

    /// Read `path` as a list of lines and make it the current file.
    pub async fn open_file(&mut self, path: PathBuf) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(anyhow::anyhow!("File not found: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow::anyhow!("Not a file: {}", path.display()));
        }

        match fs::metadata(&path).await {
            Ok(metadata) => {
                self.is_readonly = metadata.permissions().readonly();

                if metadata.len() > self.large_file_threshold {
                    log::warn!(
                        "Large file detected ({} bytes): {}",
                        metadata.len(),
                        path.display()
                    );
                }
            }
            Err(e) => {
                log::warn!("Failed to get file metadata: {}", e);
                self.is_readonly = false;
            }
        }

        match fs::read_to_string(&path).await {
            Ok(content) => {
                if content.contains('\0') {
                    return Err(anyhow::anyhow!(
                        "File looks like binary data: {}",
                        path.display()
                    ));
                }

                let lines: Vec<String> = content.lines().map(str::to_string).collect();
                self.current_path = Some(path.clone());
                log::info!("Opened {} ({} lines)", path.display(), lines.len());
                Ok(lines)
            }
            Err(e) => {
                let error_msg = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => {
                        format!("Permission denied: {}", path.display())
                    }
                    std::io::ErrorKind::NotFound => {
                        format!("File not found: {}", path.display())
                    }
                    std::io::ErrorKind::InvalidData => {
                        format!("File is not valid UTF-8: {}", path.display())
                    }
                    _ => format!("Failed to read {}: {}", path.display(), e),
                };
                Err(anyhow::anyhow!(error_msg))
            }
        }
    }

    /// Write `lines` to the current file, each followed by the platform line ending.
    ///
    /// A failed write is reported as is; there is no retry.
    pub async fn save_file(&mut self, lines: &[String]) -> Result<String> {
        let Some(path) = self.current_path.clone() else {
            return Err(anyhow::anyhow!("No file path set"));
        };

        if self.is_readonly {
            return Err(anyhow::anyhow!("File is read-only: {}", path.display()));
        }

        write_lines(&path, lines, self.backup_on_save).await
    }

    /// Write `lines` to `path`, which becomes the current file only once the write
    /// has succeeded.
    pub async fn save_file_as(&mut self, path: PathBuf, lines: &[String]) -> Result<String> {
        let message = write_lines(&path, lines, self.backup_on_save).await?;
        self.set_path(path);
        Ok(message)
    }
}

impl Default for FileManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_lines(path: &Path, lines: &[String], backup_first: bool) -> Result<String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("Failed to create directory: {} - {}", parent.display(), e)
            })?;
            log::info!("Created directory: {}", parent.display());
        }
    }

    if backup_first {
        backup(path).await;
    }

    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 2).sum());
    for line in lines {
        content.push_str(line);
        content.push_str(LINE_ENDING);
    }

    match fs::write(path, content.as_bytes()).await {
        Ok(_) => {
            log::info!("Successfully saved file: {}", path.display());
            Ok(format!("Wrote {} lines to {}", lines.len(), path.display()))
        }
        Err(e) => {
            let error_msg = match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    format!("Permission denied: {}", path.display())
                }
                std::io::ErrorKind::WriteZero => {
                    format!("Disk may be full: {}", path.display())
                }
                _ => format!("Failed to write {}: {}", path.display(), e),
            };
            Err(anyhow::anyhow!(error_msg))
        }
    }
}

/// `prog.bas` -> `prog.bas.bak`
pub(crate) fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

// Copy an existing, non-empty file aside before it is overwritten.
async fn backup(path: &Path) {
    let Ok(metadata) = fs::metadata(path).await else {
        return;
    };
    if metadata.len() == 0 {
        return;
    }

    let backup_path = backup_path(path);
    match fs::copy(path, &backup_path).await {
        Ok(_) => log::info!("Created backup: {}", backup_path.display()),
        Err(e) => log::warn!("Failed to create backup: {}", e),
    }
}
