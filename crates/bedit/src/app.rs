use anyhow::Result;
use bfile::tokenise;
use std::path::PathBuf;

use crate::config::Config;
use crate::console::{Console, Message};
use crate::session::EditorSession;

/// Consecutive failed reads after which input is treated as closed.
const MAX_READ_FAILURES: usize = 3;

/// The interactive read loop around one editing session.
pub struct App<C: Console> {
    pub session: EditorSession,
    pub console: C,
    prompt: String,
    should_quit: bool,
}

impl<C: Console> App<C> {
    pub fn new(config: &Config, console: C) -> Self {
        Self {
            session: EditorSession::new(config),
            console,
            prompt: config.editor.prompt.clone(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_modified(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Open `path` for editing. Failures are reported and leave an empty,
    /// unnamed buffer.
    pub async fn open(&mut self, path: PathBuf) {
        self.console
            .emit(Message::info(format!("Opening {}", path.display())));

        match self.session.load_file(path.clone()).await {
            Ok(message) => {
                log::info!("{}: {}", path.display(), message);
                self.console.emit(Message::info(message));
            }
            Err(e) => {
                log::error!("Failed to load file '{}': {}", path.display(), e);
                self.console.emit(Message::error(format!("{:#}", e)));
            }
        }
    }

    /// Tokenise and apply one raw input line.
    pub async fn handle_line(&mut self, raw: &str) {
        let token = match tokenise(raw) {
            Ok(token) => token,
            Err(e) => {
                log::debug!("Rejected input {:?}: {}", raw, e);
                self.console.emit(Message::error(e.to_string()));
                return;
            }
        };

        if self.session.accept_command(token, &mut self.console).await {
            log::info!("Session shutdown requested");
            self.quit();
        }
    }

    /// Read and apply lines until the session quits or input ends.
    ///
    /// A failed read is reported and the loop carries on; only repeated failures in a
    /// row end it, the same way end of input does.
    pub async fn run(&mut self) -> Result<()> {
        let mut failures = 0;

        while !self.should_quit {
            let raw = match self.console.read_line(&self.prompt).await {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    log::info!("End of input");
                    self.end_of_input();
                    break;
                }
                Err(e) => {
                    failures += 1;
                    log::warn!(
                        "Failed to read input ({}/{}): {:#}",
                        failures,
                        MAX_READ_FAILURES,
                        e
                    );
                    self.console
                        .emit(Message::error(format!("Input error: {:#}", e)));
                    if failures >= MAX_READ_FAILURES {
                        self.end_of_input();
                        break;
                    }
                    continue;
                }
            };

            failures = 0;
            self.handle_line(&raw).await;
        }

        log::info!("Application loop ended successfully");
        Ok(())
    }

    fn end_of_input(&mut self) {
        if self.is_modified() {
            self.console
                .emit(Message::error("End of input: unsaved changes discarded"));
        }
        self.quit();
    }
}
