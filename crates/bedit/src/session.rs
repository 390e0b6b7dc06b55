//! The editing session: one buffer, its dirty flag, its file, and the command
//! dispatch that ties them together.

use anyhow::Result;
use bfile::{EditorError, LineBuffer, Token};
use std::path::{Path, PathBuf};

use crate::command_processor::{parse_range, parse_shift, CommandKind};
use crate::config::Config;
use crate::console::{Console, Message};
use crate::file_manager::FileManager;
use crate::shell::{CommandRunner, ShellRunner};

const SAVE_PROMPT: &str = "Input a filepath to save this file to:\n";
const QUIT_PROMPT: &str = "Are you sure? [Y]es/[N]o\n>>> ";

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct EditorSession {
    buffer: LineBuffer,
    dirty: bool,
    gap: u32,
    confirm_quit: bool,
    file_manager: FileManager,
    runner: Box<dyn CommandRunner>,
}

impl EditorSession {
    pub fn new(config: &Config) -> Self {
        Self {
            buffer: LineBuffer::new(),
            dirty: false,
            gap: config.editor.gap,
            confirm_quit: config.editor.confirm_quit,
            file_manager: FileManager::from_config(config),
            runner: Box::new(ShellRunner::new(
                config.shell.program.clone(),
                config.shell.flag.clone(),
            )),
        }
    }

    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_manager.get_current_path().map(PathBuf::as_path)
    }

    /// Load `path` into the buffer. A path that does not exist yet starts an empty
    /// buffer that will be saved there.
    pub async fn load_file(&mut self, path: PathBuf) -> Result<String> {
        if !path.exists() {
            let message = format!("New file: {}", path.display());
            self.buffer.clear();
            self.file_manager.set_path(path);
            self.dirty = false;
            return Ok(message);
        }

        let lines = self.file_manager.open_file(path).await?;
        let count = lines.len();
        self.buffer.load(lines, self.gap);
        self.dirty = false;

        Ok(format!("Loaded {} lines", count))
    }

    /// Apply one token. Returns `true` when the session should end.
    ///
    /// Failures are reported on the console and never end the session.
    pub async fn accept_command(&mut self, token: Token, console: &mut dyn Console) -> bool {
        match self.dispatch(token, console).await {
            Ok(flow) => flow == Flow::Quit,
            Err(e) => {
                log::debug!("Command failed: {:#}", e);
                console.emit(Message::error(format!("{:#}", e)));
                false
            }
        }
    }

    /// Apply one token, returning failures to the caller.
    pub async fn dispatch(&mut self, token: Token, console: &mut dyn Console) -> Result<Flow> {
        match token {
            Token::Blank => Ok(Flow::Continue),
            Token::LineEdit { line, content } => {
                self.buffer.set_line(line, content)?;
                self.dirty = true;
                Ok(Flow::Continue)
            }
            Token::Command { name, args } => {
                let kind: CommandKind = name.parse()?;
                self.execute_command(kind, &args, console).await
            }
        }
    }

    async fn execute_command(
        &mut self,
        kind: CommandKind,
        args: &[String],
        console: &mut dyn Console,
    ) -> Result<Flow> {
        match kind {
            CommandKind::Exec => {
                let command = args.join(" ");
                console.emit(Message::info(format!("Running [ {} ]...", command)));

                let code = self.runner.run(&command, console).await?;
                self.dirty = true;
                console.emit(Message::info(format!("[ {} ] exited with code {}", command, code)));
            }
            CommandKind::Save => self.save(console).await?,
            CommandKind::Quit => return self.quit(console).await,
            CommandKind::PushF => {
                let (from, offset) = parse_shift(kind, args)?;
                self.buffer.shift_forward(from, offset)?;
                self.dirty = true;
            }
            CommandKind::PushB => {
                let (from, offset) = parse_shift(kind, args)?;
                self.buffer.shift_backward(from, offset)?;
                self.dirty = true;
            }
            CommandKind::List | CommandKind::ListR => {
                let range = parse_range(kind, args)?;
                let lines = if kind == CommandKind::List {
                    self.buffer.list_by_virtual_number(range)?
                } else {
                    self.buffer.list_by_position(range)?
                };

                for line in lines {
                    console.emit(Message::output(line));
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn save(&mut self, console: &mut dyn Console) -> Result<()> {
        let lines = self.buffer.drain();
        let message = if self.file_manager.has_file() {
            self.file_manager.save_file(&lines).await?
        } else {
            // A path that fails to write is not remembered; the next save asks again
            let path = prompt_for_path(console).await?;
            self.file_manager.save_file_as(path, &lines).await?
        };
        self.dirty = false;
        console.emit(Message::success(message));
        Ok(())
    }

    async fn quit(&mut self, console: &mut dyn Console) -> Result<Flow> {
        if !self.dirty || !self.confirm_quit {
            return Ok(Flow::Quit);
        }

        let answer = console.read_line(QUIT_PROMPT).await?;
        if answer.is_some_and(|a| a.to_lowercase().starts_with('y')) {
            Ok(Flow::Quit)
        } else {
            console.emit(Message::info("Quit cancelled"));
            Ok(Flow::Continue)
        }
    }
}

async fn prompt_for_path(console: &mut dyn Console) -> Result<PathBuf> {
    loop {
        match console.read_line(SAVE_PROMPT).await? {
            None => return Err(anyhow::anyhow!("No path given, file not saved")),
            Some(answer) if answer.trim().is_empty() => {
                console.emit(Message::error("Not a path."));
            }
            Some(answer) => return Ok(PathBuf::from(answer.trim())),
        }
    }
}

/// The core error kind behind a failed command, if any.
pub fn editor_error(error: &anyhow::Error) -> Option<&EditorError> {
    error.downcast_ref::<EditorError>()
}
