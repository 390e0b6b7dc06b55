use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Listing lines and external command output.
    Output,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
}

impl Message {
    pub fn new(content: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            content: content.into(),
            message_type,
        }
    }

    pub fn output(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Output)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Info)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Success)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(content, MessageType::Error)
    }
}

/// Interactive line source and message sink the editor talks to.
#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and read one line. `None` means end of input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    fn emit(&mut self, message: Message);
}

/// Read one line without its terminator (`\n` or `\r\n`). Bytes that are not valid
/// UTF-8 are replaced rather than rejected. `None` at end of input.
pub(crate) async fn read_lossy_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }

    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Console over the process's stdin and stdout.
pub struct StdConsole {
    reader: BufReader<Stdin>,
    buf: Vec<u8>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            buf: Vec::new(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let line = read_lossy_line(&mut self.reader, &mut self.buf).await?;
        if line.is_none() {
            // Keep the shell prompt off our own prompt line
            writeln!(stdout)?;
        }
        Ok(line)
    }

    fn emit(&mut self, message: Message) {
        match message.message_type {
            MessageType::Error => eprintln!("{}", message.content),
            _ => println!("{}", message.content),
        }
    }
}

/// Console fed from a fixed list of answers, recording everything emitted.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
    pub messages: Vec<Message>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn output(&self) -> Vec<&str> {
        self.of_type(MessageType::Output)
    }

    pub fn errors(&self) -> Vec<&str> {
        self.of_type(MessageType::Error)
    }

    pub fn has_message(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.content.contains(needle))
    }

    pub fn clear(&mut self) {
        self.prompts.clear();
        self.messages.clear();
    }

    fn of_type(&self, message_type: MessageType) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.message_type == message_type)
            .map(|m| m.content.as_str())
            .collect()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn emit(&mut self, message: Message) {
        self.messages.push(message);
    }
}
