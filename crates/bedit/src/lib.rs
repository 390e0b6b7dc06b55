// BEdit library exports

pub mod app;
pub mod command_processor;
pub mod config;
pub mod console;
pub mod file_manager;
pub mod session;
pub mod shell;

pub use app::App;
pub use config::Config;
pub use console::{Console, Message, MessageType, ScriptedConsole, StdConsole};
pub use session::{EditorSession, Flow};
pub use shell::{CommandRunner, ShellRunner};
