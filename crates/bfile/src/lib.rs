pub mod buffer;
pub mod error;
pub mod tokenizer;

pub use buffer::{LineBuffer, DEFAULT_GAP};
pub use error::EditorError;
pub use tokenizer::{tokenise, Token};
