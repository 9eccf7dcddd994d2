//! Source text → token stream, with indentation-sensitive block structure.

mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{keyword, Token, TokenKind};
