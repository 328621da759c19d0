//! Statement parsing module.

mod parser;
pub mod rules;

pub use parser::{Block, Blocks, DateWindow, LineParser, Transactions};
