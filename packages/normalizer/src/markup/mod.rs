//! Owned markup tree: lenient parsing, traversal, mutation, serialization.

mod parse;
mod serialize;
mod text;
mod tree;

pub use parse::parse_markup;
pub use serialize::to_markup;
pub use text::{normalize, normalized_len};
pub use tree::{Descendants, Element};
