#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod point;
pub mod selector;
mod r#type;

pub use error::{KdIndexError, Result};
pub use point::Point;
pub use r#type::IndexableNum;
pub use selector::BoundedSelector;

#[cfg(test)]
pub(crate) mod test;
