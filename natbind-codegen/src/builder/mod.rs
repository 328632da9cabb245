//! Text building blocks.
//!
//! - [`CodeBuilder`] - indentation-aware line buffer
//! - [`CodeFragment`] - intermediate representation for pieces of output
//! - [`Indent`] - indentation configuration

mod code_builder;
mod fragment;
mod indent;

pub use code_builder::CodeBuilder;
pub use fragment::CodeFragment;
pub use indent::Indent;
