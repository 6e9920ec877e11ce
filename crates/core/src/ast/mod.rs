//! The translator's intermediate representation.
//!
//! A strict ownership tree: every node owns its children through `Box` and
//! `Vec`, and nothing points back up or across. Cross references (which names
//! are protocols, which unions carry payloads) go through the name-keyed
//! [`Registry`](crate::registry::Registry).

pub mod display;
pub mod expr;
pub mod file;
pub mod stmt;

pub use display::{dump_file, dump_stmts, expr_to_string};
pub use expr::*;
pub use file::SourceFile;
pub use stmt::*;
