#![cfg_attr(test, allow(unused_crate_dependencies))]
// Designer output goes through tracing; nothing here writes to stderr.
#![deny(clippy::print_stderr)]

//! Concrete language modules.
//!
//! Each module pairs a tree-sitter grammar with a [`Parser`] implementation
//! that converts the concrete syntax tree into a [`quarry_tree::SyntaxTree`]
//! and with the post-parse passes the language runs on every successful
//! parse.
//!
//! * [`java`]: Java via `tree-sitter-java`, with language-level gates
//! * [`passes`]: symbol table and type resolution
//! * [`registry`]: lookup of parsers and versions by language name
//!
//! [`Parser`]: quarry_tree::Parser

pub mod java;
pub mod passes;
pub mod registry;

pub use java::JavaParser;
pub use passes::{SymbolTablePass, TypeResolutionPass};
pub use registry::{LanguageModule, LanguageRegistry};
