#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Syntax tree model shared by the parser, the query engine and the panels.
//!
//! Trees are built once per parse into an arena ([`SyntaxTree`]), decorated
//! by post-parse passes while still uniquely owned, and then frozen behind an
//! `Arc`. Nodes are addressed through [`NodeRef`], whose equality is identity:
//! two refs are equal only if they point at the same node of the same parse.
//!
//! The parser itself is a collaborator reached through [`Parser`] and
//! [`ParserProvider`]; this crate has no grammar of its own.

pub mod language;
pub mod parse;
pub mod scope;
pub mod tree;

pub use language::{LanguageVersion, ResolutionContext};
pub use parse::{ParseError, Parser, ParserProvider, PassError, PostParsePass};
pub use scope::{Declaration, DeclarationKind, Scope, ScopeKind, ScopeTable};
pub use tree::{AttrValue, Attribute, NodeData, NodeIdx, NodePath, NodeRef, PathParseError, Span, SyntaxTree, TreeBuilder, TreeId};
