#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Structural queries over syntax trees.
//!
//! [`QueryEngine`] is the contract the designer evaluates queries through.
//! [`XPathEngine`] implements it for a subset of XPath covering location
//! paths, predicates, comparisons and the string functions rule authors
//! rely on, in three [`XPathVersion`] dialects.

pub mod dialect;
pub mod engine;
pub mod xpath;

pub use dialect::{XPathVersion, extract_missing_property_name};
pub use engine::{Properties, QueryEngine, QueryError, QueryErrorKind};
pub use xpath::XPathEngine;
