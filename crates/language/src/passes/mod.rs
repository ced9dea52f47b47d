//! Post-parse passes for Java trees.
//!
//! Both passes are best-effort decorations. The symbol table pass fills the
//! tree's [`ScopeTable`](quarry_tree::ScopeTable); the type resolution pass
//! adds `TypeName` and `Resolved` attributes to variable declarations.

mod symbols;
mod types;

pub use symbols::SymbolTablePass;
pub use types::TypeResolutionPass;
