//! Panel controllers.
//!
//! Each panel keeps the state a front end draws and implements
//! [`NodeSelectionSource`](crate::selection::NodeSelectionSource). Widget
//! callbacks call the panel's `on_*`/`select_*` methods; those are muted
//! while the panel is displaying a selection that came from elsewhere.

mod attributes;
mod code_area;
mod results;
mod scopes;
mod tree_view;

pub use self::attributes::{AttributePanel, AttributeRow};
pub use self::code_area::CodeAreaPanel;
pub use self::results::ResultListPanel;
pub use self::scopes::{DeclarationRow, ScopePanel, ScopeRow};
pub use self::tree_view::{TreeRow, TreeViewPanel};
