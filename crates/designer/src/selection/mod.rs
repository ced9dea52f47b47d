//! Node-selection protocol shared by every panel that shows tree nodes.
//!
//! Panels never talk to each other. A panel where the user picks a node
//! publishes a [`NodeSelectionEvent`] on the selection channel through its
//! [`SelectionHandle`] and updates its own display right away; the channel
//! does not echo the event back to its origin. Every other panel receives the
//! event through the [`SelectionSynchronizer`], which mutes the receiving
//! panel's outbound path while the panel updates its display.
//!
//! After a reparse the synchronizer re-locates the selected node in the new
//! tree by child-index path and kind, and either re-selects it with
//! [`SelectionOptions::SELECTION_RECOVERY`] or clears the selection.

mod event;
mod recovery;
mod source;
mod synchronizer;

pub use self::event::{NodeSelectionEvent, SelectionOptions};
pub use self::recovery::relocate;
pub use self::source::{NodeSelectionSource, SelectionHandle};
pub use self::synchronizer::{RECOVERY_ORIGIN, RecoveryOutcome, SelectionSynchronizer};

#[cfg(test)]
mod tests;
