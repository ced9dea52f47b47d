#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Core of the quarry rule designer.
//!
//! The designer keeps one parsed representation of the edited source, keeps
//! a query result consistent with it, and keeps every panel that can show a
//! syntax-tree node focused on the same node. Rendering is left to whatever
//! front end drives a [`DesignerRoot`]; panels here hold the state a front
//! end would draw.
//!
//! # Data flow
//!
//! ```text
//! CodeAreaPanel --(source debounce)--> ParseModel --(null veto)--> compilation unit
//!                                                                     |
//!                         QueryTabs --(query debounce)--> QueryUpdateSubscriber --> EvaluationResult
//!                                                                     |
//!                                SelectionSynchronizer <--------------+
//!                                         |
//!                      selection channel (MessageChannel<NodeSelectionEvent>)
//!                                         |
//!              tree view / code area / attributes / scopes / results
//! ```
//!
//! Everything runs on one thread. Time-based work is collected by
//! [`DesignerRoot::pump`], which the driver calls again at
//! [`DesignerRoot::next_deadline`].

pub mod config;
pub mod event_log;
pub mod panels;
pub mod parse_model;
pub mod query;
pub mod root;
pub mod runtime;
pub mod sanitize;
pub mod selection;
pub mod settings;
pub mod tabs;
pub mod test_case;

pub use config::{ConfigError, DesignerConfig, Timings};
pub use event_log::{EventLog, EventLogLayer, LogEntry};
pub use parse_model::ParseModel;
pub use query::{EvaluationError, EvaluationResult, QueryState, QueryUpdateSubscriber};
pub use root::DesignerRoot;
pub use runtime::pump::{PumpPhase, PumpReport};
pub use sanitize::{sanitize_error, sanitize_message};
pub use selection::{NodeSelectionEvent, NodeSelectionSource, SelectionHandle, SelectionOptions, SelectionSynchronizer};
pub use settings::{PersistentSettings, RecentFiles, SettingsError};
pub use tabs::{QueryTab, QueryTabs, TabError};
pub use test_case::{LiveTestCase, TestCaseRunner, TestStatus};
