#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Reactive plumbing for the designer core.
//!
//! Everything here is single-threaded and cooperative: values live behind
//! `Rc`, notifications run synchronously on the caller's stack, and time only
//! moves when a [`Clock`] says so. Debouncing is poll-driven; nothing in this
//! crate spawns tasks or blocks.
//!
//! # Building blocks
//!
//! * [`Var`]: observable value holder with change-only notification and
//!   cached derivations
//! * [`Debouncer`] / [`NullVeto`]: deadline-based coalescing of triggers
//! * [`SuspendFlag`]: nesting counter used to mute an outbound event path
//! * [`MessageChannel`]: origin-tagged publish/subscribe with duplicate
//!   suppression and self-origin filtering

pub mod audit;
pub mod channel;
pub mod debounce;
pub mod suspend;
pub mod time;
pub mod var;

pub use audit::{AuditEntry, AuditSink, Category, NullAuditSink};
pub use channel::{ComponentId, Message, MessageChannel};
pub use debounce::{Debouncer, NullVeto, VetoDecision};
pub use suspend::{SuspendFlag, SuspendGuard};
pub use time::{Clock, ManualClock, SystemClock};
pub use var::{Subscription, Var};
