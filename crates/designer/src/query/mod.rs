//! Query evaluation pipeline.
//!
//! [`QueryUpdateSubscriber`] watches the parse model's compilation unit and
//! the active [`QueryState`], and publishes an [`EvaluationResult`].

mod evaluation;
mod state;
mod subscriber;

pub use self::evaluation::{EvaluationError, EvaluationResult};
pub use self::state::QueryState;
pub use self::subscriber::QueryUpdateSubscriber;

#[cfg(test)]
mod tests;
