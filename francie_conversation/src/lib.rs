#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Turn management for budgeted tutoring conversations.
//!
//! A session is an opaque token; its state is always derived from the
//! message log:
//! - `Active(n)`: `n` turns completed, fewer than the budget
//! - `Concluded`: the budget is spent and every further call gets the
//!   closing message
//!
//! Turns for one session are serialized in-process by [`SessionLocks`];
//! the store's uniqueness guard catches writers in other processes.

mod locks;
mod orchestrator;
mod resolver;

pub use locks::SessionLocks;
pub use orchestrator::{TurnError, TurnOrchestrator, TurnPolicy, TurnReply};
pub use resolver::{ConversationState, SessionStateResolver};
