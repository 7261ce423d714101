//! # ag-client
//!
//! The orchestration layer of the Agora client: thread interaction,
//! session lifecycle and publishing, written purely against ag-core ports.

pub mod auth;
pub mod controller;
pub mod publish;

pub use auth::Authenticator;
pub use controller::{InteractionController, ReplyTarget, SubmitOutcome, VoteOutcome};
pub use publish::publish_thread;
