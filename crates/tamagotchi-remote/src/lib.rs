//! Remote persistence, credentials, and the background worker for the
//! Tamagotchi pet simulation.
//!
//! The session never calls into this crate directly. It sends
//! [`Job`](tamagotchi_types::Job)s to a [`PetWorker`](worker::PetWorker)
//! over a channel and receives [`Outcome`](tamagotchi_types::Outcome)s
//! back.
//!
//! # Modules
//!
//! - [`error`] -- Remote and token-file error types.
//! - [`http`] -- REST persistence backend.
//! - [`memory`] -- In-memory persistence backend.
//! - [`store`] -- [`PetStore`](store::PetStore) backend dispatch.
//! - [`auth`] -- Token refresh providers.
//! - [`credentials`] -- The shared, replace-only credential cell.
//! - [`token_store`] -- The token file.
//! - [`refresh`] -- The periodic refresh task.
//! - [`worker`] -- The job worker.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod http;
pub mod memory;
pub mod refresh;
pub mod store;
pub mod token_store;
pub mod worker;
