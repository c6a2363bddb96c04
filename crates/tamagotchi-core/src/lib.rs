//! Session clock, vital mechanics, lifecycle, and tick loop for the
//! Tamagotchi pet simulation.
//!
//! This crate owns everything that happens inside a tick and nothing that
//! touches the network. Remote work leaves the session as
//! [`Job`](tamagotchi_types::Job) messages and comes back as
//! [`Outcome`](tamagotchi_types::Outcome) messages.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter, tick period, and simulation speed.
//! - [`config`] -- Configuration loading from `tamagotchi-config.yaml` into
//!   strongly-typed structs.
//! - [`resource`] -- Drain and refill arithmetic for one vital.
//! - [`distress`] -- Time-without-resource tracking and the dying flag.
//! - [`blink`] -- Cosmetic blink timer for empty vitals.
//! - [`vitals`] -- Per-vital state and the vital phase of the tick.
//! - [`health`] -- Health decay and experience award.
//! - [`lifecycle`] -- Death detection and the restart/creation state machine.
//! - [`session`] -- [`Session`] state and its command/outcome handling.
//! - [`tick`] -- One simulation step.
//! - [`runner`] -- The async loop driving ticks, commands, and outcomes.
//!
//! [`Session`]: session::Session

pub mod blink;
pub mod clock;
pub mod config;
pub mod distress;
pub mod health;
pub mod lifecycle;
pub mod resource;
pub mod runner;
pub mod session;
pub mod tick;
pub mod vitals;
