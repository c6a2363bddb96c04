//! Shared type definitions for the Tamagotchi pet simulation.
//!
//! This crate is the single source of truth for the data that crosses
//! crate boundaries: the pet itself, the per-tick snapshot handed to the
//! UI, the commands the UI sends back, and the job/outcome messages
//! exchanged with the background persistence worker.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Vitals, activities, themes, and lifecycle phases
//! - [`structs`] -- Pets, remote records, snapshots, notices, and tokens
//! - [`messages`] -- UI commands and worker jobs/outcomes

pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Activity, LifecyclePhase, Theme, Vital};
pub use ids::PetId;
pub use messages::{Command, Epoch, Job, JobTag, Outcome};
pub use structs::{
    MAX_LEVEL, Notice, Pet, PetRecord, PetSnapshot, SNAP_EPSILON, TokenSet, VitalSnapshot,
    clamp_level, snap_level, xp_to_wire,
};
