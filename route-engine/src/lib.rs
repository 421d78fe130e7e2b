//! Route planning and vehicle ETA engine.
//!
//! Answers two questions for vehicles running on fixed routes: which route
//! best connects a pickup stop to a destination, and how long until a
//! vehicle reaches a given stop.

pub mod cache;
pub mod domain;
pub mod eta;
pub mod geo;
pub mod road;
pub mod router;
