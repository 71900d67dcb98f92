//! # Domain Models
//!
//! Pure data shared by every envcfg crate (`serde` and `bitflags` only).
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod environment;
pub mod events;
pub mod network;
pub mod plugin;
