//! # Event Bus
//!
//! Typed publish/subscribe for the envcfg extension points.
//!
//! Events are identified by their Rust type. Every subscriber gets its own copy
//! (fan-out over `tokio::sync::broadcast`), publishers never block and never
//! fail because nobody is listening.
//!
//! # Example
//!
//! ```rust
//! use envcfg_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ConfigApplied { tier: &'static str }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!
//!     let mut rx = bus.subscribe::<ConfigApplied>()?;
//!     bus.publish(ConfigApplied { tier: "staging" })?;
//!
//!     if let Some(event) = rx.recv_event().await {
//!         assert_eq!(event.tier, "staging");
//!     }
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
