//! Server plumbing shared by every app: health endpoint, system router and state.

mod health;
pub mod router;
mod state;

pub use health::HealthResponse;
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
