//! Data models for Vigil

mod actor;
mod commitment;
mod request;
mod session;
mod stats;

pub use actor::*;
pub use commitment::*;
pub use request::*;
pub use session::*;
pub use stats::*;
