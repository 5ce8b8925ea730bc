//! Background Tasks Module
//!
//! Optional maintenance tasks a host can run alongside its caches.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at a configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, Sweep};
