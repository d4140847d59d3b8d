//! Worker lifecycle primitives
//!
//! - [`Closer`]: one-shot shutdown signal plus running-worker count
//! - [`Throttle`]: at most `max` concurrent units of work, first error kept
//!
//! Both are safe to share across threads (`Closer` by cloning, `Throttle`
//! behind an `Arc`). Neither offers timeouts or cancellation; waits block
//! the calling thread until their condition holds. Misuse that would
//! corrupt the shared counts (double signal, release without acquire,
//! negative running count) panics.

mod closer;
mod throttle;

pub use closer::Closer;
pub use throttle::Throttle;
