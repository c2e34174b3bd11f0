#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A pool of reusable instances that are activated and deactivated on demand.
//!
//! Spawning and destroying objects is often far more expensive than hiding them and showing them
//! again. This crate provides [`InstancePool`], which creates a set of instances up front through
//! a caller-supplied factory and then hands them out by activating them, taking them back by
//! deactivating them.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Key features
//!
//! - **Recency ordering**: Activation takes the first inactive slot and deactivation moves a slot
//!   to the tail, so the pool always knows which instance has been active the longest.
//! - **Additive overflow**: When exhausted, the pool can grow by a configured amount up to a
//!   ceiling.
//! - **Destructive overflow**: When it cannot grow, the pool can recycle the instance that has
//!   been active the longest.
//! - **Notifications**: [`Signal`]s for size changes, activations and deactivations.
//! - **Configuration**: Settings can be loaded from TOML via [`PoolConfig`].
//!
//! # Example
//!
//! ```rust
//! use instance_pool::{Instance, InstancePool};
//!
//! #[derive(Debug)]
//! struct Bullet {
//!     position: (i32, i32),
//! }
//!
//! impl Instance for Bullet {
//!     type Placement = (i32, i32);
//!
//!     fn place(&mut self, placement: (i32, i32)) {
//!         self.position = placement;
//!     }
//! }
//!
//! let mut pool = InstancePool::builder()
//!     .name("Bullet")
//!     .pool_size(2)
//!     .destructive_overflow(true)
//!     .factory(|_| Bullet { position: (0, 0) })
//!     .build();
//!
//! let first = pool.activate_at((1, 1)).unwrap();
//! let _second = pool.activate_at((2, 2)).unwrap();
//!
//! // The pool is exhausted, so the bullet fired first is recycled.
//! let third = pool.activate_at((3, 3)).unwrap();
//! assert_eq!(third, first);
//! assert_eq!(pool.get(third).unwrap().position, (3, 3));
//! assert_eq!(pool.name_of(third), Some("Bullet (0)"));
//! ```
//!
//! # Logging
//!
//! The pool emits [`tracing`](https://docs.rs/tracing) events: `debug` level for changes in pool
//! size and overflow handling, `trace` level for individual activations and deactivations.

mod builder;
mod config;
mod error;
mod instance;
mod key;
mod pool;
mod sequence;
mod signal;

pub use builder::*;
pub use config::*;
pub use error::Error;
pub(crate) use error::Result;
pub use instance::*;
pub use key::*;
pub use pool::InstancePool;
pub use signal::*;
