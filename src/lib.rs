//! # rxcore: a minimal reactive stream core
//!
//! Sources push values to observers, followed by at most one terminal event
//! (an error or completion). Sources are cold recipes until subscribed;
//! operators compose them; schedulers decide where and when the work runs.
//!
//! ```
//! use rxcore::prelude::*;
//!
//! let doubled_evens = observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .blocking_collect();
//! assert_eq!(doubled_evens, Ok(vec![0, 4, 8, 12, 16]));
//! ```
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`observable`] | core traits and source factories |
//! | [`ops`] | operators |
//! | [`subject`] | multicasting to many observers |
//! | [`scheduler`] | execution contexts and virtual time |
//! | [`subscription`] | cancellation handles |
//! | [`testing`] | a recording observer for tests |
//!
//! Logging goes through `tracing`; install any subscriber to see it.

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod testing;

pub use prelude::*;
