//! Operators. Each one is a source wrapping its upstream; the combinator
//! methods that build them live on [`Observable`](crate::observable::Observable).

pub mod collect;
pub mod concat;
pub mod filter;
pub mod flat_map;
pub mod into_stream;
pub mod map;
pub mod map_err;
pub mod merge;
pub mod observe_on;
pub mod subscribe_on;
pub mod take;
pub mod zip;
