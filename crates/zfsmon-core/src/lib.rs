//! zfsmon-core - ZFS statistics collection library.
//!
//! Provides:
//! - `collector` - kstat pool/counter parsers, dataset property collection,
//!   and the `ZfsCollector` that drives a full collection pass
//! - `metrics` - metric records and the accumulator interface they are
//!   delivered through

pub mod collector;
pub mod metrics;
