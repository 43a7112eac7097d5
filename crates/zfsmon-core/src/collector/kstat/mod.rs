//! Collectors for the ZFS kstat tree (`/proc/spl/kstat/zfs`).
//!
//! The tree holds one directory per imported pool, each with an `io` table,
//! plus one counter file per category (`arcstats`, `zil`, ...).

pub mod parser;
pub mod pools;

pub use parser::{ParseError, UNPREFIXED_CATEGORIES};
pub use pools::{Pool, discover_pools, join_names};
