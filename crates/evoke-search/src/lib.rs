//! Vector search for evoke.
//!
//! Brute-force nearest-neighbor retrieval over the in-memory image catalog,
//! and mood steering of query embeddings along the dataset's direction
//! vectors. Everything here is a pure function of its inputs, so a shared
//! read-only [`Dataset`](evoke_core::Dataset) can serve any number of
//! concurrent callers.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod nearest;
pub mod steer;

pub use nearest::{l2_distance, search};
pub use steer::{perturb, steer};
