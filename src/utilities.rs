//! Extra functionalities needed in `protocols`.

pub mod group;
pub mod hashes;
pub mod rng;
