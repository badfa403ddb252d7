//! Source of randomness for the protocol.
//!
//! Every ephemeral scalar must come from a fresh draw of a cryptographically
//! secure generator. A seeded generator must never be substituted here.

use rand::rngs::ThreadRng;

pub fn get_rng() -> ThreadRng {
    rand::thread_rng()
}
