//! 1-out-of-2 Oblivious Transfer over a prime-order elliptic curve.
//!
//! The sender holds two secret scalars and the receiver a selection bit.
//! After four rounds per party the receiver learns exactly the chosen
//! secret, while the sender learns nothing about the selection. See
//! [`protocols::ot`] for the two state machines and
//! [`utilities::group`] for the algebra they are built on.

pub mod protocols;
pub mod utilities;

// Computational security parameter (in bytes): every hash output has 256 bits.
const SECURITY: usize = 32;
