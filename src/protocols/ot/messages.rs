//! Payloads exchanged between the two parties.
//!
//! There is one struct per (round, direction) pair. The receiver has
//! nothing to send after round 4 of the sender.

use k256::elliptic_curve::{AffinePoint, Scalar};
use k256::Secp256k1;
use serde::{Deserialize, Serialize};

use crate::utilities::group::PrimeOrderCurve;
use crate::utilities::hashes::HashOutput;

/// Round 1, sender to receiver: `B = b*G`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "AffinePoint<C>: Serialize",
    deserialize = "AffinePoint<C>: Deserialize<'de>"
))]
pub struct SenderRound1<C: PrimeOrderCurve = Secp256k1> {
    pub point_b: AffinePoint<C>,
}

/// Round 1, receiver to sender: `A = a*G + omega*B`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "AffinePoint<C>: Serialize",
    deserialize = "AffinePoint<C>: Deserialize<'de>"
))]
pub struct ReceiverRound1<C: PrimeOrderCurve = Secp256k1> {
    pub point_a: AffinePoint<C>,
}

/// Round 2, sender to receiver: `xi = H(H(rho0)) ^ H(H(rho1))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRound2 {
    pub xi: HashOutput,
}

/// Round 2, receiver to sender: the receiver's view of `H(H(rho0))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverRound2 {
    pub hh_rho0: HashOutput,
}

/// Round 3, sender to receiver: `H(rho0)` and `H(rho1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRound3 {
    pub h_rho0: HashOutput,
    pub h_rho1: HashOutput,
}

/// Round 3, receiver to sender: an empty acknowledgement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverRound3;

/// Round 4, sender to receiver: both secrets masked by their pads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "Scalar<C>: Serialize",
    deserialize = "Scalar<C>: Deserialize<'de>"
))]
pub struct SenderRound4<C: PrimeOrderCurve = Secp256k1> {
    pub alpha_bar0: Scalar<C>,
    pub alpha_bar1: Scalar<C>,
}
