//! 1-out-of-2 oblivious transfer of scalars.
//!
//! The sender holds `(alpha0, alpha1)` and the receiver a bit `omega`. Each
//! party is a four-round state machine and the rounds alternate, starting
//! with the sender:
//!
//! ```text
//! S.round1 -> R.round1 -> S.round2 -> R.round2 -> S.round3 -> R.round3 -> S.round4 -> R.round4
//! ```
//!
//! With `B = b*G` and `A = a*G + omega*B`, the sender derives the pads
//! `rho0 = H(b*A)` and `rho1 = H(b*(A - B))`, while the receiver derives
//! `rho_omega = H(a*B)`. Exactly one of the sender's pads matches the
//! receiver's. Before the masked secrets `alpha_i + rho_i` are released, both
//! parties verify the hash chain `xi = H(H(rho0)) ^ H(H(rho1))`.

use k256::elliptic_curve::Scalar;

use crate::protocols::ErrorOT;
use crate::utilities::group::{Group, PrimeOrderCurve, Value};
use crate::utilities::hashes::HashOutput;

pub mod messages;
pub mod receiver;
pub mod sender;

pub use receiver::OTReceiver;
pub use sender::OTSender;

/// Returns `H(rho)` and `H(H(rho))`.
pub(crate) fn hash_chain<C: PrimeOrderCurve>(
    group: &Group<C>,
    rho: &Scalar<C>,
) -> (HashOutput, HashOutput) {
    let h_rho = group.hash_to_bytes(&Value::Scalar(*rho));
    let hh_rho = group.hash_to_bytes(&Value::from(h_rho));
    (h_rho, hh_rho)
}

/// Runs all eight steps of the protocol in this process and returns the
/// value recovered by the receiver.
///
/// Both instances must be fresh. The first error aborts the run.
pub fn run_locally<C: PrimeOrderCurve>(
    sender: &mut OTSender<'_, C>,
    receiver: &mut OTReceiver<'_, C>,
) -> Result<Scalar<C>, ErrorOT> {
    let sender_round1 = sender.round1()?;
    let receiver_round1 = receiver.round1(&sender_round1)?;
    let sender_round2 = sender.round2(&receiver_round1)?;
    let receiver_round2 = receiver.round2(&sender_round2)?;
    let sender_round3 = sender.round3(&receiver_round2)?;
    let receiver_round3 = receiver.round3(&sender_round3)?;
    let sender_round4 = sender.round4(&receiver_round3)?;
    receiver.round4(&sender_round4)?;

    receiver.output()
}
