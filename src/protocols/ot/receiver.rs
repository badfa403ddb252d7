//! The receiver side of the oblivious transfer.

use std::{fmt, mem};

use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::elliptic_curve::subtle::ConstantTimeEq;
use k256::elliptic_curve::{ProjectivePoint, Scalar};
use k256::Secp256k1;
use rand::Rng;
use tracing::{instrument, trace, warn};

use crate::protocols::ot::hash_chain;
use crate::protocols::ot::messages::{
    ReceiverRound1, ReceiverRound2, ReceiverRound3, SenderRound1, SenderRound2, SenderRound3,
    SenderRound4,
};
use crate::protocols::{ErrorOT, Party};
use crate::utilities::group::{Group, PrimeOrderCurve, Value};
use crate::utilities::hashes::{xor, HashOutput};
use crate::utilities::rng;

// Only the pad of the chosen index is ever held here.
enum State<C: PrimeOrderCurve> {
    Init,
    AfterRound1 { rho_omega: Scalar<C> },
    AfterRound2 { rho_omega: Scalar<C>, xi: HashOutput },
    AfterRound3 { rho_omega: Scalar<C> },
    Done { alpha_omega: Scalar<C> },
    Aborted,
}

impl<C: PrimeOrderCurve> State<C> {
    fn name(&self) -> &'static str {
        match self {
            State::Init => "Init",
            State::AfterRound1 { .. } => "AfterRound1",
            State::AfterRound2 { .. } => "AfterRound2",
            State::AfterRound3 { .. } => "AfterRound3",
            State::Done { .. } => "Done",
            State::Aborted => "Aborted",
        }
    }
}

/// Oblivious transfer receiver holding a selection bit.
pub struct OTReceiver<'g, C: PrimeOrderCurve = Secp256k1> {
    group: &'g Group<C>,
    omega: bool,
    state: State<C>,
}

impl<'g, C: PrimeOrderCurve> OTReceiver<'g, C> {
    /// Creates a receiver selecting index `omega`, which must be 0 or 1.
    pub fn new(group: &'g Group<C>, omega: i64) -> Result<Self, ErrorOT> {
        let omega = match omega {
            0 => false,
            1 => true,
            _ => {
                return Err(ErrorOT::InvalidInput(format!(
                    "the selection bit must be 0 or 1, got {omega}"
                )))
            }
        };

        Ok(OTReceiver::with_choice(group, omega))
    }

    /// Creates a receiver selecting index 1 if `omega` is true, 0 otherwise.
    pub fn with_choice(group: &'g Group<C>, omega: bool) -> Self {
        OTReceiver {
            group,
            omega,
            state: State::Init,
        }
    }

    /// Creates a receiver with a uniformly random selection bit.
    pub fn random(group: &'g Group<C>) -> Self {
        OTReceiver::with_choice(group, rng::get_rng().gen())
    }

    /// The selection bit.
    pub fn choice(&self) -> bool {
        self.omega
    }

    /// The secret recovered in round 4.
    pub fn output(&self) -> Result<Scalar<C>, ErrorOT> {
        match &self.state {
            State::Done { alpha_omega } => Ok(*alpha_omega),
            other => Err(Self::out_of_order("output", other)),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, State::Aborted)
    }

    #[cfg(test)]
    pub(crate) fn pad(&self) -> Option<Scalar<C>> {
        match &self.state {
            State::AfterRound1 { rho_omega }
            | State::AfterRound2 { rho_omega, .. }
            | State::AfterRound3 { rho_omega } => Some(*rho_omega),
            _ => None,
        }
    }

    // A finished instance keeps its output. Any other instance stays aborted
    // unless the caller commits a new state.
    fn take_state(&mut self) -> State<C> {
        let fallback = match self.state {
            State::Done { alpha_omega } => State::Done { alpha_omega },
            _ => State::Aborted,
        };
        mem::replace(&mut self.state, fallback)
    }

    fn out_of_order(operation: &'static str, state: &State<C>) -> ErrorOT {
        ErrorOT::ProtocolState {
            party: Party::Receiver,
            operation,
            state: state.name(),
        }
    }

    /// Round 1 - Samples the ephemeral key `a`, sends `A = a*G + omega*B`
    /// and keeps the pad `rho_omega = H(a*B)`.
    pub fn round1(&mut self, msg: &SenderRound1<C>) -> Result<ReceiverRound1<C>, ErrorOT> {
        self.round1_with_rng(&mut rng::get_rng(), msg)
    }

    /// Round 1 with a caller-provided generator.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round1_with_rng<R: CryptoRngCore>(
        &mut self,
        rng: &mut R,
        msg: &SenderRound1<C>,
    ) -> Result<ReceiverRound1<C>, ErrorOT> {
        match self.take_state() {
            State::Init => {}
            other => return Err(Self::out_of_order("round 1", &other)),
        }

        let group = self.group;
        let point_b: ProjectivePoint<C> = msg.point_b.into();
        let omega = <Scalar<C> as From<u64>>::from(u64::from(self.omega));

        let a = group.random_scalar_with(rng);
        let point_a = group.generator() * a + point_b * omega;
        let rho_omega = group.hash_to_scalar(&Value::Point(point_b * a));

        self.state = State::AfterRound1 { rho_omega };
        trace!(state = self.state.name(), "receiver committed round 1");

        Ok(ReceiverRound1 {
            point_a: point_a.into(),
        })
    }

    /// Round 2 - Answers with the receiver's view of `H(H(rho0))`.
    ///
    /// For `omega = 0` this is `H(H(rho_omega))` itself; for `omega = 1` it
    /// is recovered from `xi`.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round2(&mut self, msg: &SenderRound2) -> Result<ReceiverRound2, ErrorOT> {
        let rho_omega = match self.take_state() {
            State::AfterRound1 { rho_omega } => rho_omega,
            other => return Err(Self::out_of_order("round 2", &other)),
        };

        let (_, hh_rho_omega) = hash_chain(self.group, &rho_omega);
        let hh_rho0 = if self.omega {
            xor(&hh_rho_omega, &msg.xi)
        } else {
            hh_rho_omega
        };

        self.state = State::AfterRound2 {
            rho_omega,
            xi: msg.xi,
        };
        trace!(state = self.state.name(), "receiver committed round 2");

        Ok(ReceiverRound2 { hh_rho0 })
    }

    /// Round 3 - Checks the opened `H(rho0)` and `H(rho1)` against `xi`.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round3(&mut self, msg: &SenderRound3) -> Result<ReceiverRound3, ErrorOT> {
        let (rho_omega, xi) = match self.take_state() {
            State::AfterRound2 { rho_omega, xi } => (rho_omega, xi),
            other => return Err(Self::out_of_order("round 3", &other)),
        };

        let hh_rho0 = self.group.hash_to_bytes(&Value::from(msg.h_rho0));
        let hh_rho1 = self.group.hash_to_bytes(&Value::from(msg.h_rho1));
        if !bool::from(xor(&hh_rho0, &hh_rho1)[..].ct_eq(&xi[..])) {
            warn!("opened hashes do not match xi");
            return Err(ErrorOT::ConsistencyCheckFailed(Party::Receiver));
        }

        self.state = State::AfterRound3 { rho_omega };
        trace!(state = self.state.name(), "receiver committed round 3");

        Ok(ReceiverRound3)
    }

    /// Round 4 - Unmasks the chosen secret: `alpha_omega = alpha_bar[omega] - rho_omega`.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round4(&mut self, msg: &SenderRound4<C>) -> Result<(), ErrorOT> {
        let rho_omega = match self.take_state() {
            State::AfterRound3 { rho_omega } => rho_omega,
            other => return Err(Self::out_of_order("round 4", &other)),
        };

        let alpha_bar = if self.omega {
            msg.alpha_bar1
        } else {
            msg.alpha_bar0
        };

        self.state = State::Done {
            alpha_omega: alpha_bar - rho_omega,
        };
        trace!(state = self.state.name(), "receiver committed round 4");

        Ok(())
    }
}

impl<C: PrimeOrderCurve> fmt::Debug for OTReceiver<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OTReceiver")
            .field("state", &self.state.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::AffinePoint;
    use rstest::rstest;

    fn sender_round1() -> SenderRound1 {
        SenderRound1 {
            point_b: AffinePoint::GENERATOR,
        }
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    fn test_receiver_new(#[case] omega: i64, #[case] choice: bool) {
        let group = Group::new();
        let receiver = OTReceiver::new(&group, omega).unwrap();

        assert_eq!(receiver.choice(), choice);
    }

    #[rstest]
    #[case(2)]
    #[case(-1)]
    #[case(i64::MAX)]
    fn test_receiver_invalid_input(#[case] omega: i64) {
        let group = Group::new();

        assert!(matches!(
            OTReceiver::new(&group, omega),
            Err(ErrorOT::InvalidInput(_))
        ));
    }

    /// With `omega = 0` the receiver's `A` carries no trace of `B`.
    #[test]
    fn test_receiver_round1_zero_choice() {
        let group = Group::new();
        let mut receiver = OTReceiver::with_choice(&group, false);

        let msg = receiver.round1(&sender_round1()).unwrap();
        let rho_omega = receiver.pad().unwrap();

        // Round 2 with omega = 0 ignores xi.
        let reply = receiver.round2(&SenderRound2 { xi: [7u8; 32] }).unwrap();
        assert_eq!(reply.hh_rho0, hash_chain(&group, &rho_omega).1);
        assert_ne!(msg.point_a, AffinePoint::IDENTITY);
    }

    #[test]
    fn test_receiver_round1_one_choice() {
        let group = Group::new();
        let mut receiver = OTReceiver::with_choice(&group, true);

        receiver.round1(&sender_round1()).unwrap();
        let rho_omega = receiver.pad().unwrap();

        let xi = [7u8; 32];
        let reply = receiver.round2(&SenderRound2 { xi }).unwrap();
        assert_eq!(reply.hh_rho0, xor(&hash_chain(&group, &rho_omega).1, &xi));
    }

    #[test]
    fn test_receiver_round2_before_round1() {
        let group = Group::new();
        let mut receiver = OTReceiver::with_choice(&group, true);

        assert_eq!(
            receiver.round2(&SenderRound2 { xi: [0u8; 32] }).unwrap_err(),
            ErrorOT::ProtocolState {
                party: Party::Receiver,
                operation: "round 2",
                state: "Init",
            }
        );
        assert!(receiver.is_aborted());
    }

    #[test]
    fn test_receiver_out_of_order() {
        let group = Group::new();

        let mut receiver3 = OTReceiver::with_choice(&group, false);
        let result = receiver3.round3(&SenderRound3 {
            h_rho0: [0u8; 32],
            h_rho1: [0u8; 32],
        });
        assert!(matches!(result, Err(ErrorOT::ProtocolState { .. })));

        let mut receiver4 = OTReceiver::with_choice(&group, false);
        let result = receiver4.round4(&SenderRound4 {
            alpha_bar0: k256::Scalar::ONE,
            alpha_bar1: k256::Scalar::ONE,
        });
        assert!(matches!(result, Err(ErrorOT::ProtocolState { .. })));

        let mut skipped = OTReceiver::with_choice(&group, false);
        skipped.round1(&sender_round1()).unwrap();
        let result = skipped.round4(&SenderRound4 {
            alpha_bar0: k256::Scalar::ONE,
            alpha_bar1: k256::Scalar::ONE,
        });
        assert!(matches!(
            result,
            Err(ErrorOT::ProtocolState {
                state: "AfterRound1",
                ..
            })
        ));
    }

    #[test]
    fn test_receiver_round1_twice() {
        let group = Group::new();
        let mut receiver = OTReceiver::with_choice(&group, true);

        receiver.round1(&sender_round1()).unwrap();
        assert_eq!(
            receiver.round1(&sender_round1()).unwrap_err(),
            ErrorOT::ProtocolState {
                party: Party::Receiver,
                operation: "round 1",
                state: "AfterRound1",
            }
        );
    }

    #[test]
    fn test_receiver_output_before_done() {
        let group = Group::new();
        let receiver = OTReceiver::with_choice(&group, true);

        assert_eq!(
            receiver.output().unwrap_err(),
            ErrorOT::ProtocolState {
                party: Party::Receiver,
                operation: "output",
                state: "Init",
            }
        );
    }

    /// A failed check leaves nothing to unmask.
    #[test]
    fn test_receiver_check_failure_aborts() {
        let group = Group::new();
        let mut receiver = OTReceiver::with_choice(&group, false);

        receiver.round1(&sender_round1()).unwrap();
        receiver.round2(&SenderRound2 { xi: [1u8; 32] }).unwrap();

        let result = receiver.round3(&SenderRound3 {
            h_rho0: [2u8; 32],
            h_rho1: [3u8; 32],
        });
        assert_eq!(
            result.unwrap_err(),
            ErrorOT::ConsistencyCheckFailed(Party::Receiver)
        );
        assert!(receiver.is_aborted());
        assert_eq!(receiver.pad(), None);

        let result = receiver.round4(&SenderRound4 {
            alpha_bar0: k256::Scalar::ONE,
            alpha_bar1: k256::Scalar::ONE,
        });
        assert!(matches!(
            result,
            Err(ErrorOT::ProtocolState {
                state: "Aborted",
                ..
            })
        ));
    }

    #[test]
    fn test_receiver_debug_hides_choice() {
        let group = Group::new();
        let receiver = OTReceiver::with_choice(&group, true);

        assert_eq!(format!("{receiver:?}"), "OTReceiver { state: \"Init\", .. }");
    }
}
