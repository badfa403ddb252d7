//! The sender side of the oblivious transfer.

use std::{fmt, mem};

use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::elliptic_curve::subtle::ConstantTimeEq;
use k256::elliptic_curve::{ProjectivePoint, Scalar};
use k256::Secp256k1;
use tracing::{instrument, trace, warn};

use crate::protocols::ot::hash_chain;
use crate::protocols::ot::messages::{
    ReceiverRound1, ReceiverRound2, ReceiverRound3, SenderRound1, SenderRound2, SenderRound3,
    SenderRound4,
};
use crate::protocols::{ErrorOT, Party};
use crate::utilities::group::{Group, PrimeOrderCurve, Value};
use crate::utilities::hashes::xor;
use crate::utilities::rng;

enum State<C: PrimeOrderCurve> {
    Init,
    AfterRound1 {
        b: Scalar<C>,
        point_b: ProjectivePoint<C>,
    },
    AfterRound2 {
        rho: [Scalar<C>; 2],
    },
    AfterRound3 {
        rho: [Scalar<C>; 2],
    },
    Done,
    Aborted,
}

impl<C: PrimeOrderCurve> State<C> {
    fn name(&self) -> &'static str {
        match self {
            State::Init => "Init",
            State::AfterRound1 { .. } => "AfterRound1",
            State::AfterRound2 { .. } => "AfterRound2",
            State::AfterRound3 { .. } => "AfterRound3",
            State::Done => "Done",
            State::Aborted => "Aborted",
        }
    }
}

/// Oblivious transfer sender holding two secret scalars.
pub struct OTSender<'g, C: PrimeOrderCurve = Secp256k1> {
    group: &'g Group<C>,
    alpha: [Scalar<C>; 2],
    state: State<C>,
}

impl<'g, C: PrimeOrderCurve> OTSender<'g, C> {
    /// Creates a sender for the secrets `alpha = (alpha0, alpha1)`.
    pub fn new(group: &'g Group<C>, alpha: [Scalar<C>; 2]) -> Self {
        OTSender {
            group,
            alpha,
            state: State::Init,
        }
    }

    /// Creates a sender from untyped values.
    ///
    /// There must be exactly two values, each convertible with
    /// [`Group::scalar`].
    pub fn from_values(group: &'g Group<C>, alpha: &[Value<C>]) -> Result<Self, ErrorOT> {
        let [alpha0, alpha1] = alpha else {
            return Err(ErrorOT::InvalidInput(format!(
                "the sender needs exactly two secrets, got {}",
                alpha.len()
            )));
        };

        let convert = |value: &Value<C>| {
            group
                .scalar(value)
                .map_err(|error| ErrorOT::InvalidInput(error.to_string()))
        };

        Ok(OTSender::new(group, [convert(alpha0)?, convert(alpha1)?]))
    }

    /// Creates a sender with two random secrets.
    pub fn random(group: &'g Group<C>) -> Self {
        OTSender::new(group, [group.random_scalar(), group.random_scalar()])
    }

    /// The secrets being transferred.
    pub fn secrets(&self) -> &[Scalar<C>; 2] {
        &self.alpha
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, State::Aborted)
    }

    // A finished instance stays finished. Any other instance stays aborted
    // unless the caller commits a new state.
    fn take_state(&mut self) -> State<C> {
        let fallback = match self.state {
            State::Done => State::Done,
            _ => State::Aborted,
        };
        mem::replace(&mut self.state, fallback)
    }

    fn out_of_order(operation: &'static str, state: &State<C>) -> ErrorOT {
        ErrorOT::ProtocolState {
            party: Party::Sender,
            operation,
            state: state.name(),
        }
    }

    /// Round 1 - Samples the ephemeral key `b` and sends `B = b*G`.
    pub fn round1(&mut self) -> Result<SenderRound1<C>, ErrorOT> {
        self.round1_with_rng(&mut rng::get_rng())
    }

    /// Round 1 with a caller-provided generator.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round1_with_rng<R: CryptoRngCore>(
        &mut self,
        rng: &mut R,
    ) -> Result<SenderRound1<C>, ErrorOT> {
        match self.take_state() {
            State::Init => {}
            other => return Err(Self::out_of_order("round 1", &other)),
        }

        let b = self.group.random_scalar_with(rng);
        let point_b = self.group.generator() * b;

        self.state = State::AfterRound1 { b, point_b };
        trace!(state = self.state.name(), "sender committed round 1");

        Ok(SenderRound1 {
            point_b: point_b.into(),
        })
    }

    /// Round 2 - Derives both pads from the receiver's `A` and sends
    /// `xi = H(H(rho0)) ^ H(H(rho1))`.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round2(&mut self, msg: &ReceiverRound1<C>) -> Result<SenderRound2, ErrorOT> {
        let (b, point_b) = match self.take_state() {
            State::AfterRound1 { b, point_b } => (b, point_b),
            other => return Err(Self::out_of_order("round 2", &other)),
        };

        let group = self.group;
        let point_a: ProjectivePoint<C> = msg.point_a.into();

        let rho0 = group.hash_to_scalar(&Value::Point(point_a * b));
        let rho1 = group.hash_to_scalar(&Value::Point((point_a - point_b) * b));

        let (_, hh_rho0) = hash_chain(group, &rho0);
        let (_, hh_rho1) = hash_chain(group, &rho1);
        let xi = xor(&hh_rho0, &hh_rho1);

        self.state = State::AfterRound2 { rho: [rho0, rho1] };
        trace!(state = self.state.name(), "sender committed round 2");

        Ok(SenderRound2 { xi })
    }

    /// Round 3 - Checks the receiver's `H(H(rho0))` and opens `H(rho0)` and
    /// `H(rho1)`.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round3(&mut self, msg: &ReceiverRound2) -> Result<SenderRound3, ErrorOT> {
        let rho = match self.take_state() {
            State::AfterRound2 { rho } => rho,
            other => return Err(Self::out_of_order("round 3", &other)),
        };

        let (h_rho0, hh_rho0) = hash_chain(self.group, &rho[0]);
        if !bool::from(msg.hh_rho0[..].ct_eq(&hh_rho0[..])) {
            warn!("receiver's double hash of rho0 does not match");
            return Err(ErrorOT::ConsistencyCheckFailed(Party::Sender));
        }

        let (h_rho1, _) = hash_chain(self.group, &rho[1]);

        self.state = State::AfterRound3 { rho };
        trace!(state = self.state.name(), "sender committed round 3");

        Ok(SenderRound3 { h_rho0, h_rho1 })
    }

    /// Round 4 - Once the receiver acknowledged, sends both secrets masked
    /// by their pads.
    #[instrument(level = "debug", skip_all, err)]
    pub fn round4(&mut self, _msg: &ReceiverRound3) -> Result<SenderRound4<C>, ErrorOT> {
        let rho = match self.take_state() {
            State::AfterRound3 { rho } => rho,
            other => return Err(Self::out_of_order("round 4", &other)),
        };

        let [alpha0, alpha1] = self.alpha;

        self.state = State::Done;
        trace!(state = self.state.name(), "sender committed round 4");

        Ok(SenderRound4 {
            alpha_bar0: alpha0 + rho[0],
            alpha_bar1: alpha1 + rho[1],
        })
    }
}

impl<C: PrimeOrderCurve> fmt::Debug for OTSender<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OTSender")
            .field("state", &self.state.name())
            .finish_non_exhaustive()
    }
}
