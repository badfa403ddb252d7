//! Scalar and point arithmetic, canonical encoding and hashing.
//!
//! A [`Group`] is an immutable handle on a prime-order elliptic curve. It
//! holds no state, so a single value can be shared by reference between
//! the sender and the receiver of a run. The default curve is secp256k1;
//! any curve implementing [`PrimeOrderCurve`] can be plugged in.
//!
//! Sender and receiver may live in different processes, so [`Group::encode`],
//! [`Group::hash_to_bytes`] and [`Group::hash_to_scalar`] are fixed byte for
//! byte:
//!
//! * a point is `X || Y || 1` (big-endian affine coordinates), and the
//!   identity is `0 || 1 || 0`;
//! * a byte string is passed through unmodified;
//! * a scalar is its 32-byte big-endian integer.

use std::marker::PhantomData;

use k256::elliptic_curve::ff::PrimeField;
use k256::elliptic_curve::group::Group as CurveGroup;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{
    AffinePoint, Curve, CurveArithmetic, FieldBytes, NonZeroScalar, PrimeCurve, ProjectivePoint,
    Scalar,
};
use k256::{Secp256k1, U256};

use crate::protocols::ErrorOT;
use crate::utilities::hashes::{hash, hash_as_int, HashOutput};
use crate::utilities::rng;
use crate::SECURITY;

/// A prime-order curve usable by the protocol.
///
/// Scalars must fit in 256 bits, since hash digests are reduced into them.
pub trait PrimeOrderCurve: Curve<Uint = U256> + CurveArithmetic + PrimeCurve {
    /// Returns the big-endian affine coordinates of `point`, or `None` for
    /// the identity.
    fn affine_coordinates(
        point: &AffinePoint<Self>,
    ) -> Option<(FieldBytes<Self>, FieldBytes<Self>)>;
}

impl PrimeOrderCurve for Secp256k1 {
    fn affine_coordinates(
        point: &AffinePoint<Self>,
    ) -> Option<(FieldBytes<Self>, FieldBytes<Self>)> {
        let encoded = point.to_encoded_point(false);
        Some((*encoded.x()?, *encoded.y()?))
    }
}

/// A value that can be encoded and hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value<C: CurveArithmetic = Secp256k1> {
    Point(ProjectivePoint<C>),
    Bytes(Vec<u8>),
    Scalar(Scalar<C>),
}

impl<C: CurveArithmetic> From<u64> for Value<C> {
    fn from(value: u64) -> Self {
        Value::Scalar(<Scalar<C> as From<u64>>::from(value))
    }
}

impl<C: CurveArithmetic> From<&[u8]> for Value<C> {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<C: CurveArithmetic> From<Vec<u8>> for Value<C> {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl<C: CurveArithmetic> From<HashOutput> for Value<C> {
    fn from(value: HashOutput) -> Self {
        Value::Bytes(value.to_vec())
    }
}

/// The group description shared by both parties.
///
/// Secp256k1 is built with [`Group::new`], other curves with
/// `Group::<C>::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Group<C: PrimeOrderCurve = Secp256k1> {
    curve: PhantomData<C>,
}

impl Group<Secp256k1> {
    /// The secp256k1 group: `y^2 = x^3 + 7` over `p = 2^256 - 2^32 - 977`.
    #[must_use]
    pub const fn new() -> Self {
        Group { curve: PhantomData }
    }
}

impl<C: PrimeOrderCurve> Group<C> {
    /// The fixed generator G.
    #[must_use]
    pub fn generator(&self) -> ProjectivePoint<C> {
        <ProjectivePoint<C> as CurveGroup>::generator()
    }

    /// The group order n.
    #[must_use]
    pub fn order(&self) -> U256 {
        C::ORDER
    }

    /// Draws a scalar uniformly from `[1, n-1]` with the thread-local CSPRNG.
    #[must_use]
    pub fn random_scalar(&self) -> Scalar<C> {
        self.random_scalar_with(&mut rng::get_rng())
    }

    /// Draws a scalar uniformly from `[1, n-1]` with the given generator.
    pub fn random_scalar_with<R: CryptoRngCore>(&self, rng: &mut R) -> Scalar<C> {
        *NonZeroScalar::<C>::random(rng)
    }

    /// Converts a value into a reduced scalar.
    ///
    /// Byte strings must be exactly 32 bytes long and are read as big-endian
    /// integers. Points cannot be converted.
    pub fn scalar(&self, value: &Value<C>) -> Result<Scalar<C>, ErrorOT> {
        match value {
            Value::Scalar(scalar) => Ok(*scalar),
            Value::Bytes(bytes) if bytes.len() == SECURITY => {
                Ok(<Scalar<C> as Reduce<U256>>::reduce(U256::from_be_slice(bytes)))
            }
            Value::Bytes(bytes) => Err(ErrorOT::Encoding(format!(
                "a scalar needs {SECURITY} bytes, got {}",
                bytes.len()
            ))),
            Value::Point(_) => Err(ErrorOT::Encoding(String::from(
                "a point cannot be converted into a scalar",
            ))),
        }
    }

    /// Canonical encoding of a value, used as hash input.
    #[must_use]
    pub fn encode(&self, value: &Value<C>) -> Vec<u8> {
        match value {
            Value::Point(point) => self.encode_point(point),
            Value::Bytes(bytes) => bytes.clone(),
            Value::Scalar(scalar) => self.encode_scalar(scalar),
        }
    }

    /// Encodes a point as `X || Y || indicator`.
    #[must_use]
    pub fn encode_point(&self, point: &ProjectivePoint<C>) -> Vec<u8> {
        let affine: AffinePoint<C> = (*point).into();

        let (x, y, indicator) = match C::affine_coordinates(&affine) {
            Some((x, y)) => (x, y, 1u8),
            None => {
                let mut y = FieldBytes::<C>::default();
                let last = y.len() - 1;
                y[last] = 1;
                (FieldBytes::<C>::default(), y, 0u8)
            }
        };

        let mut encoded = Vec::with_capacity(x.len() + y.len() + 1);
        encoded.extend_from_slice(&x);
        encoded.extend_from_slice(&y);
        encoded.push(indicator);
        encoded
    }

    /// Encodes a scalar as a big-endian integer.
    #[must_use]
    pub fn encode_scalar(&self, scalar: &Scalar<C>) -> Vec<u8> {
        scalar.to_repr().to_vec()
    }

    /// Keccak-256 of the encoded value.
    #[must_use]
    pub fn hash_to_bytes(&self, value: &Value<C>) -> HashOutput {
        hash(&self.encode(value))
    }

    /// Keccak-256 of the encoded value, reduced modulo n.
    #[must_use]
    pub fn hash_to_scalar(&self, value: &Value<C>) -> Scalar<C> {
        <Scalar<C> as Reduce<U256>>::reduce(hash_as_int(&self.encode(value)))
    }
}
