//! # Schnorr Collective Signatures (Ristretto255)
//!
//! Each signer `i` holds a secret `x_i` with public key `X_i = x_i·G`.
//! One signing round runs:
//!
//! ```text
//! commit:     v_i random,  V_i = v_i·G           (per signer)
//! aggregate:  V = Σ V_i,   X = Σ X_i              (bottom-up)
//! challenge:  c = H(V || X || m)                  (root only)
//! respond:    r_i = v_i - c·x_i                   (per signer)
//! aggregate:  r = Σ r_i                           (bottom-up)
//! verify:     V == r·G + c·X  and  c == H(V || X || m)
//! ```
//!
//! Because every partial combines by addition, the aggregation order and the
//! tree shape do not affect the final signature.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// Domain tag mixed into every challenge hash.
const CHALLENGE_DOMAIN: &[u8] = b"collective-stamp/schnorr-challenge/v1";

/// Compressed Ristretto point (commitment or public key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointBytes(pub [u8; 32]);

impl PointBytes {
    /// Encoding of the group identity (neutral element for aggregation).
    pub fn identity() -> Self {
        Self(RistrettoPoint::identity().compress().to_bytes())
    }

    fn decompress(&self) -> Result<RistrettoPoint, CryptoError> {
        CompressedRistretto(self.0)
            .decompress()
            .ok_or(CryptoError::InvalidPoint)
    }

    fn from_point(point: &RistrettoPoint) -> Self {
        Self(point.compress().to_bytes())
    }
}

/// Canonically encoded scalar (challenge or response).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarBytes(pub [u8; 32]);

impl ScalarBytes {
    /// Encoding of zero (neutral element for aggregation).
    pub fn zero() -> Self {
        Self(Scalar::ZERO.to_bytes())
    }

    fn to_scalar(self) -> Result<Scalar, CryptoError> {
        Option::<Scalar>::from(Scalar::from_canonical_bytes(self.0)).ok_or(CryptoError::InvalidScalar)
    }
}

/// Long-term signing key of one tree node.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SchnorrKeyPair {
    secret: Scalar,
    #[zeroize(skip)]
    public: RistrettoPoint,
}

impl SchnorrKeyPair {
    /// Generate a random keypair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_secret(random_scalar(rng))
    }

    /// Deterministic keypair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_secret(wide_hash(&[b"collective-stamp/keygen/v1", &seed]))
    }

    fn from_secret(secret: Scalar) -> Self {
        let public = RistrettoPoint::mul_base(&secret);
        Self { secret, public }
    }

    /// Compressed public key.
    pub fn public_key(&self) -> PointBytes {
        PointBytes::from_point(&self.public)
    }
}

/// Per-round nonce `v_i`. Consumed by [`respond`], zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CommitmentSecret(Scalar);

impl std::fmt::Debug for CommitmentSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommitmentSecret(..)")
    }
}

/// Draw a fresh nonce and its public commitment `V_i = v_i·G`.
pub fn commit<R: RngCore + CryptoRng>(rng: &mut R) -> (CommitmentSecret, PointBytes) {
    let v = random_scalar(rng);
    let point = PointBytes::from_point(&RistrettoPoint::mul_base(&v));
    (CommitmentSecret(v), point)
}

/// `c = H(V || X || m)` reduced to a scalar.
pub fn challenge_scalar(
    aggregate_commitment: &PointBytes,
    aggregate_public_key: &PointBytes,
    message: &[u8],
) -> ScalarBytes {
    let c = wide_hash(&[
        CHALLENGE_DOMAIN,
        &aggregate_commitment.0,
        &aggregate_public_key.0,
        message,
    ]);
    ScalarBytes(c.to_bytes())
}

/// Partial response `r_i = v_i - c·x_i`.
pub fn respond(
    keypair: &SchnorrKeyPair,
    secret: CommitmentSecret,
    challenge: &ScalarBytes,
) -> Result<ScalarBytes, CryptoError> {
    let c = challenge.to_scalar()?;
    let r = secret.0 - c * keypair.secret;
    Ok(ScalarBytes(r.to_bytes()))
}

/// Sum of group elements. Empty input yields the identity.
pub fn add_points(points: &[PointBytes]) -> Result<PointBytes, CryptoError> {
    let decoded = points
        .iter()
        .map(PointBytes::decompress)
        .collect::<Result<Vec<_>, _>>()?;
    let sum: RistrettoPoint = decoded.iter().sum();
    Ok(PointBytes::from_point(&sum))
}

/// Sum of scalars. Empty input yields zero.
pub fn add_scalars(scalars: &[ScalarBytes]) -> Result<ScalarBytes, CryptoError> {
    let decoded = scalars
        .iter()
        .map(|s| s.to_scalar())
        .collect::<Result<Vec<_>, _>>()?;
    let sum: Scalar = decoded.iter().sum();
    Ok(ScalarBytes(sum.to_bytes()))
}

/// Verify a collective signature over `message`.
pub fn verify_collective(
    challenge: &ScalarBytes,
    response: &ScalarBytes,
    aggregate_commitment: &PointBytes,
    aggregate_public_key: &PointBytes,
    message: &[u8],
) -> Result<(), CryptoError> {
    let expected = challenge_scalar(aggregate_commitment, aggregate_public_key, message);
    if expected != *challenge {
        return Err(CryptoError::ChallengeMismatch);
    }

    let c = challenge.to_scalar()?;
    let r = response.to_scalar()?;
    let v = aggregate_commitment.decompress()?;
    let x = aggregate_public_key.decompress()?;

    if RistrettoPoint::mul_base(&r) + c * x == v {
        Ok(())
    } else {
        Err(CryptoError::SignatureVerificationFailed)
    }
}

fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut wide = [0u8; 64];
    rng.fill_bytes(&mut wide);
    let s = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    s
}

fn wide_hash(parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}
