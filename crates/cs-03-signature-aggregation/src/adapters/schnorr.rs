//! # Schnorr Aggregator
//!
//! [`SignatureAggregator`] over Ristretto255 Schnorr multi-signatures. Partial
//! commitments, public keys and responses all combine by addition, so a node
//! folds in its children's values in one step regardless of subtree shape.

use rand::rngs::OsRng;
use shared_crypto::{add_points, add_scalars, challenge_scalar, commit, respond, SchnorrKeyPair};
use tracing::trace;

use crate::domain::{AggregationError, Challenge, CollectiveSignature, Commitment, NonceSecret, Response};
use crate::ports::SignatureAggregator;

/// One node's signer, holding its long-term keypair.
pub struct SchnorrAggregator {
    keypair: SchnorrKeyPair,
}

impl SchnorrAggregator {
    pub fn new(keypair: SchnorrKeyPair) -> Self {
        Self { keypair }
    }

    pub fn generate() -> Self {
        Self::new(SchnorrKeyPair::generate(&mut OsRng))
    }

    /// Deterministic signer, for reproducible test networks.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::new(SchnorrKeyPair::from_seed(seed))
    }

    pub fn public_key(&self) -> shared_crypto::PointBytes {
        self.keypair.public_key()
    }
}

impl SignatureAggregator for SchnorrAggregator {
    fn new_contribution(&self) -> (Commitment, NonceSecret) {
        let (secret, point) = commit(&mut OsRng);
        let commitment = Commitment {
            point,
            public_key: self.keypair.public_key(),
        };
        (commitment, NonceSecret(secret))
    }

    fn combine(
        &self,
        own: &Commitment,
        children: &[Commitment],
    ) -> Result<Commitment, AggregationError> {
        let mut points = Vec::with_capacity(children.len() + 1);
        let mut keys = Vec::with_capacity(children.len() + 1);
        points.push(own.point);
        keys.push(own.public_key);
        for child in children {
            points.push(child.point);
            keys.push(child.public_key);
        }
        trace!(parts = points.len(), "Combining commitments");

        Ok(Commitment {
            point: add_points(&points)?,
            public_key: add_points(&keys)?,
        })
    }

    fn challenge(&self, aggregate: &Commitment, message: &[u8]) -> Challenge {
        Challenge(challenge_scalar(&aggregate.point, &aggregate.public_key, message))
    }

    fn respond(&self, challenge: &Challenge, secret: NonceSecret) -> Result<Response, AggregationError> {
        Ok(Response(respond(&self.keypair, secret.0, &challenge.0)?))
    }

    fn combine_responses(
        &self,
        own: &Response,
        children: &[Response],
    ) -> Result<Response, AggregationError> {
        let scalars: Vec<_> = std::iter::once(own.0)
            .chain(children.iter().map(|r| r.0))
            .collect();
        Ok(Response(add_scalars(&scalars)?))
    }

    fn assemble(
        &self,
        aggregate: &Commitment,
        challenge: &Challenge,
        response: &Response,
    ) -> CollectiveSignature {
        CollectiveSignature {
            challenge: *challenge,
            response: *response,
            aggregate_commitment: aggregate.point,
            aggregate_public_key: aggregate.public_key,
        }
    }
}
