//! # Inbound Port
//!
//! The signing capability consumed by the round protocol.
//!
//! | Phase | Call | Flow |
//! |-------|------|------|
//! | Commitment | `new_contribution`, `combine` | bottom-up |
//! | Challenge | `challenge` (root only) | top-down |
//! | Response | `respond`, `combine_responses` | bottom-up |
//! | Broadcast | `assemble` (root only), `verify` | top-down |

use crate::domain::{AggregationError, Challenge, CollectiveSignature, Commitment, NonceSecret, Response};

pub trait SignatureAggregator: Send + Sync {
    /// This node's fresh commitment and the secret needed to answer it.
    fn new_contribution(&self) -> (Commitment, NonceSecret);

    /// Sum a node's own commitment with its children's subtree commitments.
    fn combine(&self, own: &Commitment, children: &[Commitment])
        -> Result<Commitment, AggregationError>;

    /// Challenge binding the aggregate commitment to `message`.
    fn challenge(&self, aggregate: &Commitment, message: &[u8]) -> Challenge;

    fn respond(&self, challenge: &Challenge, secret: NonceSecret) -> Result<Response, AggregationError>;

    fn combine_responses(&self, own: &Response, children: &[Response])
        -> Result<Response, AggregationError>;

    fn assemble(
        &self,
        aggregate: &Commitment,
        challenge: &Challenge,
        response: &Response,
    ) -> CollectiveSignature;

    fn verify(&self, signature: &CollectiveSignature, message: &[u8]) -> Result<(), AggregationError> {
        signature.verify(message)
    }
}
