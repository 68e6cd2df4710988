//! Backend resolution and forwarding.
//!
//! Every proxy route hands its operation to [`Forwarder`], which walks the
//! configured [`BackendCandidates`] in order and relays the first
//! authoritative answer.

pub mod candidates;
pub mod forwarder;

pub use candidates::{BackendBase, BackendCandidates, Target};
pub use forwarder::{
    remediation_hint, ForwardBody, ForwardOutcome, ForwardRequest, Forwarder, UpstreamResponse,
    PROXY_HOP_HEADER,
};
