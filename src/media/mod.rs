pub mod quality;
pub mod queue;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use quality::{ControllerPhase, Decision, QualityController, QualityState, SAMPLE_PERIOD};
pub use queue::IceCandidateQueue;
pub use session::{CallSession, NegotiationPhase};
pub use transport::{
    ConnectivityState, EncodingParameters, IceCandidate, MediaTransport, SessionDescription,
    StatsSnapshot,
};
