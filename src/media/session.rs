use crate::media::quality::{QualityController, SAMPLE_PERIOD};
use crate::media::queue::IceCandidateQueue;
use crate::media::transport::{
    ConnectivityState, IceCandidate, MediaTransport, SessionDescription,
};
use crate::room::Role;
use crate::utils::Result;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Where the session stands in offer/answer negotiation. Candidates arriving
/// in the first phase are buffered, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    AwaitingRemoteDescription,
    RemoteDescriptionSet,
}

/// Explicit per-session state for one end of a call: the fixed negotiation
/// role, the negotiation phase, the candidate buffer, and (once the media
/// path is up) the quality controller bound to this session's lifetime.
pub struct CallSession {
    role: Role,
    phase: NegotiationPhase,
    queue: IceCandidateQueue,
    transport: Arc<dyn MediaTransport>,
    quality: Option<Arc<QualityController>>,
    sample_period: Duration,
}

impl CallSession {
    pub fn new(role: Role, transport: Arc<dyn MediaTransport>) -> Self {
        Self::with_sample_period(role, transport, SAMPLE_PERIOD)
    }

    pub fn with_sample_period(
        role: Role,
        transport: Arc<dyn MediaTransport>,
        sample_period: Duration,
    ) -> Self {
        Self {
            role,
            phase: NegotiationPhase::AwaitingRemoteDescription,
            queue: IceCandidateQueue::new(),
            transport,
            quality: None,
            sample_period,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn pending_candidates(&self) -> usize {
        self.queue.len()
    }

    pub fn quality(&self) -> Option<&Arc<QualityController>> {
        self.quality.as_ref()
    }

    pub async fn apply_local_description(&mut self, desc: SessionDescription) -> Result<()> {
        self.transport.set_local_description(desc).await
    }

    /// Apply the peer's description and flush everything that queued up while
    /// we waited for it. The flush happens exactly once, right here.
    pub async fn apply_remote_description(&mut self, desc: SessionDescription) -> Result<()> {
        self.transport.set_remote_description(desc).await?;
        self.phase = NegotiationPhase::RemoteDescriptionSet;
        self.queue.flush(self.transport.as_ref()).await;
        Ok(())
    }

    /// Queue-or-apply for an inbound candidate, depending on whether the
    /// remote description is known yet.
    pub async fn handle_remote_candidate(&mut self, candidate: IceCandidate) {
        match self.phase {
            NegotiationPhase::AwaitingRemoteDescription => {
                debug!("Remote description not set yet, queueing candidate");
                self.queue.push(candidate);
            }
            NegotiationPhase::RemoteDescriptionSet => {
                if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                    warn!("Transport rejected candidate: {}", e);
                }
            }
        }
    }

    /// Start quality monitoring once the transport reports an established
    /// path. Returns whether a controller was started by this call.
    pub fn begin_monitoring(&mut self) -> bool {
        if self.quality.is_some() {
            return false;
        }
        if self.transport.connectivity_state() != ConnectivityState::Connected {
            return false;
        }
        let controller = QualityController::new(self.transport.clone(), self.sample_period);
        controller.start();
        self.quality = Some(controller);
        true
    }

    /// Tear the session down: cancel the sampler before anything else so no
    /// late tick reconfigures a dying transport, then drop queued candidates.
    pub fn teardown(&mut self) {
        if let Some(controller) = self.quality.take() {
            controller.stop();
        }
        self.queue.clear();
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
