use crate::media::transport::{IceCandidate, MediaTransport};
use log::{debug, warn};

/// Buffers inbound network-path candidates that arrive before the session's
/// remote description is known. Candidates are applied in arrival order,
/// exactly once each; they are only ever discarded by flush or teardown.
#[derive(Debug, Default)]
pub struct IceCandidateQueue {
    pending: Vec<IceCandidate>,
}

impl IceCandidateQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, candidate: IceCandidate) {
        self.pending.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Drain every queued candidate into the transport, preserving arrival
    /// order. One candidate failing at the transport boundary is logged and
    /// does not abort the rest. Returns how many were applied.
    pub async fn flush(&mut self, transport: &dyn MediaTransport) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let total = pending.len();
        let mut applied = 0;

        for candidate in pending {
            match transport.add_ice_candidate(candidate).await {
                Ok(()) => applied += 1,
                Err(e) => warn!("Transport rejected queued candidate: {}", e),
            }
        }

        if total > 0 {
            debug!("Flushed {}/{} queued candidates", applied, total);
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::testing::FakeTransport;
    use serde_json::json;

    fn candidate(tag: &str) -> IceCandidate {
        IceCandidate(json!(tag))
    }

    #[test]
    fn flush_applies_in_arrival_order_exactly_once() {
        tokio_test::block_on(async {
            let transport = FakeTransport::new();
            let mut queue = IceCandidateQueue::new();
            queue.push(candidate("c1"));
            queue.push(candidate("c2"));
            queue.push(candidate("c3"));

            let applied = queue.flush(&transport).await;
            assert_eq!(applied, 3);
            assert_eq!(
                transport.applied_candidates(),
                vec![candidate("c1"), candidate("c2"), candidate("c3")]
            );
            assert!(queue.is_empty());

            // A second flush must not re-apply anything.
            let applied = queue.flush(&transport).await;
            assert_eq!(applied, 0);
            assert_eq!(transport.applied_candidates().len(), 3);
        });
    }

    #[test]
    fn one_rejected_candidate_does_not_abort_the_flush() {
        tokio_test::block_on(async {
            let transport = FakeTransport::new();
            transport.reject_candidate("c2");

            let mut queue = IceCandidateQueue::new();
            queue.push(candidate("c1"));
            queue.push(candidate("c2"));
            queue.push(candidate("c3"));

            let applied = queue.flush(&transport).await;
            assert_eq!(applied, 2);
            assert_eq!(
                transport.applied_candidates(),
                vec![candidate("c1"), candidate("c3")]
            );
            assert!(queue.is_empty());
        });
    }
}
