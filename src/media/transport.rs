use crate::utils::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque session description exchanged during offer/answer negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDescription(pub Value);

/// Opaque network-path descriptor for one viable peer-to-peer route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidate(pub Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Outbound-video statistics for one sampling window.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSnapshot {
    /// Round-trip time between the endpoints, in seconds.
    pub round_trip_time: f64,
    pub packets_sent: u64,
    pub packets_lost: u64,
    pub frames_dropped: u64,
}

impl StatsSnapshot {
    pub fn loss_ratio(&self) -> f64 {
        self.packets_lost as f64 / self.packets_sent.max(1) as f64
    }
}

/// Per-track encoding constraints pushed down after a quality decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingParameters {
    pub downscale: f64,
    pub fps: u32,
    pub max_bitrate_bps: u64,
}

/// Capability interface over the actual peer-to-peer media channel. The crate
/// only issues configuration commands and reads statistics through it; it
/// never owns or implements the media path itself.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;
    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;
    async fn stats_snapshot(&self) -> Result<StatsSnapshot>;
    async fn set_encoding_parameters(&self, params: EncodingParameters) -> Result<()>;
    fn connectivity_state(&self) -> ConnectivityState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_ratio_never_divides_by_zero() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.loss_ratio(), 0.0);

        let snapshot = StatsSnapshot {
            packets_sent: 0,
            packets_lost: 3,
            ..Default::default()
        };
        assert_eq!(snapshot.loss_ratio(), 3.0);

        let snapshot = StatsSnapshot {
            packets_sent: 1000,
            packets_lost: 10,
            ..Default::default()
        };
        assert!((snapshot.loss_ratio() - 0.01).abs() < f64::EPSILON);
    }
}
