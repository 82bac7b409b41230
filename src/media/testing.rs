use crate::media::transport::{
    ConnectivityState, EncodingParameters, IceCandidate, MediaTransport, SessionDescription,
    StatsSnapshot,
};
use crate::utils::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Default)]
struct FakeTransportState {
    remote_description: Option<SessionDescription>,
    local_description: Option<SessionDescription>,
    applied_candidates: Vec<IceCandidate>,
    encoding_calls: Vec<EncodingParameters>,
    stats: StatsSnapshot,
    connectivity: ConnectivityState,
    reject_candidates: HashSet<String>,
    reject_descriptions: bool,
    reject_encoding: bool,
}

/// Recording stand-in for the real media path. Tests script its stats and
/// failure behavior and then assert on the calls the core issued.
#[derive(Default)]
pub struct FakeTransport {
    state: Mutex<FakeTransportState>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stats(&self, stats: StatsSnapshot) {
        self.state.lock().stats = stats;
    }

    pub fn set_connectivity(&self, connectivity: ConnectivityState) {
        self.state.lock().connectivity = connectivity;
    }

    /// Make `add_ice_candidate` fail for the candidate whose payload equals
    /// the given JSON string tag.
    pub fn reject_candidate(&self, tag: &str) {
        self.state.lock().reject_candidates.insert(tag.to_string());
    }

    pub fn reject_descriptions(&self, reject: bool) {
        self.state.lock().reject_descriptions = reject;
    }

    pub fn reject_encoding(&self, reject: bool) {
        self.state.lock().reject_encoding = reject;
    }

    pub fn remote_description(&self) -> Option<SessionDescription> {
        self.state.lock().remote_description.clone()
    }

    pub fn local_description(&self) -> Option<SessionDescription> {
        self.state.lock().local_description.clone()
    }

    pub fn applied_candidates(&self) -> Vec<IceCandidate> {
        self.state.lock().applied_candidates.clone()
    }

    pub fn encoding_calls(&self) -> Vec<EncodingParameters> {
        self.state.lock().encoding_calls.clone()
    }
}

#[async_trait]
impl MediaTransport for FakeTransport {
    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_descriptions {
            return Err(Error::Transport("remote description rejected".to_string()));
        }
        state.remote_description = Some(desc);
        Ok(())
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_descriptions {
            return Err(Error::Transport("local description rejected".to_string()));
        }
        state.local_description = Some(desc);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(tag) = candidate.0.as_str() {
            if state.reject_candidates.contains(tag) {
                return Err(Error::Transport(format!("candidate {} rejected", tag)));
            }
        }
        state.applied_candidates.push(candidate);
        Ok(())
    }

    async fn stats_snapshot(&self) -> Result<StatsSnapshot> {
        Ok(self.state.lock().stats)
    }

    async fn set_encoding_parameters(&self, params: EncodingParameters) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_encoding {
            return Err(Error::Transport("encoding parameters rejected".to_string()));
        }
        state.encoding_calls.push(params);
        Ok(())
    }

    fn connectivity_state(&self) -> ConnectivityState {
        self.state.lock().connectivity
    }
}
