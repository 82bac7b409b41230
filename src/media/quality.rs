use crate::media::transport::{EncodingParameters, MediaTransport, StatsSnapshot};
use log::{debug, warn};
use metrics::increment_counter;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Reference sampling period for the transport health loop.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(1500);

// Degrade and upgrade use distinct thresholds so a stable operating point
// between them cannot oscillate on adjacent ticks.
const DEGRADE_RTT_SECS: f64 = 0.18;
const DEGRADE_LOSS_RATIO: f64 = 0.02;
const DEGRADE_FRAMES_DROPPED: u64 = 5;
const UPGRADE_RTT_SECS: f64 = 0.07;
const UPGRADE_LOSS_RATIO: f64 = 0.002;

const MIN_FPS: u32 = 15;
const MAX_FPS: u32 = 60;
const MIN_BITRATE_BPS: u64 = 250_000;
const MAX_BITRATE_BPS: u64 = 8_000_000;
const MAX_DOWNSCALE: f64 = 4.0;

/// Current encoding targets for the outbound video track. Owned by exactly
/// one controller; only its own decision step mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityState {
    pub resolution_downscale: f64,
    pub target_fps: u32,
    pub target_bitrate_bps: u64,
}

impl Default for QualityState {
    fn default() -> Self {
        Self {
            resolution_downscale: 1.0,
            target_fps: 30,
            target_bitrate_bps: 2_500_000,
        }
    }
}

impl QualityState {
    fn degrade(&mut self) {
        self.resolution_downscale = (self.resolution_downscale * 1.5).min(MAX_DOWNSCALE);
        self.target_fps = (((self.target_fps as f64) * 0.7).floor() as u32).max(MIN_FPS);
        self.target_bitrate_bps =
            (((self.target_bitrate_bps as f64) * 0.6).floor() as u64).max(MIN_BITRATE_BPS);
    }

    fn upgrade(&mut self) {
        self.resolution_downscale = (self.resolution_downscale * 0.8).max(1.0);
        self.target_fps = (((self.target_fps as f64) * 1.15).ceil() as u32).min(MAX_FPS);
        self.target_bitrate_bps =
            (((self.target_bitrate_bps as f64) * 1.25).floor() as u64).min(MAX_BITRATE_BPS);
    }

    pub fn encoding_parameters(&self) -> EncodingParameters {
        EncodingParameters {
            downscale: self.resolution_downscale,
            fps: self.target_fps,
            max_bitrate_bps: self.target_bitrate_bps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Degrade,
    Upgrade,
    Hold,
}

/// Classify one stats snapshot. The arms are mutually exclusive and Degrade
/// wins over Upgrade.
pub fn decide(snapshot: &StatsSnapshot) -> Decision {
    let loss = snapshot.loss_ratio();
    if snapshot.round_trip_time > DEGRADE_RTT_SECS
        || loss > DEGRADE_LOSS_RATIO
        || snapshot.frames_dropped > DEGRADE_FRAMES_DROPPED
    {
        Decision::Degrade
    } else if snapshot.round_trip_time < UPGRADE_RTT_SECS && loss < UPGRADE_LOSS_RATIO {
        Decision::Upgrade
    } else {
        Decision::Hold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Monitoring,
    Stopped,
}

/// Periodic sampler and decision engine for one active session. Reads a
/// transport snapshot every `sample_period` and pushes bounded encoding
/// adjustments back down.
pub struct QualityController {
    transport: Arc<dyn MediaTransport>,
    state: Mutex<QualityState>,
    phase: Mutex<ControllerPhase>,
    sample_period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl QualityController {
    pub fn new(transport: Arc<dyn MediaTransport>, sample_period: Duration) -> Arc<Self> {
        Arc::new(Self {
            transport,
            state: Mutex::new(QualityState::default()),
            phase: Mutex::new(ControllerPhase::Idle),
            sample_period,
            task: Mutex::new(None),
        })
    }

    pub fn phase(&self) -> ControllerPhase {
        *self.phase.lock()
    }

    pub fn state(&self) -> QualityState {
        *self.state.lock()
    }

    /// Begin periodic sampling. Only an Idle controller starts; a stopped one
    /// stays stopped.
    pub fn start(self: &Arc<Self>) {
        {
            let mut phase = self.phase.lock();
            if *phase != ControllerPhase::Idle {
                return;
            }
            *phase = ControllerPhase::Monitoring;
        }

        let controller = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(controller.sample_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The interval's first tick fires immediately; the first real
            // sample belongs one full period after start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                controller.sample_once().await;
            }
        });
        *self.task.lock() = Some(handle);
    }

    /// Cancel sampling. Synchronous with teardown: once this returns, no
    /// sample will reconfigure the transport.
    pub fn stop(&self) {
        *self.phase.lock() = ControllerPhase::Stopped;
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }

    /// One sampling step: snapshot, decide, commit, push. Exposed so the
    /// decision path can be driven without the timer.
    pub async fn sample_once(&self) -> Decision {
        if *self.phase.lock() == ControllerPhase::Stopped {
            return Decision::Hold;
        }

        let snapshot = match self.transport.stats_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Failed to read transport stats: {}", e);
                return Decision::Hold;
            }
        };

        let decision = decide(&snapshot);
        if decision == Decision::Hold {
            return decision;
        }

        // Commit the new state first: a failed transport call below must not
        // roll it back, so the next tick retries from where this one landed.
        let params = {
            let mut state = self.state.lock();
            if decision == Decision::Degrade {
                state.degrade();
            } else {
                state.upgrade();
            }
            state.encoding_parameters()
        };

        debug!(
            "Quality {:?}: downscale {:.2}, fps {}, bitrate {}",
            decision, params.downscale, params.fps, params.max_bitrate_bps
        );
        increment_counter!("paircall_quality_adjustments");

        if *self.phase.lock() == ControllerPhase::Stopped {
            return decision;
        }
        if let Err(e) = self.transport.set_encoding_parameters(params).await {
            warn!("Failed to apply encoding parameters: {}", e);
        }
        decision
    }
}
