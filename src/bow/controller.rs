use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::detector::BowDetector;
use super::loop_worker::detection_loop;
use super::source::{CaptureProvider, EstimatorLoader, FrameOf, VideoCapture};
use super::state::{BowEvent, DetectorSnapshot};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 64;

/// Owns one bow-detection session at a time.
///
/// `start` acquires the camera and estimator and spawns the detection loop;
/// `stop` cancels it and releases the camera. `manual_bow` works whether or
/// not detection is running, which is the fallback when the camera is
/// unavailable.
pub struct BowController<P, L> {
    provider: P,
    loader: L,
    detector: Arc<Mutex<BowDetector>>,
    events: broadcast::Sender<BowEvent>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    session_id: Option<String>,
}

impl<P, L> BowController<P, L>
where
    P: CaptureProvider,
    L: EstimatorLoader<FrameOf<P>>,
{
    pub fn new(provider: P, loader: L) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            loader,
            detector: Arc::new(Mutex::new(BowDetector::new())),
            events,
            handle: None,
            cancel_token: None,
            session_id: None,
        }
    }

    /// Receives `Bowed`, `StateChanged` and `Calibrated` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<BowEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns `false` if the camera or the estimator could not be brought
    /// up; nothing is left running in that case.
    pub async fn start(&mut self) -> bool {
        if self.is_running() {
            return true;
        }

        // A loop that ended on its own still needs joining.
        if let Err(err) = self.stop().await {
            log_warn!("previous detection loop ended badly: {err:#}");
        }

        let mut capture = match self.provider.acquire().await {
            Ok(capture) => capture,
            Err(err) => {
                log_warn!("camera unavailable: {err:#}");
                return false;
            }
        };

        let estimator = match self.loader.load().await {
            Ok(estimator) => estimator,
            Err(err) => {
                log_error!("pose estimator failed to load: {err:#}");
                capture.release();
                return false;
            }
        };

        // Fresh session: new calibration, zero bows.
        *self.detector.lock().await = BowDetector::new();

        let session_id = Uuid::new_v4().to_string();
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(detection_loop(
            session_id.clone(),
            capture,
            estimator,
            Arc::clone(&self.detector),
            self.events.clone(),
            cancel_token.clone(),
        ));

        log_info!("bow detection session {} started", session_id);

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.session_id = Some(session_id);
        true
    }

    /// Cancels the detection loop and waits for it to release the camera.
    /// Calling it when nothing is running is a no-op.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let result = if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("detection loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        };

        if let Some(session_id) = self.session_id.take() {
            log_info!("bow detection session {} stopped", session_id);
        }
        result
    }

    /// Count a bow without the camera. Returns the new count, or `None` if
    /// it fell inside the debounce window.
    pub async fn manual_bow(&self) -> Option<u32> {
        let count = self.detector.lock().await.manual_bow(Instant::now())?;
        let _ = self.events.send(BowEvent::Bowed { count });
        Some(count)
    }

    pub async fn snapshot(&self) -> DetectorSnapshot {
        self.detector.lock().await.snapshot()
    }
}

impl<P, L> Drop for BowController<P, L> {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
