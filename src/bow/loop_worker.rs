use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::detector::BowDetector;
use super::source::{LandmarkEstimator, VideoCapture};
use super::state::BowEvent;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

// Import the logging macros (exported at crate root)
use crate::{log_debug, log_info, log_warn};

/// Pull frames until cancelled or the stream ends, feeding nose positions to
/// the detector. Frames without a usable landmark are skipped. The capture is
/// released on every exit path.
pub async fn detection_loop<C, E>(
    session_id: String,
    mut capture: C,
    mut estimator: E,
    detector: Arc<Mutex<BowDetector>>,
    events: broadcast::Sender<BowEvent>,
    cancel_token: CancellationToken,
) where
    C: VideoCapture,
    E: LandmarkEstimator<C::Frame>,
{
    let mut frames: u64 = 0;
    let mut misses: u64 = 0;

    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("detection loop shutting down for session {}", session_id);
                break;
            }
            frame = capture.next_frame() => frame,
        };

        let Some(frame) = frame else {
            log_warn!("capture stream ended for session {}", session_id);
            break;
        };
        frames += 1;

        let now = Instant::now();
        let nose_y = match estimator.estimate(&frame, now) {
            Ok(landmarks) => landmarks.and_then(|pose| pose.nose().map(|nose| nose.y)),
            Err(err) => {
                log_debug!("pose estimation failed on frame {}: {err:#}", frames);
                None
            }
        };

        let Some(nose_y) = nose_y else {
            misses += 1;
            continue;
        };

        let emitted = detector.lock().await.process_sample(nose_y, now);
        for event in emitted {
            // no subscribers is fine
            let _ = events.send(event);
        }
    }

    capture.release();
    log_info!(
        "session {} processed {} frames ({} without a landmark)",
        session_id,
        frames,
        misses
    );
}
