//! Background OCR worker
//!
//! Recognition runs on its own thread so a slow OCR call never blocks the
//! event loop. Requests and responses carry the document epoch they were
//! issued under; the event loop drops responses whose epoch is no longer
//! current, so a recognition that outlives its document cannot act on the
//! surfaces that replaced it.

use flume::{Receiver, Sender};
use log::debug;

use super::{OcrEngine, OcrError};
use crate::surface::RgbBitmap;

#[derive(Debug)]
pub struct OcrRequest {
    pub epoch: u64,
    pub region: RgbBitmap,
}

#[derive(Debug)]
pub struct OcrResponse {
    pub epoch: u64,
    pub result: Result<String, OcrError>,
}

/// Handle to the OCR worker thread
pub struct OcrService {
    request_tx: Sender<OcrRequest>,
    response_rx: Receiver<OcrResponse>,
}

impl OcrService {
    /// Spawn the worker thread around an engine.
    ///
    /// The thread exits when the service (and with it the request sender)
    /// is dropped.
    #[must_use]
    pub fn spawn(engine: Box<dyn OcrEngine>) -> Self {
        let (request_tx, request_rx) = flume::unbounded::<OcrRequest>();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            for request in request_rx.iter() {
                debug!(
                    "recognizing {}x{} region (epoch {})",
                    request.region.width, request.region.height, request.epoch
                );
                let result = engine.recognize(&request.region);
                if response_tx
                    .send(OcrResponse {
                        epoch: request.epoch,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            request_tx,
            response_rx,
        }
    }

    /// Queue a region for recognition
    pub fn submit(&self, request: OcrRequest) {
        // The worker outlives the service; a send can only fail at shutdown
        let _ = self.request_tx.send(request);
    }

    /// Non-blocking poll for a finished recognition
    #[must_use]
    pub fn try_recv(&self) -> Option<OcrResponse> {
        self.response_rx.try_recv().ok()
    }

    /// Blocking poll with a timeout, used by tests
    #[must_use]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<OcrResponse> {
        self.response_rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FixedText(&'static str);

    impl OcrEngine for FixedText {
        fn recognize(&self, _region: &RgbBitmap) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct AlwaysFails;

    impl OcrEngine for AlwaysFails {
        fn recognize(&self, _region: &RgbBitmap) -> Result<String, OcrError> {
            Err(OcrError::Engine("boom".into()))
        }
    }

    #[test]
    fn responses_carry_request_epoch() {
        let service = OcrService::spawn(Box::new(FixedText("hello")));
        service.submit(OcrRequest {
            epoch: 7,
            region: RgbBitmap::new(4, 4),
        });

        let response = service
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should respond");
        assert_eq!(response.epoch, 7);
        assert_eq!(response.result.unwrap(), "hello");
    }

    #[test]
    fn engine_failure_is_reported_not_dropped() {
        let service = OcrService::spawn(Box::new(AlwaysFails));
        service.submit(OcrRequest {
            epoch: 1,
            region: RgbBitmap::new(4, 4),
        });

        let response = service
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should respond");
        assert!(response.result.is_err());
    }
}
