use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tokio_util::sync::CancellationToken;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::util::BoxCloneSyncService;
use tower::{BoxError, Service, ServiceBuilder};
use uuid::Uuid;

use crate::common::SharedPixelGrid;
use crate::error::ScanError;
use crate::pipeline::context::{CategorizedImage, ScanMetrics};
use crate::pipeline::services::image::ImageScanner;

pub type BoxScanService = BoxCloneSyncService<ScanRequest, ScanResponse, BoxError>;

pub struct ScanRequest {
    pub id: Uuid,
    pub grid: SharedPixelGrid,
}

impl ScanRequest {
    pub fn new(grid: SharedPixelGrid) -> Self {
        Self {
            id: Uuid::new_v4(),
            grid,
        }
    }
}

#[derive(Debug)]
pub struct ScanResponse {
    pub id: Uuid,
    pub image: CategorizedImage,
    pub metrics: ScanMetrics,
}

/// Runs the scanner on tokio's blocking pool so CPU-heavy scans never stall
/// the runtime.
#[derive(Clone)]
pub struct ScanService {
    scanner: Arc<ImageScanner>,
    cancel_token: CancellationToken,
}

impl ScanService {
    pub fn new(scanner: ImageScanner, cancel_token: CancellationToken) -> Self {
        Self {
            scanner: Arc::new(scanner),
            cancel_token,
        }
    }

    pub fn builder(scanner: ImageScanner) -> ScanServiceBuilder {
        ScanServiceBuilder {
            scanner,
            cancel_token: CancellationToken::new(),
            timeout: None,
        }
    }
}

impl Service<ScanRequest> for ScanService {
    type Response = ScanResponse;
    type Error = ScanError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), ScanError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ScanRequest) -> Self::Future {
        let scanner = self.scanner.clone();
        // Dropping the future (e.g. on timeout) stops the worker at its next batch.
        let scan_token = self.cancel_token.child_token();
        let drop_guard = scan_token.clone().drop_guard();

        Box::pin(async move {
            let _drop_guard = drop_guard;
            let ScanRequest { id, grid } = request;
            let (image, metrics) = tokio::task::spawn_blocking(move || {
                scanner.try_scan_with_metrics(&*grid, &scan_token)
            })
            .await
            .map_err(|e| ScanError::WorkerFailed(e.to_string()))??;

            Ok(ScanResponse { id, image, metrics })
        })
    }
}

pub struct ScanServiceBuilder {
    scanner: ImageScanner,
    cancel_token: CancellationToken,
    timeout: Option<Duration>,
}

impl ScanServiceBuilder {
    pub fn cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> BoxScanService {
        let service = ServiceBuilder::new()
            .option_layer(self.timeout.map(TimeoutLayer::new))
            .map_err(|e: ScanError| -> BoxError { Box::new(e) })
            .service(ScanService::new(self.scanner, self.cancel_token));

        BoxCloneSyncService::new(service)
    }
}

/// Recovers the typed error from a boxed service error.
pub fn into_scan_error(error: BoxError) -> ScanError {
    match error.downcast::<ScanError>() {
        Ok(e) => *e,
        Err(error) if error.is::<Elapsed>() => ScanError::Timeout,
        Err(error) => ScanError::WorkerFailed(error.to_string()),
    }
}
