//! FPS sampling across the render-loop boundary.
//!
//! Frame statistics can only be read on the thread that owns the render
//! loop. The collector runs elsewhere, so it posts a request to the loop and
//! waits a bounded time for the answer. Without an answer it falls back to
//! the last sample the loop produced, and without a fresh one to nothing.

use devrank_types::models::FpsConfig;
use devrank_types::{CollectionError, FpsSample};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::modules::kv::{self, KeyValueStore, FPS_CACHE};
use crate::utils::clock::Clock;

type SampleRequest = oneshot::Sender<FpsSample>;

/// Pending request queue depth; extra requests fall straight to the cache.
const REQUEST_QUEUE_DEPTH: usize = 8;

/// Render-loop side of the rendezvous. Owned by the render thread.
pub struct RenderLoop {
    requests: mpsc::Receiver<SampleRequest>,
}

/// Collector side of the rendezvous.
#[derive(Clone)]
pub struct RenderLoopHandle {
    requests: mpsc::Sender<SampleRequest>,
}

impl RenderLoop {
    pub fn channel() -> (RenderLoopHandle, RenderLoop) {
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        (RenderLoopHandle { requests: tx }, RenderLoop { requests: rx })
    }

    /// Answer every queued request. Call once per frame; never blocks.
    pub fn serve_pending(&mut self, mut measure: impl FnMut() -> FpsSample) -> usize {
        let mut served = 0;
        while let Ok(reply) = self.requests.try_recv() {
            // Requester may have timed out already
            let _ = reply.send(measure());
            served += 1;
        }
        served
    }

    /// Answer requests until every handle is dropped.
    pub async fn run(mut self, mut measure: impl FnMut() -> FpsSample) {
        while let Some(reply) = self.requests.recv().await {
            let _ = reply.send(measure());
        }
    }
}

/// Obtains an FPS sample for a collection pass.
pub struct FpsSampler {
    render_loop: Option<RenderLoopHandle>,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: FpsConfig,
}

impl FpsSampler {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: FpsConfig) -> Self {
        Self { render_loop: None, kv, clock, config }
    }

    pub fn with_render_loop(mut self, handle: RenderLoopHandle) -> Self {
        self.render_loop = Some(handle);
        self
    }

    /// Store a sample taken on the render loop for later off-loop passes.
    pub async fn record(&self, sample: &FpsSample) {
        if let Err(e) = kv::set_json(self.kv.as_ref(), FPS_CACHE, sample).await {
            tracing::warn!("[FpsSampler] Failed to cache FPS sample: {}", e);
        }
    }

    /// Live sample, else fresh cached sample, else `None`.
    pub async fn sample(&self) -> Option<FpsSample> {
        if let Some(sample) = self.request_live().await {
            self.record(&sample).await;
            return Some(sample);
        }

        match self.cached().await {
            Some(sample) => {
                tracing::debug!("[FpsSampler] Using cached sample ({} fps)", sample.fps);
                Some(sample)
            },
            None => {
                tracing::debug!("[FpsSampler] No live or fresh cached sample, FPS left empty");
                None
            },
        }
    }

    async fn request_live(&self) -> Option<FpsSample> {
        let handle = self.render_loop.as_ref()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        if handle.requests.try_send(reply_tx).is_err() {
            tracing::debug!("[FpsSampler] Render loop unavailable or busy");
            return None;
        }

        let timeout = Duration::from_millis(self.config.render_timeout_ms);
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(sample)) => Some(sample),
            Ok(Err(_)) => {
                tracing::debug!("[FpsSampler] Render loop dropped the request");
                None
            },
            Err(_) => {
                let err =
                    CollectionError::RenderLoopTimeout { timeout_ms: self.config.render_timeout_ms };
                tracing::warn!("[FpsSampler] {}", err);
                None
            },
        }
    }

    async fn cached(&self) -> Option<FpsSample> {
        let sample: FpsSample = match kv::get_json(self.kv.as_ref(), FPS_CACHE).await {
            Ok(Some(sample)) => sample,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[FpsSampler] Failed to read FPS cache: {}", e);
                return None;
            },
        };
        let ttl_ms = i64::try_from(self.config.cache_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        sample.is_fresh(self.clock.now_millis(), ttl_ms).then_some(sample)
    }
}
