//! Typed pub/sub event bus.
//!
//! A single bounded FIFO carries every externally published event to a
//! dispatcher task, which fans each event out to the handlers registered for
//! its kind and runs them concurrently on a bounded worker pool. The
//! dispatcher is sequential in event order: it awaits every handler for the
//! current event before pulling the next one off the queue, so sibling
//! handlers for one event run in parallel but events themselves are
//! processed in publication order.
//!
//! A handler may itself publish further events from inside `handle` (the lap
//! segmenter does this to emit a completed lap). Those re-entrant
//! publications go out over a second, unbounded channel that the same
//! dispatcher also drains, rather than the bounded one: if they shared the
//! bounded channel, a handler publishing while the channel was saturated
//! would block waiting for capacity that only the dispatcher's own `recv`
//! can free, while the dispatcher is itself blocked awaiting that same
//! handler — a deadlock. The unbounded side channel always enqueues instead
//! of blocking, which breaks that cycle.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::EventBusError;
use crate::handler::{EventHandler, HandlerContext};

/// A value that can travel on the bus.
///
/// `Kind` is the statically typed discriminant used for subscription:
/// handlers register for a `Kind` and only ever receive events whose
/// `kind()` matches.
pub trait EventLike: Clone + Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + std::fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}

/// Bus tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct EventBusConfig {
    /// Capacity of the bounded FIFO. Publishers block once it's full.
    pub channel_capacity: usize,
    /// Size of the worker pool that runs handlers concurrently.
    pub worker_pool_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .max(2);
        Self {
            channel_capacity: 1000,
            worker_pool_size: workers,
        }
    }
}

type HandlerMap<E> = HashMap<<E as EventLike>::Kind, Vec<Arc<dyn EventHandler<E>>>>;

struct Inner<E: EventLike> {
    config: EventBusConfig,
    handlers: RwLock<HandlerMap<E>>,
    tx: mpsc::Sender<E>,
    rx: Mutex<Option<mpsc::Receiver<E>>>,
    /// Unbounded side channel for events a handler publishes from within
    /// `handle`. Never blocks the publishing handler; see the module doc.
    republish_tx: mpsc::UnboundedSender<E>,
    republish_rx: Mutex<Option<mpsc::UnboundedReceiver<E>>>,
    running: Arc<AtomicBool>,
    dropped_events: Arc<AtomicU64>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

/// The event bus. Cheap to clone: all state lives behind an `Arc`.
pub struct EventBus<E: EventLike> {
    inner: Arc<Inner<E>>,
}

impl<E: EventLike> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Handle producers use to publish events. Cloneable, sendable to any thread.
#[derive(Clone)]
pub struct EventPublisher<E: EventLike> {
    tx: mpsc::Sender<E>,
    running: Arc<AtomicBool>,
    dropped_events: Arc<AtomicU64>,
}

impl<E: EventLike> EventPublisher<E> {
    /// Enqueue an event. Suspends the caller if the queue is full.
    pub async fn publish(&self, event: E) -> Result<(), EventBusError> {
        if !self.running.load(Ordering::Acquire) {
            return Err(EventBusError::NotRunning);
        }
        self.tx
            .send(event)
            .await
            .map_err(|_| EventBusError::ChannelClosed)
    }

    /// Enqueue an event from a synchronous (non-async) context.
    ///
    /// Blocks the calling thread if the queue is full. Must not be called
    /// from within a Tokio worker thread — use `publish` there instead.
    pub fn thread_safe_publish(&self, event: E) -> Result<(), EventBusError> {
        if !self.running.load(Ordering::Acquire) {
            return Err(EventBusError::NotRunning);
        }
        self.tx
            .blocking_send(event)
            .map_err(|_| EventBusError::ChannelClosed)
    }

    /// Events dropped due to queue overflow. Always zero under the current
    /// blocking-backpressure policy; kept for observability and for a future
    /// drop-oldest policy.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }
}

impl<E: EventLike> EventBus<E> {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let (republish_tx, republish_rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                config,
                handlers: RwLock::new(HashMap::new()),
                tx,
                rx: Mutex::new(Some(rx)),
                republish_tx,
                republish_rx: Mutex::new(Some(republish_rx)),
                running: Arc::new(AtomicBool::new(false)),
                dropped_events: Arc::new(AtomicU64::new(0)),
                dispatcher: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// A handle producers can use to publish events.
    pub fn publisher(&self) -> EventPublisher<E> {
        EventPublisher {
            tx: self.inner.tx.clone(),
            running: self.running_flag(),
            dropped_events: self.inner.dropped_events.clone(),
        }
    }

    /// Register a handler for one event kind. Idempotent: registering the
    /// same `Arc` for the same kind twice is a no-op.
    pub async fn subscribe(&self, kind: E::Kind, handler: Arc<dyn EventHandler<E>>) {
        let mut handlers = self.inner.handlers.write().await;
        let bucket = handlers.entry(kind).or_default();
        if !bucket.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            info!(?kind, handler = handler.name(), "handler registered");
            bucket.push(handler);
        }
    }

    /// Remove a handler for one event kind, if present.
    pub async fn unsubscribe(&self, kind: E::Kind, handler: &Arc<dyn EventHandler<E>>) {
        let mut handlers = self.inner.handlers.write().await;
        if let Some(bucket) = handlers.get_mut(&kind) {
            bucket.retain(|h| !Arc::ptr_eq(h, handler));
        }
    }

    /// Register a single handler for one event kind.
    pub async fn register_handler(&self, kind: E::Kind, handler: Arc<dyn EventHandler<E>>) {
        self.subscribe(kind, handler).await;
    }

    /// Batch-register several `(kind, handler)` pairs.
    pub async fn register_handlers(
        &self,
        registrations: Vec<(E::Kind, Arc<dyn EventHandler<E>>)>,
    ) {
        for (kind, handler) in registrations {
            self.subscribe(kind, handler).await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    fn running_flag(&self) -> Arc<AtomicBool> {
        self.inner.running.clone()
    }

    /// Start the dispatcher. Idempotent.
    pub async fn start(&self) -> Result<(), EventBusError> {
        if self.inner.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let rx = self
            .inner
            .rx
            .lock()
            .await
            .take()
            .expect("dispatcher receiver taken twice");
        let republish_rx = self
            .inner
            .republish_rx
            .lock()
            .await
            .take()
            .expect("dispatcher republish receiver taken twice");

        let bus = self.clone();
        let handle = tokio::spawn(async move { bus.dispatch_loop(rx, republish_rx).await });
        *self.inner.dispatcher.lock().await = Some(handle);
        info!("event bus started");
        Ok(())
    }

    /// Stop accepting new events and wait for in-flight handlers to finish.
    /// Queued-but-unprocessed events are dropped. Idempotent.
    pub async fn stop(&self) {
        if !self.inner.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.inner.shutdown.cancel();
        if let Some(handle) = self.inner.dispatcher.lock().await.take() {
            if let Err(e) = handle.await {
                warn!("dispatcher task join failed during stop: {e}");
            }
        }
        info!("event bus stopped");
    }

    async fn dispatch_loop(
        &self,
        mut rx: mpsc::Receiver<E>,
        mut republish_rx: mpsc::UnboundedReceiver<E>,
    ) {
        loop {
            let event = tokio::select! {
                _ = self.inner.shutdown.cancelled() => {
                    debug!("dispatcher shutting down, draining in-flight work");
                    break;
                }
                event = republish_rx.recv() => match event {
                    Some(event) => event,
                    None => {
                        warn!("republish channel closed unexpectedly");
                        break;
                    }
                },
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let kind = event.kind();
            let handlers = {
                let guard = self.inner.handlers.read().await;
                guard.get(&kind).cloned().unwrap_or_default()
            };
            if handlers.is_empty() {
                continue;
            }

            let semaphore = Arc::new(Semaphore::new(self.inner.config.worker_pool_size));
            let ctx = HandlerContext::new(self.inner.republish_tx.clone());
            let mut join_set = tokio::task::JoinSet::new();

            for handler in handlers {
                let event = event.clone();
                let ctx = ctx.clone();
                let semaphore = semaphore.clone();
                let kind_for_log = kind;
                join_set.spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    let name = handler.name();
                    if let Err(e) = handler.handle(&event, &ctx).await {
                        error!(handler = name, kind = ?kind_for_log, error = %e, "handler failed");
                    }
                });
            }

            while let Some(result) = join_set.join_next().await {
                if let Err(e) = result {
                    error!("handler task panicked: {e}");
                }
            }
        }
    }
}

impl<E: EventLike> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
