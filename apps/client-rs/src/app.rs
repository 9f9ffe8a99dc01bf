//! Main application orchestrator for Racing Coach Client.
//!
//! Coordinates telemetry collection, event handling, and server communication.

use std::sync::Arc;

use eventbus::{EventBus, EventBusConfig, EventHandler};
use racing_coach_core::model::{Event, EventKind};
use racing_coach_core::SessionRegistry;
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::RacingCoachClient;
use crate::config::Config;
use crate::handlers::{
    LapArchiveHandler, LapHandler, LapUploadHandler, MetricsHandler, MetricsUploadHandler, SessionRegistryHandler,
};
use crate::telemetry::{TelemetryCollector, TelemetrySourceConfig};

/// Racing Coach Client application
pub struct RacingCoachApp {
    config: Config,
    event_bus: Arc<EventBus<Event>>,
    session_registry: Arc<SessionRegistry>,
    api_client: Arc<RacingCoachClient>,
    cancel: CancellationToken,
    shutdown_tx: watch::Sender<bool>,
}

impl RacingCoachApp {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        let event_bus = Arc::new(EventBus::with_config(EventBusConfig {
            channel_capacity: 100_000,
            worker_pool_size: 8,
        }));

        let api_client = Arc::new(RacingCoachClient::new(&config.server_url));

        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            event_bus,
            session_registry: Arc::new(SessionRegistry::new()),
            api_client,
            cancel: CancellationToken::new(),
            shutdown_tx,
        }
    }

    /// Run the application
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting Racing Coach Client");
        info!("Mode: {:?}", self.config.mode);

        if let Some(ref file) = self.config.replay_file_path {
            info!("Replay file: {}", file.display());
        }
        info!("Server: {}", self.config.server_url);
        info!("Upload enabled: {}", self.config.upload_enabled);

        // Check server health
        self.check_server_health().await;

        // Register handlers
        let registered = self.register_handlers().await;
        info!("Registered {} handlers", registered);

        self.event_bus.start().await?;

        // Create telemetry collector
        let source_config = TelemetrySourceConfig {
            mode: self.config.mode,
            replay_file_path: self.config.replay_file_path.clone(),
            replay_speed: self.config.replay_speed,
            replay_loop: self.config.replay_loop,
        };

        let collector = TelemetryCollector::new(source_config);
        let collector_cancel = collector.cancel_token();

        let publisher = self.event_bus.publisher();
        let collector_handle = tokio::spawn(async move {
            if let Err(e) = collector.run(publisher).await {
                error!("Collector error: {}", e);
            }
        });

        // Wait for shutdown signal or completion
        let shutdown_reason = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                "user interrupt"
            }
            _ = self.cancel.cancelled() => {
                info!("Shutdown requested");
                "shutdown requested"
            }
            result = collector_handle => {
                match result {
                    Ok(()) => {
                        info!("Telemetry collection complete");
                        "collection complete"
                    }
                    Err(e) => {
                        error!("Collector task panicked: {}", e);
                        "collector error"
                    }
                }
            }
        };

        // Graceful shutdown
        info!("Initiating shutdown (reason: {})", shutdown_reason);

        collector_cancel.cancel();
        self.event_bus.stop().await;

        let _ = self.shutdown_tx.send(true);

        info!("Racing Coach Client shutdown complete");
        Ok(())
    }

    /// Check server health before starting
    async fn check_server_health(&self) {
        info!("Checking server health...");

        match self.api_client.health_check().await {
            Ok(response) => {
                info!("Server is healthy: {}", response.status);
            }
            Err(e) => {
                warn!("Server health check failed: {}", e);
                if self.config.upload_enabled {
                    warn!("Uploads may fail - server might be unavailable");
                }
            }
        }
    }

    /// Register all event handlers against the bus and return how many were wired.
    async fn register_handlers(&self) -> usize {
        let mut count = 0;

        let session_handler: Arc<dyn EventHandler<Event>> =
            Arc::new(SessionRegistryHandler::new(self.session_registry.clone()));
        self.event_bus
            .subscribe(EventKind::SessionStart, session_handler.clone())
            .await;
        self.event_bus
            .subscribe(EventKind::SessionEnd, session_handler)
            .await;
        count += 1;

        let lap_handler: Arc<dyn EventHandler<Event>> = Arc::new(LapHandler::with_config(
            crate::handlers::lap::LapHandlerConfig {
                lap_completion_threshold: self.config.lap_completion_threshold,
            },
        ));
        self.event_bus
            .subscribe(EventKind::TelemetryEvent, lap_handler)
            .await;
        count += 1;

        let metrics_handler: Arc<dyn EventHandler<Event>> = Arc::new(MetricsHandler::new());
        self.event_bus
            .subscribe(EventKind::LapCompleted, metrics_handler)
            .await;
        count += 1;

        if self.config.upload_enabled {
            let lap_upload: Arc<dyn EventHandler<Event>> =
                Arc::new(LapUploadHandler::new(self.api_client.clone()));
            self.event_bus
                .subscribe(EventKind::LapCompleted, lap_upload)
                .await;
            count += 1;

            let metrics_upload: Arc<dyn EventHandler<Event>> =
                Arc::new(MetricsUploadHandler::new(self.api_client.clone()));
            self.event_bus
                .subscribe(EventKind::LapMetrics, metrics_upload)
                .await;
            count += 1;
        } else {
            info!("Upload handlers disabled");
        }

        if let Some(ref dir) = self.config.archive_dir {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("could not create archive directory {}: {}", dir.display(), e);
            } else {
                let archive_handler: Arc<dyn EventHandler<Event>> =
                    Arc::new(LapArchiveHandler::new(dir.clone()));
                self.event_bus
                    .subscribe(EventKind::LapCompleted, archive_handler)
                    .await;
                count += 1;
            }
        }

        count
    }

    /// Request application shutdown
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Get a receiver to watch for shutdown completion
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }
}
