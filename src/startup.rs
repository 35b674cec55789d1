//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::Router;
use rand::Rng;
use tokio::net::TcpListener;

use crate::application::services::TrackingServiceImpl;
use crate::config::Settings;
use crate::domain::{CoordinateMapper, RecordStore, SpeedTestRunner};
use crate::infrastructure::database;
use crate::infrastructure::repositories::{InMemoryRecordStore, PgRecordStore};
use crate::infrastructure::speedtest::CliSpeedTestRunner;
use crate::infrastructure::tracker::{CleanupHandle, CleanupScheduler, IdAllocator, SessionStore};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{cors, create_trace_layer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub ids: Arc<IdAllocator>,
    pub records: Arc<dyn RecordStore>,
    pub speed_test: Arc<dyn SpeedTestRunner>,
    pub mapper: CoordinateMapper,
    /// Random payload served by the download endpoint
    pub garbage: Bytes,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// State with empty trackers around the given collaborators
    pub fn new(
        settings: Settings,
        records: Arc<dyn RecordStore>,
        speed_test: Arc<dyn SpeedTestRunner>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            ids: Arc::new(IdAllocator::new()),
            records,
            speed_test,
            mapper: settings.map.mapper(),
            garbage: random_chunk(handlers::backend::GARBAGE_CHUNK_SIZE),
            settings: Arc::new(settings),
        }
    }

    /// Tracking service over this state
    pub fn tracking(&self) -> TrackingServiceImpl {
        TrackingServiceImpl::new(
            self.sessions.clone(),
            self.ids.clone(),
            self.records.clone(),
            self.speed_test.clone(),
            self.mapper,
        )
    }

    /// Cleanup scheduler over this state's trackers
    pub fn cleanup_scheduler(&self) -> CleanupScheduler {
        CleanupScheduler::new(
            self.sessions.clone(),
            self.ids.clone(),
            self.settings.tracker.cleanup_interval(),
            self.settings.tracker.session_timeout(),
        )
    }
}

fn random_chunk(size: usize) -> Bytes {
    let mut buf = vec![0u8; size];
    rand::rng().fill(&mut buf[..]);
    Bytes::from(buf)
}

/// Router with every route and the outer middleware stack
pub fn build_router(state: AppState) -> Router {
    let cors_layer = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(create_trace_layer())
        .layer(cors_layer)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    cleanup: CleanupHandle,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let records: Arc<dyn RecordStore> = match settings.database.url.as_deref() {
            Some(url) => {
                let pool = database::create_pool(&settings.database, url).await?;
                tracing::info!("Database connection pool created");

                if settings.database.run_migrations {
                    database::run_migrations(&pool).await?;
                    tracing::info!("Database migrations applied");
                }
                Arc::new(PgRecordStore::new(pool))
            }
            None => {
                tracing::warn!("No database URL configured, records are kept in memory");
                Arc::new(InMemoryRecordStore::new())
            }
        };

        let speed_test = Arc::new(CliSpeedTestRunner::from_settings(&settings.speedtest));

        let addr = settings.server.socket_addr()?;
        let state = AppState::new(settings, records, speed_test);

        if state.mapper.bounds().is_degenerate() {
            tracing::warn!(
                bounds = ?state.mapper.bounds(),
                "Map bounds are degenerate, live positions and heatmap points cannot be mapped"
            );
        }

        // Start evicting inactive sessions
        let cleanup = state.cleanup_scheduler().spawn();

        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            cleanup,
        })
    }

    /// Run the server until a shutdown signal arrives, then stop the cleanup task
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        self.cleanup.shutdown().await;
        tracing::info!("Server stopped");
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
