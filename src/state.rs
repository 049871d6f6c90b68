use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio_util::task::TaskTracker;

use crate::{
    config::{Config, EmailDriver},
    db::{Gateway, memory::MemoryGateway, postgres::PgGateway},
    email::{HttpMailer, LogMailer, Mailer},
    services::{
        CatalogService, DetachedNotifier, NotificationService, ProgressService, VolumeEventSink,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn Gateway>,
    pub progress: ProgressService,
    pub notifications: NotificationService,
    pub catalog: CatalogService,
    /// Detached fanouts in flight, drained on shutdown.
    pub fanouts: TaskTracker,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, anyhow::Error> {
        let gateway: Arc<dyn Gateway> = if config.database.in_memory {
            tracing::warn!("Using in-memory storage, nothing will be persisted");
            Arc::new(MemoryGateway::new())
        } else {
            let pool = PgPoolOptions::new()
                .min_connections(5)
                .max_connections(30)
                .connect_lazy_with(config.database.with_db());

            if config.application.run_migration {
                tracing::warn!("Running database migrations...");
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed running database migrations.")?;
            }

            Arc::new(PgGateway::new(pool))
        };

        let mailer: Arc<dyn Mailer> = match config.email.driver {
            EmailDriver::Log => Arc::new(LogMailer),
            EmailDriver::Http => Arc::new(
                HttpMailer::new(&config.email, config.application.frontend_url.clone())
                    .context("Failed building mail client.")?,
            ),
        };

        Ok(Self::build(config, gateway, mailer))
    }

    /// Wires the services over an already chosen gateway and mailer.
    pub fn build(config: Config, gateway: Arc<dyn Gateway>, mailer: Arc<dyn Mailer>) -> Self {
        let notifications = NotificationService::new(gateway.clone(), mailer, &config.email);
        let fanouts = TaskTracker::new();
        let events: Arc<dyn VolumeEventSink> = if config.notifications.detached {
            Arc::new(DetachedNotifier::new(notifications.clone(), fanouts.clone()))
        } else {
            Arc::new(notifications.clone())
        };

        AppState {
            progress: ProgressService::new(gateway.clone()),
            catalog: CatalogService::new(gateway.clone(), events),
            notifications,
            fanouts,
            gateway,
            config,
        }
    }
}
