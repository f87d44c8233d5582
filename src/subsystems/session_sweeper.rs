use std::time::Duration;

use async_trait::async_trait;
use tokio::{select, time::MissedTickBehavior};
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemHandle};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{error, info};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically removes expired sessions from the session table.
pub struct SessionSweeper {
    store: PostgresStore,
}

impl SessionSweeper {
    pub fn new(store: PostgresStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IntoSubsystem<anyhow::Error> for SessionSweeper {
    async fn run(self, subsys: SubsystemHandle) -> Result<(), anyhow::Error> {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Session sweeper starting.");
        loop {
            select!(
                _ = interval.tick() => {
                    if let Err(e) = self.store.delete_expired().await {
                        error!("Deleting expired sessions failed with {e}");
                    }
                }
                _ = subsys.on_shutdown_requested() => {
                    break;
                }
            );
        }
        info!("Session sweeper shutdown.");
        Ok(())
    }
}
