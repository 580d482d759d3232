use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::SessionStore;

/// Every ten minutes
const SWEEP_SCHEDULE: &str = "0 */10 * * * *";

/// Periodically drops sessions nobody has touched for a while, so the
/// in-memory meal logs don't grow without bound
pub struct SessionSweeper {
    sessions: Arc<SessionStore>,
    ttl: chrono::Duration,
    scheduler: JobScheduler,
}

impl SessionSweeper {
    pub async fn new(sessions: Arc<SessionStore>, ttl: chrono::Duration) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            sessions,
            ttl,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let sessions = self.sessions.clone();
        let ttl = self.ttl;

        let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _l| {
            let sessions = sessions.clone();

            Box::pin(async move {
                let removed = sessions.purge_idle(ttl).await;
                if removed > 0 {
                    log::info!(
                        "🧹 Swept {} idle sessions ({} still active)",
                        removed,
                        sessions.active_count().await
                    );
                } else {
                    log::debug!("🔄 Session sweep found nothing idle");
                }
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        log::info!(
            "✅ Session sweeper started (idle TTL {} minutes)",
            self.ttl.num_minutes()
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        log::info!("Session sweeper stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sweeper_starts_and_stops() {
        let sessions = Arc::new(SessionStore::new("secret").unwrap());
        let mut sweeper = SessionSweeper::new(sessions, chrono::Duration::minutes(120))
            .await
            .unwrap();

        sweeper.start().await.unwrap();
        sweeper.stop().await.unwrap();
    }
}
