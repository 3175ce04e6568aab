use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::store::{DraftStore, StoreError};

/// Deletes drafts older than `lifespan_days`.
pub async fn purge_expired(store: &dyn DraftStore, lifespan_days: u32) -> Result<u64, StoreError> {
    let cutoff = Utc::now() - chrono::Duration::days(i64::from(lifespan_days));
    let purged = store.purge_saved_before(cutoff).await?;
    if purged > 0 {
        tracing::info!(purged, %cutoff, "purged expired drafts");
    }
    Ok(purged)
}

pub fn spawn_purge_task(
    store: Arc<dyn DraftStore>,
    lifespan_days: u32,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if let Err(error) = purge_expired(store.as_ref(), lifespan_days).await {
                    tracing::error!(?error, "draft purge failed");
                }
            }
        }
        .instrument(tracing::info_span!("draft retention", lifespan_days)),
    )
}
