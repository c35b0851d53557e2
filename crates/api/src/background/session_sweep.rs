//! Periodic purge of expired key-value entries.
//!
//! Session validation already evicts an expired record when it is next
//! read. This sweep drops records that are never read again (abandoned
//! sessions) so the backing store does not grow without bound.

use std::sync::Arc;
use std::time::Duration;

use agora_core::kv::KeyValueStore;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop every `every` until `cancel` is triggered.
pub async fn run(kv: Arc<dyn KeyValueStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match kv.purge_expired().await {
                    Ok(purged) => {
                        if purged > 0 {
                            tracing::info!(purged, "Session sweep: purged expired entries");
                        } else {
                            tracing::debug!("Session sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: purge failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::kv::MemoryKeyValueStore;

    #[tokio::test]
    async fn sweep_purges_and_stops_on_cancel() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set_ex("session:1", "{}", Duration::ZERO).await.unwrap();
        kv.set_ex("session:2", "{}", Duration::from_secs(60))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            kv.clone(),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(kv.len().await, 1);
    }
}
