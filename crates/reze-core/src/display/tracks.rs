//! Pending subtitle-track waits
//!
//! At most one wait exists per language. A wait settles when the engine
//! reports the track loaded, fails after the configured bound, and is
//! cancelled when a newer wait for the same language or a new load cycle
//! replaces it. Settled waits never linger in the table.

use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

struct Waiter {
    id: u64,
    language: String,
    tx: oneshot::Sender<()>,
}

#[derive(Default)]
struct WaitTable {
    next_id: u64,
    // registration order
    waiters: Vec<Waiter>,
}

/// Shared table of in-flight track waits
#[derive(Clone, Default)]
pub(crate) struct PendingTrackWaits {
    inner: Arc<Mutex<WaitTable>>,
}

impl PendingTrackWaits {
    fn table(&self) -> MutexGuard<'_, WaitTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a wait, cancelling any earlier one for the same language
    pub(crate) fn register(&self, language: &str, timeout: Duration) -> TrackWait {
        let (tx, rx) = oneshot::channel();
        let mut table = self.table();
        let id = table.next_id;
        table.next_id += 1;
        table.waiters.retain(|w| w.language != language);
        table.waiters.push(Waiter {
            id,
            language: language.to_string(),
            tx,
        });

        TrackWait {
            language: language.to_string(),
            id,
            timeout,
            rx,
            waits: self.clone(),
        }
    }

    /// Settle every wait whose track has loaded. Returns their languages in
    /// registration order.
    pub(crate) fn resolve_ready(&self, is_loaded: impl Fn(&str) -> bool) -> Vec<String> {
        let mut table = self.table();
        let (ready, pending): (Vec<_>, Vec<_>) = table
            .waiters
            .drain(..)
            .partition(|w| is_loaded(&w.language));
        table.waiters = pending;
        ready
            .into_iter()
            .map(|waiter| {
                let _ = waiter.tx.send(());
                waiter.language
            })
            .collect()
    }

    /// Cancel every wait
    pub(crate) fn clear(&self) {
        self.table().waiters.clear();
    }

    fn remove(&self, language: &str, id: u64) {
        self.table()
            .waiters
            .retain(|w| !(w.id == id && w.language == language));
    }

    pub(crate) fn len(&self) -> usize {
        self.table().waiters.len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, language: &str) -> bool {
        self.table().waiters.iter().any(|w| w.language == language)
    }
}

/// A registered wait for one subtitle language
pub(crate) struct TrackWait {
    language: String,
    id: u64,
    timeout: Duration,
    rx: oneshot::Receiver<()>,
    waits: PendingTrackWaits,
}

impl TrackWait {
    pub(crate) async fn wait(self) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(Error::TrackWaitCancelled {
                language: self.language,
            }),
            Err(_) => {
                self.waits.remove(&self.language, self.id);
                debug!(language = %self.language, "Subtitle track wait timed out");
                Err(Error::TrackLoadTimeout {
                    language: self.language,
                    waited_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUND: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn resolves_when_language_becomes_available() {
        let waits = PendingTrackWaits::default();
        let wait = waits.register("fr", BOUND);
        assert!(waits.contains("fr"));

        assert_eq!(waits.resolve_ready(|lang| lang == "fr"), vec!["fr"]);
        assert!(wait.wait().await.is_ok());
        assert_eq!(waits.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_removes_entry() {
        let waits = PendingTrackWaits::default();
        let wait = waits.register("fr", BOUND);

        let err = wait.wait().await.unwrap_err();
        assert!(matches!(err, Error::TrackLoadTimeout { waited_ms: 5000, .. }));
        assert_eq!(waits.len(), 0);
    }

    #[tokio::test]
    async fn newer_wait_replaces_older() {
        let waits = PendingTrackWaits::default();
        let first = waits.register("de", BOUND);
        let second = waits.register("de", BOUND);
        assert_eq!(waits.len(), 1);

        assert!(matches!(
            first.wait().await,
            Err(Error::TrackWaitCancelled { .. })
        ));

        waits.resolve_ready(|_| true);
        assert!(second.wait().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timeout_keeps_newer_entry() {
        let waits = PendingTrackWaits::default();
        let first = waits.register("es", Duration::from_millis(10));
        let _second = waits.register("es", BOUND);

        // the first wait was cancelled; its removal must not touch the second
        let _ = first.wait().await;
        waits.remove("es", 0);
        assert!(waits.contains("es"));
    }

    #[test]
    fn resolve_without_match_is_none() {
        let waits = PendingTrackWaits::default();
        let _wait = waits.register("it", BOUND);
        assert!(waits.resolve_ready(|lang| lang == "en").is_empty());
        assert_eq!(waits.len(), 1);
    }

    #[tokio::test]
    async fn settles_every_ready_wait() {
        let waits = PendingTrackWaits::default();
        let fr = waits.register("fr", BOUND);
        let de = waits.register("de", BOUND);
        let _it = waits.register("it", BOUND);

        let settled = waits.resolve_ready(|lang| lang != "it");
        assert_eq!(settled, vec!["fr", "de"]);
        assert!(fr.wait().await.is_ok());
        assert!(de.wait().await.is_ok());
        assert!(waits.contains("it"));
        assert_eq!(waits.len(), 1);
    }
}
