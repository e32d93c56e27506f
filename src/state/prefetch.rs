//! Speculative background discovery for the next round.
//!
//! Scheduled while the operator reviews the current round, so the next
//! round's IP is usually ready before they ask for it. The slot is
//! single-writer (this task) and single-reader (round-start logic).

use std::sync::atomic::Ordering;

use super::AppState;
use crate::types::GamePhase;

impl AppState {
    /// Schedule exactly one background `discover()` whose outcome lands in
    /// `pending_next`. No-op if a prefetch is already outstanding.
    ///
    /// `session_id` names the session this prefetch is for; an outcome
    /// settling after that session ended is discarded, so a prefetch can
    /// never leak into a newer session's slot. Never blocks the caller.
    pub(crate) fn schedule_prefetch(&self, session_id: String) {
        if self
            .prefetch_inflight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Prefetch already outstanding, not scheduling another");
            return;
        }

        let discovery = self.discovery.clone();
        let slot = self.pending_next.clone();
        let inflight = self.prefetch_inflight.clone();
        let session = self.session.clone();

        tokio::spawn(async move {
            let outcome = discovery.discover().await;

            let current = session.read().await.as_ref().and_then(|s| {
                (s.phase != GamePhase::SessionComplete).then(|| s.id.clone())
            });
            if current.as_deref() == Some(session_id.as_str()) {
                tracing::debug!("Prefetch settled");
                *slot.write().await = Some(outcome);
            } else {
                tracing::debug!("Discarding prefetch result, session {} is over", session_id);
            }

            inflight.store(false, Ordering::SeqCst);
        });
    }
}
