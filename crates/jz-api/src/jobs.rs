//! Background maintenance.

use std::time::Duration;

use tokio::{task::JoinHandle, time::interval};

use crate::session::SessionStore;

/// Evict expired sessions every `every`.
///
/// Expired sessions are already ignored on load; the sweeper only keeps
/// abandoned ones from piling up in memory.
pub fn spawn_session_sweeper(sessions: SessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(every);

        loop {
            interval.tick().await;

            match sessions.sweep().await {
                0 => tracing::debug!("Session sweep complete: nothing expired"),
                evicted => tracing::info!(evicted, "Session sweep complete"),
            }
        }
    })
}
