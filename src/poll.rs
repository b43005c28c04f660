//! Periodic fetch lanes and the connectivity watcher.
//!
//! Each lane is a spawned task ticking on its own interval and reporting
//! into one event channel. A fetch in flight is never aborted when the
//! next tick comes due; the lane simply waits, so a hung request stalls
//! that lane (and only that lane) until it resolves. Every event carries a
//! monotonic per-lane sequence number and the presenter drops anything
//! older than what it last applied.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::{TrackerClient, TripAction};
use crate::config::Timings;
use crate::connectivity::ConnectivityProbe;

/// Events emitted by the lanes (and ad hoc trip tasks) into the
/// presenter's channel.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// Status lane fetched the main fragment.
    StatusFetched { seq: u64, html: String },
    /// Status lane failed (transport error or non-2xx).
    StatusFailed { seq: u64, error: String },
    /// Download lane fetched the downloads fragment.
    DownloadsFetched { seq: u64, html: String },
    /// Download lane failed. Never affects the link flag.
    DownloadsFailed { seq: u64, error: String },
    /// The reachability probe observed a flip.
    LinkChanged { online: bool },
    /// A trip-control post finished.
    TripResult {
        action: TripAction,
        error: Option<String>,
    },
}

/// Last-writer-wins guard for one lane.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaneSeq {
    last_applied: Option<u64>,
}

impl LaneSeq {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_applied: None }
    }

    /// Accepts `seq` if it is newer than everything applied so far.
    pub fn accepts(&mut self, seq: u64) -> bool {
        if self.last_applied.is_some_and(|last| seq <= last) {
            false
        } else {
            self.last_applied = Some(seq);
            true
        }
    }
}

/// Handle to the spawned lane tasks.
pub struct LaneSet {
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
}

impl LaneSet {
    /// Wakes the status lane for an immediate fetch (manual reload).
    pub fn refresh_status(&self) {
        self.refresh.notify_one();
    }

    /// Cancels all lane tasks.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for LaneSet {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Spawns the status lane, the download lane and the connectivity watcher,
/// all reporting into `tx`.
///
/// Both fetch lanes fire once immediately, matching the page-load fetch of
/// the tracker's own UI, then settle into their cadence.
pub fn spawn_lanes<P>(
    client: TrackerClient,
    probe: P,
    timings: &Timings,
    tx: mpsc::UnboundedSender<PollEvent>,
) -> LaneSet
where
    P: ConnectivityProbe + 'static,
{
    let refresh = Arc::new(Notify::new());
    let shutdown = CancellationToken::new();

    tokio::spawn(status_lane(
        client.clone(),
        timings.status_poll(),
        tx.clone(),
        Arc::clone(&refresh),
        shutdown.clone(),
    ));
    tokio::spawn(download_lane(
        client,
        timings.download_poll(),
        tx.clone(),
        shutdown.clone(),
    ));
    tokio::spawn(connectivity_watcher(
        probe,
        timings.connectivity_poll(),
        tx,
        shutdown.clone(),
    ));

    LaneSet { refresh, shutdown }
}

async fn status_lane(
    client: TrackerClient,
    period: std::time::Duration,
    tx: mpsc::UnboundedSender<PollEvent>,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = interval.tick() => {}
            () = refresh.notified() => {}
        }

        seq += 1;
        let event = match client.fetch_status().await {
            Ok(html) => PollEvent::StatusFetched { seq, html },
            Err(e) => {
                log::warn!("status fetch failed: {e}");
                PollEvent::StatusFailed {
                    seq,
                    error: e.to_string(),
                }
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

async fn download_lane(
    client: TrackerClient,
    period: std::time::Duration,
    tx: mpsc::UnboundedSender<PollEvent>,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        seq += 1;
        let event = match client.fetch_downloads().await {
            Ok(html) => PollEvent::DownloadsFetched { seq, html },
            Err(e) => {
                log::warn!("download list fetch failed: {e}");
                PollEvent::DownloadsFailed {
                    seq,
                    error: e.to_string(),
                }
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}

async fn connectivity_watcher<P>(
    probe: P,
    period: std::time::Duration,
    tx: mpsc::UnboundedSender<PollEvent>,
    shutdown: CancellationToken,
) where
    P: ConnectivityProbe,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first reading establishes the baseline without firing an event,
    // like the page recording the flag once at load.
    let mut last = probe.check().await;

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let current = probe.check().await;
        if current != last {
            last = current;
            log::info!("connectivity changed: online={current}");
            if tx.send(PollEvent::LinkChanged { online: current }).is_err() {
                break;
            }
        }
    }
}

/// Spawns a one-shot trip-control post, reporting its outcome as a
/// [`PollEvent::TripResult`].
pub fn spawn_trip_action(
    client: TrackerClient,
    action: TripAction,
    tx: mpsc::UnboundedSender<PollEvent>,
) {
    tokio::spawn(async move {
        let result = match action {
            TripAction::Start => client.start_trip().await,
            TripAction::Stop => client.stop_trip().await,
        };
        let error = result.err().map(|e| {
            log::warn!("trip {} failed: {e}", action.label());
            e.to_string()
        });
        let _ = tx.send(PollEvent::TripResult { action, error });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    struct FlagProbe(Arc<AtomicBool>);

    #[async_trait]
    impl ConnectivityProbe for FlagProbe {
        async fn check(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn fast_timings() -> Timings {
        Timings {
            status_poll_ms: 20,
            download_poll_ms: 40,
            connectivity_poll_ms: 10,
            ..Timings::default()
        }
    }

    async fn recv_timeout(rx: &mut mpsc::UnboundedReceiver<PollEvent>) -> PollEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for lane event")
            .expect("lane channel closed")
    }

    #[test]
    fn lane_seq_drops_stale() {
        let mut seq = LaneSeq::new();
        assert!(seq.accepts(1));
        assert!(seq.accepts(2));
        assert!(!seq.accepts(2));
        assert!(!seq.accepts(1));
        assert!(seq.accepts(5));
        assert!(!seq.accepts(4));
    }

    #[tokio::test]
    async fn status_lane_reports_success_and_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body("<p>fix</p>")
            .expect_at_least(1)
            .create_async()
            .await;
        server
            .mock("GET", "/downloads")
            .with_status(404)
            .expect_at_least(1)
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let lanes = spawn_lanes(client, FlagProbe(flag), &fast_timings(), tx);

        let mut saw_status = false;
        let mut saw_download_failure = false;
        while !(saw_status && saw_download_failure) {
            match recv_timeout(&mut rx).await {
                PollEvent::StatusFetched { html, .. } => {
                    assert_eq!(html, "<p>fix</p>");
                    saw_status = true;
                }
                PollEvent::DownloadsFailed { error, .. } => {
                    assert!(error.contains("404"));
                    saw_download_failure = true;
                }
                _ => {}
            }
        }
        lanes.shutdown();
    }

    #[tokio::test]
    async fn watcher_emits_one_event_per_flip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body("x")
            .expect_at_least(0)
            .create_async()
            .await;
        server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body("x")
            .expect_at_least(0)
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let lanes = spawn_lanes(client, FlagProbe(Arc::clone(&flag)), &fast_timings(), tx);

        // Let the watcher take its baseline reading before flipping
        tokio::time::sleep(Duration::from_millis(30)).await;
        flag.store(false, Ordering::SeqCst);
        loop {
            if let PollEvent::LinkChanged { online } = recv_timeout(&mut rx).await {
                assert!(!online);
                break;
            }
        }

        // Flag stays false: no further LinkChanged may arrive
        tokio::time::sleep(Duration::from_millis(60)).await;
        while let Ok(event) = rx.try_recv() {
            assert!(!matches!(event, PollEvent::LinkChanged { .. }));
        }
        lanes.shutdown();
    }

    #[tokio::test]
    async fn refresh_wakes_status_lane_early() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body("x")
            .expect_at_least(2)
            .create_async()
            .await;
        server
            .mock("GET", "/downloads")
            .with_status(200)
            .with_body("x")
            .expect_at_least(0)
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url()).unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let slow = Timings {
            status_poll_ms: 60_000,
            download_poll_ms: 60_000,
            connectivity_poll_ms: 60_000,
            ..Timings::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let lanes = spawn_lanes(client, FlagProbe(flag), &slow, tx);

        // First fetch fires immediately on lane start
        assert!(matches!(
            recv_timeout(&mut rx).await,
            PollEvent::StatusFetched { seq: 1, .. }
        ));

        // The next tick is a minute away; the poke must not wait for it
        lanes.refresh_status();
        assert!(matches!(
            recv_timeout(&mut rx).await,
            PollEvent::StatusFetched { seq: 2, .. }
        ));
        lanes.shutdown();
    }

    #[tokio::test]
    async fn trip_action_reports_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/start")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("POST", "/stop")
            .with_status(500)
            .create_async()
            .await;

        let client = TrackerClient::new(&server.url()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        spawn_trip_action(client.clone(), TripAction::Start, tx.clone());
        match recv_timeout(&mut rx).await {
            PollEvent::TripResult { action, error } => {
                assert_eq!(action, TripAction::Start);
                assert!(error.is_none());
            }
            other => panic!("unexpected event: {other:?}"),
        }

        spawn_trip_action(client, TripAction::Stop, tx);
        match recv_timeout(&mut rx).await {
            PollEvent::TripResult { action, error } => {
                assert_eq!(action, TripAction::Stop);
                assert!(error.is_some());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
