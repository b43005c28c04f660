//! Application state model (the presenter).
//!
//! `App` owns the link state, both rendered views, the notification stack
//! and the cosmetic control timers. It is UI-agnostic: the TUI draws it
//! every frame and headless mode logs its transitions, but all semantics
//! live in [`App::handle_event`] and [`App::tick`].

use std::time::Instant;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

use crate::client::{TrackerClient, TripAction};
use crate::config::Timings;
use crate::connectivity::{Connectivity, LinkState};
use crate::fragment;
use crate::notify::{NotificationKind, NotificationStack};
use crate::poll::{LaneSeq, PollEvent, spawn_trip_action};

/// Fixed error card shown when the status lane fails.
pub const ERROR_CARD_TITLE: &str = "Connection error";
pub const ERROR_CARD_BODY: &str = "Unable to fetch GPS data - check the connection";
/// Fixed placeholder shown when the download lane fails.
pub const NO_DATA_PLACEHOLDER: &str = "Download list unavailable";

/// What the main panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    /// Nothing fetched yet.
    Loading,
    /// The tracker's status fragment, flattened to text lines.
    Fragment { lines: Vec<String> },
    /// The canned error card; `detail` is the failure diagnostic.
    ErrorCard { detail: String },
}

/// What the download panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadView {
    Loading,
    /// Inner content of the fragment's `.download-list` element.
    List { inner: String },
    /// The fixed "no data" placeholder after a lane failure.
    Unavailable,
}

/// On-screen controls that give press/busy feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Reload,
    StartTrip,
    StopTrip,
}

impl Control {
    pub const ALL: [Self; 3] = [Self::Reload, Self::StartTrip, Self::StopTrip];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::StartTrip => "start trip",
            Self::StopTrip => "stop trip",
        }
    }

    const fn idx(self) -> usize {
        match self {
            Self::Reload => 0,
            Self::StartTrip => 1,
            Self::StopTrip => 2,
        }
    }
}

/// Cosmetic feedback timers for one control.
///
/// `pressed` flashes the control briefly; `busy` disables a submitted
/// control and is cleared on a fixed schedule regardless of whether the
/// underlying request ever resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct ControlFeedback {
    pressed_at: Option<Instant>,
    busy_since: Option<Instant>,
}

impl ControlFeedback {
    #[must_use]
    pub fn is_pressed(&self, now: Instant, timings: &Timings) -> bool {
        self.pressed_at
            .is_some_and(|t| now.saturating_duration_since(t) < timings.button_feedback())
    }

    #[must_use]
    pub fn is_busy(&self, now: Instant, timings: &Timings) -> bool {
        self.busy_since
            .is_some_and(|t| now.saturating_duration_since(t) < timings.form_reset())
    }

    fn expire(&mut self, now: Instant, timings: &Timings) {
        if !self.is_pressed(now, timings) {
            self.pressed_at = None;
        }
        if !self.is_busy(now, timings) {
            self.busy_since = None;
        }
    }
}

pub struct App {
    pub timings: Timings,
    pub link: Connectivity,
    /// Wall-clock time of the last successful status fetch.
    pub last_update: Option<DateTime<Local>>,
    pub status_view: StatusView,
    pub download_view: DownloadView,
    pub notifications: NotificationStack,
    pub should_quit: bool,
    /// Set by input handling; the run loop consumes it and pokes the
    /// status lane for an immediate fetch.
    pub reload_requested: bool,
    client: TrackerClient,
    event_tx: mpsc::UnboundedSender<PollEvent>,
    status_seq: LaneSeq,
    download_seq: LaneSeq,
    controls: [ControlFeedback; Control::ALL.len()],
}

impl App {
    #[must_use]
    pub fn new(
        client: TrackerClient,
        timings: Timings,
        event_tx: mpsc::UnboundedSender<PollEvent>,
    ) -> Self {
        Self {
            timings,
            link: Connectivity::new(),
            last_update: None,
            status_view: StatusView::Loading,
            download_view: DownloadView::Loading,
            notifications: NotificationStack::new(),
            should_quit: false,
            reload_requested: false,
            client,
            event_tx,
            status_seq: LaneSeq::new(),
            download_seq: LaneSeq::new(),
            controls: [ControlFeedback::default(); Control::ALL.len()],
        }
    }

    #[must_use]
    pub fn control(&self, control: Control) -> &ControlFeedback {
        &self.controls[control.idx()]
    }

    /// Flashes a control (pressed highlight for the feedback window).
    pub fn press_control(&mut self, control: Control, now: Instant) {
        self.controls[control.idx()].pressed_at = Some(now);
    }

    /// Submits a trip-control action, unless that control is still busy.
    ///
    /// The busy state restores on its fixed timer via [`App::tick`]; it is
    /// deliberately not tied to the request lifecycle.
    pub fn submit_trip(&mut self, action: TripAction, now: Instant) {
        let control = match action {
            TripAction::Start => Control::StartTrip,
            TripAction::Stop => Control::StopTrip,
        };
        if self.controls[control.idx()].is_busy(now, &self.timings) {
            return;
        }
        self.controls[control.idx()].busy_since = Some(now);
        self.press_control(control, now);
        spawn_trip_action(self.client.clone(), action, self.event_tx.clone());
    }

    /// Applies one lane event.
    pub fn handle_event(&mut self, event: PollEvent, now: Instant) {
        match event {
            PollEvent::StatusFetched { seq, html } => {
                if !self.status_seq.accepts(seq) {
                    return;
                }
                self.status_view = StatusView::Fragment {
                    lines: fragment::fragment_lines(&html),
                };
                // Fetch outcomes move the flag silently; only the probe
                // watcher announces transitions.
                self.link.apply(LinkState::Online);
                self.last_update = Some(Local::now());
            }
            PollEvent::StatusFailed { seq, error } => {
                if !self.status_seq.accepts(seq) {
                    return;
                }
                self.link.apply(LinkState::Offline);
                self.status_view = StatusView::ErrorCard { detail: error };
            }
            PollEvent::DownloadsFetched { seq, html } => {
                if !self.download_seq.accepts(seq) {
                    return;
                }
                // A fragment without the marker class is a silent no-op:
                // the previously rendered list stays put.
                if let Some(inner) = fragment::extract_download_list(&html) {
                    self.download_view = DownloadView::List { inner };
                }
            }
            PollEvent::DownloadsFailed { seq, .. } => {
                if !self.download_seq.accepts(seq) {
                    return;
                }
                self.download_view = DownloadView::Unavailable;
            }
            PollEvent::LinkChanged { online } => {
                self.link.apply(LinkState::from_online(online));
                let (message, kind) = if online {
                    ("Connection restored", NotificationKind::Success)
                } else {
                    ("Connection lost", NotificationKind::Error)
                };
                self.notifications.push(message, kind, now);
            }
            PollEvent::TripResult { action, error } => match error {
                None => {
                    let message = match action {
                        TripAction::Start => "Trip recording started",
                        TripAction::Stop => "Trip recording stopped",
                    };
                    self.notifications
                        .push(message, NotificationKind::Success, now);
                }
                Some(e) => {
                    self.notifications.push(
                        format!("Trip {} failed: {e}", action.label()),
                        NotificationKind::Error,
                        now,
                    );
                }
            },
        }
    }

    /// Advances time-driven state: notification expiry and control timers.
    pub fn tick(&mut self, now: Instant) {
        let timings = self.timings.clone();
        self.notifications.prune(now, &timings);
        for control in &mut self.controls {
            control.expire(now, &timings);
        }
    }
}
