//! gpsmon - a terminal status monitor for a GPS cycling-computer device.
//!
//! The tracker serves server-rendered HTML fragments; gpsmon polls them,
//! tracks an online/offline link flag, and surfaces transient
//! notifications, abstracted from any specific UI so the same presenter
//! drives both the TUI and headless mode.
//!
//! # Example
//!
//! ```no_run
//! use gpsmon::{MonitorConfig, TcpProbe, TrackerClient, poll};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> gpsmon::Result<()> {
//! let config = MonitorConfig::default();
//! let client = TrackerClient::new(&config.base_url)?;
//! let probe = TcpProbe::from_base_url(&config.base_url)
//!     .expect("config base_url has a host");
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let lanes = poll::spawn_lanes(client, probe, &config.timings, tx);
//! while let Some(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//! # lanes.shutdown();
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod format;
pub mod fragment;
pub mod notify;
pub mod poll;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use client::{TrackerClient, TripAction};
pub use config::{MonitorConfig, Timings};
pub use connectivity::{Connectivity, ConnectivityProbe, LinkState, TcpProbe};
pub use error::{Error, Result};
pub use format::{format_age, format_timestamp};
pub use fragment::{extract_download_list, fragment_lines, list_entries};
pub use notify::{Notification, NotificationKind, NotificationPhase, NotificationStack};
pub use poll::{LaneSeq, LaneSet, PollEvent};
