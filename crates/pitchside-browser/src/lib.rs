//! Browser session management for JavaScript-heavy, bot-hostile sites.
//!
//! Keeps one Chromium process with a persisted identity alive across
//! extractions, hands out an exclusive primary page for list-level
//! navigation and short-lived ephemeral pages for detail pages.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod launcher;
pub mod page;
pub mod session;

pub use actions::PageActions;
pub use engine::{BrowserEngine, ChromePage};
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use launcher::{BrowserProcess, ChromeLauncher, Launcher};
pub use page::{EphemeralPage, PrimaryPage};
pub use session::{BrowserSession, SessionManager};
