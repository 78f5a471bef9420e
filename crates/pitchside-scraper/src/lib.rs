//! Pitchside Scraper - page extractors and the cache-aside read path.
//!
//! Extractors drive a [`pitchside_browser::BrowserSession`] through the
//! target site's pages and turn the rendered HTML into records. The
//! [`Orchestrator`] sits in front of them: it serves records from the
//! [`pitchside_db::CacheStore`] while they are younger than their TTL and
//! re-scrapes otherwise.
//!
//! # Example
//!
//! ```rust,ignore
//! use pitchside_scraper::{Extractor, Orchestrator};
//!
//! let extractor = Extractor::new(session, &config.scraping, &config.selectors)?;
//! let orchestrator = Orchestrator::new(extractor, store, TtlPolicy::from_config(&config.cache));
//! let upcoming = orchestrator.fixtures(MatchStatus::Upcoming).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod parser;
pub mod readiness;
pub mod url_builder;

// Re-export commonly used types
pub use error::{Result, ScrapeError};
pub use extractor::Extractor;
pub use orchestrator::Orchestrator;
pub use url_builder::PageUrls;
