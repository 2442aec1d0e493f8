//! XMLTV schedule module.
//!
//! Fetches the schedule document (HTTP or local file), decodes XMLTV
//! timestamps and parses `<programme>` elements into a [`Timeline`].

mod api;
mod client;
mod error;
mod file;
mod parser;
pub mod time;
mod types;
pub(crate) mod xml;

#[allow(clippy::module_name_repetitions)]
pub use api::{GuideSource, LocalGuideSource};
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_GUIDE_URL, DEFAULT_TIMEOUT, XmltvClient, XmltvClientBuilder};
pub use error::GuideError;
pub use file::FileSource;
pub use parser::{DEFAULT_TITLE, parse};
pub use time::{TimestampError, parse_timestamp, parse_timestamp_at};
pub use types::{ProgramEntry, Timeline};
