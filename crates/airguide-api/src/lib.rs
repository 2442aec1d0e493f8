//! Schedule source library for airguide.
//!
//! Fetches XMLTV documents and parses them into a normalized program timeline.

/// XMLTV source, time codec and parser.
pub mod xmltv;
