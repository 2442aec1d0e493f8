//! Schedule loading error taxonomy.

/// Failure kinds at the fetch/parse boundary.
///
/// None of these are fatal to the refresh loop; each is reported inline
/// and the scheduler keeps ticking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideError {
    /// Network failure, timeout, non-2xx status or unreadable source.
    FetchFailure(String),
    /// The document is not well-formed XML (or not XMLTV-shaped).
    MalformedDocument(String),
    /// Well-formed document without any programme for the channel.
    NoScheduleData(String),
    /// Every programme for the channel has already ended.
    EmptyTimeline,
}

impl GuideError {
    /// Inline message shown by render surfaces.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::FetchFailure(_) | Self::MalformedDocument(_) => {
                "Error loading schedule. Please try refreshing the page."
            }
            Self::NoScheduleData(_) => "No schedule data available for channel.",
            Self::EmptyTimeline => "No upcoming programs found.",
        }
    }
}

impl std::fmt::Display for GuideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailure(reason) => write!(f, "failed to fetch schedule: {reason}"),
            Self::MalformedDocument(reason) => write!(f, "malformed schedule document: {reason}"),
            Self::NoScheduleData(channel) => {
                write!(f, "no schedule data found for channel {channel}")
            }
            Self::EmptyTimeline => write!(f, "all scheduled programmes have ended"),
        }
    }
}

impl std::error::Error for GuideError {}
