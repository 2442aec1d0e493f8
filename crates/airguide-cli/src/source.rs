//! Schedule source selection (HTTP or local file).

use airguide_api::xmltv::{FileSource, GuideError, GuideSource, XmltvClient};

/// Source chosen on the command line or in the config.
#[derive(Debug)]
pub enum ScheduleSource {
    /// Fetch over HTTP.
    Http(XmltvClient),
    /// Read a local XMLTV file.
    File(FileSource),
}

impl GuideSource for ScheduleSource {
    async fn fetch_document(&self) -> Result<String, GuideError> {
        match self {
            Self::Http(client) => client.fetch_document().await,
            Self::File(file) => file.fetch_document().await,
        }
    }
}
