//! `GuideSource` trait definition.
#![allow(clippy::future_not_send)]

use super::error::GuideError;

/// Schedule document source.
///
/// Abstracts the fetch capability so the engine can run against HTTP, a
/// local file, or an in-memory stub in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(GuideSource: Send)]
pub trait LocalGuideSource {
    /// Fetches the raw XMLTV document text.
    ///
    /// # Errors
    ///
    /// Returns [`GuideError::FetchFailure`] if the document cannot be read.
    async fn fetch_document(&self) -> Result<String, GuideError>;
}
