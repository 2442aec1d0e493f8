//! XMLTV document types and custom deserializers.
//!
//! Only the elements the guide needs are modelled; everything else
//! (`<channel>`, `<category>`, `<icon>`, `<credits>`, ...) is skipped.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Deserializes empty strings as `None`.
pub fn deserialize_empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let result = Option::deserialize(deserializer);
    let s: Option<String> = result.map_err(D::Error::custom)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Root `<tv>` element.
#[derive(Debug, Deserialize)]
#[serde(rename = "tv")]
pub struct TvDocument {
    /// `<programme>` elements (may be interleaved with `<channel>`).
    #[serde(rename = "programme", default)]
    pub programmes: Vec<XmlProgramme>,
}

/// A `<programme>` element.
#[derive(Debug, Deserialize)]
pub struct XmlProgramme {
    /// `channel` attribute.
    #[serde(rename = "@channel", default)]
    pub channel: String,
    /// `start` attribute (`YYYYMMDDHHMMSS [zone]`).
    #[serde(rename = "@start", default)]
    pub start: Option<String>,
    /// `stop` attribute.
    #[serde(rename = "@stop", default)]
    pub stop: Option<String>,
    /// `<title>` elements (one per language).
    #[serde(rename = "title", default)]
    pub titles: Vec<XmlText>,
    /// `<sub-title>` elements.
    #[serde(rename = "sub-title", default)]
    pub sub_titles: Vec<XmlText>,
    /// `<desc>` elements.
    #[serde(rename = "desc", default)]
    pub descriptions: Vec<XmlText>,
    /// `<episode-num>` elements in any numbering system.
    #[serde(rename = "episode-num", default)]
    pub episode_nums: Vec<XmlEpisodeNum>,
    /// Free-text `<date>` (e.g. `2019`, `20190501`, `2019-05-01`).
    #[serde(
        rename = "date",
        deserialize_with = "deserialize_empty_string_as_none",
        default
    )]
    pub date: Option<String>,
}

/// Text element (`lang` and other attributes are ignored).
#[derive(Debug, Deserialize)]
pub struct XmlText {
    /// Text content.
    #[serde(rename = "$text", default)]
    pub text: String,
}

/// `<episode-num system="...">` element.
#[derive(Debug, Deserialize)]
pub struct XmlEpisodeNum {
    /// Numbering system (`onscreen`, `xmltv_ns`, `dd_progid`, ...).
    #[serde(rename = "@system", default)]
    pub system: Option<String>,
    /// Episode number text.
    #[serde(rename = "$text", default)]
    pub text: String,
}

impl XmlProgramme {
    /// First `<title>` text, if the element exists.
    pub fn first_title(&self) -> Option<&str> {
        self.titles.first().map(|t| t.text.as_str())
    }

    /// First `<desc>` text, if the element exists.
    pub fn first_description(&self) -> Option<&str> {
        self.descriptions.first().map(|d| d.text.as_str())
    }

    /// First `<sub-title>` text, if the element exists.
    pub fn first_sub_title(&self) -> Option<&str> {
        self.sub_titles.first().map(|s| s.text.as_str())
    }

    /// Text of the first `<episode-num system="onscreen">`.
    pub fn onscreen_episode(&self) -> Option<&str> {
        self.episode_nums
            .iter()
            .find(|ep| ep.system.as_deref() == Some("onscreen"))
            .map(|ep| ep.text.as_str())
    }
}
