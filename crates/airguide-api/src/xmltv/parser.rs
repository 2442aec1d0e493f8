//! XMLTV document to [`Timeline`] conversion.

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

use super::error::GuideError;
use super::time::parse_timestamp_at;
use super::types::{ProgramEntry, Timeline};
use super::xml::{TvDocument, XmlProgramme};

/// Title used when a programme has no `<title>` element.
pub const DEFAULT_TITLE: &str = "Unknown Program";

/// Regex for the first 4-digit group of a `<date>` value.
#[allow(clippy::expect_used)]
static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})").expect("failed to compile year regex"));

/// Builds a malformed-document error with a preview of the input.
fn xml_decode_error(err: &quick_xml::DeError, xml: &str) -> GuideError {
    let preview_end = xml.floor_char_boundary(200);
    let preview = xml.get(..preview_end).unwrap_or_default();
    GuideError::MalformedDocument(format!(
        "XML decoding failed (len={}): {err}; preview: {preview}",
        xml.len()
    ))
}

/// Checks that the document has exactly one root element and nothing but
/// whitespace, comments and processing instructions around it.
///
/// The serde pass stops reading once the first root element closes, so
/// trailing content is only caught here.
fn check_single_root(document: &str) -> Result<(), GuideError> {
    let mut reader = Reader::from_str(document);
    let mut depth: usize = 0;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            GuideError::MalformedDocument(format!(
                "XML syntax error at position {}: {e}",
                reader.error_position()
            ))
        })?;
        let misplaced = match event {
            Event::Start(_) => {
                let second_root = depth == 0 && seen_root;
                seen_root = true;
                depth = depth.saturating_add(1);
                second_root.then_some("second root element")
            }
            Event::Empty(_) => {
                let second_root = depth == 0 && seen_root;
                seen_root = true;
                second_root.then_some("second root element")
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                None
            }
            Event::Text(text) if depth == 0 => (!text.iter().all(u8::is_ascii_whitespace))
                .then_some("text outside the root element"),
            Event::CData(_) | Event::GeneralRef(_) if depth == 0 => {
                Some("content outside the root element")
            }
            Event::Eof => return Ok(()),
            _ => None,
        };
        if let Some(what) = misplaced {
            return Err(GuideError::MalformedDocument(format!(
                "{what} at position {}",
                reader.buffer_position()
            )));
        }
    }
}

/// Extracts the release year from a `<date>` value.
fn release_year(date: Option<&str>) -> Option<String> {
    let caps = YEAR_RE.captures(date?.trim())?;
    Some(caps.get(1)?.as_str().to_owned())
}

/// Builds the episode label.
///
/// The on-screen code wins (with `": sub-title"` appended when a sub-title
/// has text); otherwise the release year; otherwise empty.
///
/// An `onscreen` element with empty text counts as no code: the sub-title
/// is never emitted on its own as `": sub-title"`.
fn episode_label(programme: &XmlProgramme, year: Option<&str>) -> String {
    let mut label = programme
        .onscreen_episode()
        .map(str::to_owned)
        .unwrap_or_default();

    if !label.is_empty()
        && let Some(sub_title) = programme.first_sub_title().filter(|s| !s.is_empty())
    {
        label.push_str(": ");
        label.push_str(sub_title);
    }

    if label.is_empty()
        && let Some(year) = year
    {
        label.push_str(year);
    }
    label
}

/// Converts one `<programme>`. Returns `None` when a timestamp is unusable.
fn to_entry(programme: &XmlProgramme, now: DateTime<Local>) -> Option<ProgramEntry> {
    let times = parse_timestamp_at(programme.start.as_deref(), now).and_then(|start| {
        parse_timestamp_at(programme.stop.as_deref(), now).map(|stop| (start, stop))
    });
    let (start, stop) = match times {
        Ok(times) => times,
        Err(e) => {
            tracing::warn!(
                start = ?programme.start,
                stop = ?programme.stop,
                error = %e,
                "Skipping programme with invalid timestamp"
            );
            return None;
        }
    };

    let year = release_year(programme.date.as_deref());
    let episode = episode_label(programme, year.as_deref());

    Some(ProgramEntry {
        title: programme
            .first_title()
            .map_or_else(|| String::from(DEFAULT_TITLE), str::to_owned),
        description: programme
            .first_description()
            .map(str::to_owned)
            .unwrap_or_default(),
        episode,
        release_year: year,
        start,
        stop,
        is_current: start <= now && now < stop,
    })
}

/// Parses an XMLTV document into the timeline of one channel.
///
/// Selects `<programme>` elements whose `channel` attribute equals
/// `channel_id`, drops those that stopped at or before `now`, and sorts the
/// rest by start time. Pure: the result depends only on the arguments.
///
/// # Errors
///
/// - [`GuideError::MalformedDocument`] if the document is not well-formed
///   (including content after the root element) or cannot be decoded.
/// - [`GuideError::NoScheduleData`] if no programme matches `channel_id`.
///
/// Matching programmes that have all ended produce `Ok` with an empty
/// timeline.
pub fn parse(
    document: &str,
    channel_id: &str,
    now: DateTime<Local>,
) -> Result<Timeline, GuideError> {
    check_single_root(document)?;
    let raw_result: Result<TvDocument, _> = quick_xml::de::from_str(document);
    let doc = raw_result.map_err(|e| xml_decode_error(&e, document))?;

    let matching: Vec<&XmlProgramme> = doc
        .programmes
        .iter()
        .filter(|p| p.channel == channel_id)
        .collect();

    if matching.is_empty() {
        return Err(GuideError::NoScheduleData(String::from(channel_id)));
    }
    tracing::debug!(
        channel = channel_id,
        count = matching.len(),
        "Found scheduled items for channel"
    );

    let entries = matching
        .into_iter()
        .filter_map(|p| to_entry(p, now))
        .filter(|entry| entry.stop > now)
        .collect();

    Ok(Timeline::new(entries))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::TimeZone;

    use super::*;

    const CHANNEL: &str = "C1.145.ersatztv.org";
    const SAMPLE: &str = include_str!("../../../../fixtures/xmltv/sample.xml");

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap()
    }

    fn programme(channel: &str, start: &str, stop: &str, body: &str) -> String {
        format!(
            r#"<programme channel="{channel}" start="{start}" stop="{stop}">{body}</programme>"#
        )
    }

    fn document(programmes: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><tv>{}</tv>"#,
            programmes.concat()
        )
    }

    #[test]
    fn test_parse_sample_selects_channel_and_drops_ended() {
        // Arrange
        let now = local(2024, 3, 15, 14, 15);

        // Act
        let timeline = parse(SAMPLE, CHANNEL, now).unwrap();

        // Assert
        let titles: Vec<&str> = timeline.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Morning Cartoons", "Nature Hour", "Late Movie"]);
        assert!(timeline.entries()[0].is_current);
        assert!(!timeline.entries()[1].is_current);
        assert_eq!(timeline.current().unwrap().title, "Morning Cartoons");
    }

    #[test]
    fn test_parse_sample_fields() {
        // Arrange
        let now = local(2024, 3, 15, 13, 0);

        // Act
        let timeline = parse(SAMPLE, CHANNEL, now).unwrap();

        // Assert
        let entries = timeline.entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].title, "Early Show");
        assert_eq!(entries[1].episode, "S01E05: The Big Race");
        assert_eq!(entries[1].release_year, None);
        assert_eq!(entries[2].episode, "2019");
        assert_eq!(entries[2].release_year.as_deref(), Some("2019"));
        assert_eq!(
            entries[2].description,
            "<p>Wolves of the north.<br/>Narrated by a very calm voice.</p>"
        );
        assert_eq!(entries[3].episode, "1999");
        assert_eq!(entries[3].description, "");
        assert_eq!(entries[3].start, local(2024, 3, 15, 15, 0));
        assert_eq!(entries[3].stop, local(2024, 3, 15, 16, 30));
    }

    #[test]
    fn test_parse_is_idempotent() {
        // Arrange
        let now = local(2024, 3, 15, 14, 15);

        // Act
        let first = parse(SAMPLE, CHANNEL, now).unwrap();
        let second = parse(SAMPLE, CHANNEL, now).unwrap();

        // Assert
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_orders_by_start() {
        // Arrange
        let doc = document(&[
            programme(CHANNEL, "20240315160000", "20240315170000", "<title>C</title>"),
            programme(CHANNEL, "20240315140000", "20240315150000", "<title>A</title>"),
            programme(CHANNEL, "20240315150000", "20240315160000", "<title>B</title>"),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        let starts: Vec<_> = timeline.iter().map(|e| e.start).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(timeline.entries()[0].title, "A");
    }

    #[test]
    fn test_parse_ignores_other_channels() {
        // Arrange
        let doc = document(&[
            programme("C9.999.other", "20240315140000", "20240315150000", "<title>X</title>"),
            programme(CHANNEL, "20240315140000", "20240315150000", "<title>Y</title>"),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].title, "Y");
    }

    #[test]
    fn test_parse_channel_match_is_exact() {
        // Arrange
        let doc = document(&[programme(
            "C1.145.ersatztv.org.backup",
            "20240315140000",
            "20240315150000",
            "<title>X</title>",
        )]);

        // Act
        let result = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0));

        // Assert
        assert_eq!(result, Err(GuideError::NoScheduleData(String::from(CHANNEL))));
    }

    #[test]
    fn test_parse_all_ended_is_empty_not_missing() {
        // Arrange
        let ended = document(&[programme(
            CHANNEL,
            "20200101000000",
            "20200101010000",
            "<title>Old</title>",
        )]);
        let elsewhere = document(&[programme(
            "C2.146.ersatztv.org",
            "20240315140000",
            "20240315150000",
            "<title>Other</title>",
        )]);
        let now = local(2024, 1, 1, 0, 0);

        // Act
        let filtered = parse(&ended, CHANNEL, now).unwrap();
        let missing = parse(&elsewhere, CHANNEL, now);

        // Assert
        assert!(filtered.is_empty());
        assert_eq!(missing, Err(GuideError::NoScheduleData(String::from(CHANNEL))));
    }

    #[test]
    fn test_parse_stop_equal_to_now_is_dropped() {
        // Arrange
        let doc = document(&[
            programme(CHANNEL, "20240315140000", "20240315150000", "<title>A</title>"),
            programme(CHANNEL, "20240315150000", "20240315160000", "<title>B</title>"),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 15, 0)).unwrap();

        // Assert
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].title, "B");
        assert!(timeline.entries()[0].is_current);
    }

    #[test]
    fn test_episode_labels() {
        // Arrange
        let doc = document(&[
            programme(
                CHANNEL,
                "20240315140000",
                "20240315150000",
                r#"<title>A</title><episode-num system="onscreen">101</episode-num><sub-title>Pilot</sub-title>"#,
            ),
            programme(
                CHANNEL,
                "20240315150000",
                "20240315160000",
                "<title>B</title><date>2019-05-01</date>",
            ),
            programme(CHANNEL, "20240315160000", "20240315170000", "<title>C</title>"),
            programme(
                CHANNEL,
                "20240315170000",
                "20240315180000",
                r#"<title>D</title><episode-num system="onscreen">102</episode-num><sub-title></sub-title><date>2020</date>"#,
            ),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        let episodes: Vec<&str> = timeline.iter().map(|e| e.episode.as_str()).collect();
        assert_eq!(episodes, ["101: Pilot", "2019", "", "102"]);
        assert_eq!(timeline.entries()[3].release_year.as_deref(), Some("2020"));
    }

    #[test]
    fn test_missing_title_uses_placeholder() {
        // Arrange
        let doc = document(&[
            programme(CHANNEL, "20240315140000", "20240315150000", ""),
            programme(CHANNEL, "20240315150000", "20240315160000", "<title></title>"),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        assert_eq!(timeline.entries()[0].title, DEFAULT_TITLE);
        assert_eq!(timeline.entries()[1].title, "");
    }

    #[test]
    fn test_invalid_timestamp_is_skipped() {
        // Arrange
        let doc = document(&[
            programme(CHANNEL, "2024031514", "20240315150000", "<title>Bad</title>"),
            programme(CHANNEL, "20240315150000", "20240315160000", "<title>Good</title>"),
        ]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.entries()[0].title, "Good");
    }

    #[test]
    fn test_missing_start_means_now() {
        // Arrange
        let now = local(2024, 3, 15, 12, 0);
        let doc = document(&[format!(
            r#"<programme channel="{CHANNEL}" stop="20240315130000"><title>Now</title></programme>"#
        )]);

        // Act
        let timeline = parse(&doc, CHANNEL, now).unwrap();

        // Assert
        assert_eq!(timeline.entries()[0].start, now);
        assert!(timeline.entries()[0].is_current);
    }

    #[test]
    fn test_malformed_document() {
        // Arrange
        let doc = r#"<tv><programme channel="C1.145.ersatztv.org" start="2024"#;

        // Act
        let result = parse(doc, CHANNEL, local(2024, 3, 15, 12, 0));

        // Assert
        assert!(matches!(result, Err(GuideError::MalformedDocument(_))));
    }

    #[test]
    fn test_trailing_content_after_root_is_malformed() {
        // Arrange
        let body = programme(CHANNEL, "20240315140000", "20240315150000", "<title>A</title>");
        let docs = [
            format!("<tv>{body}</tv><junk"),
            format!("<tv>{body}</tv><tv>{body}</tv>"),
            format!("<tv>{body}</tv><extra/>"),
            format!("<tv>{body}</tv>trailing text"),
        ];

        for doc in &docs {
            // Act
            let result = parse(doc, CHANNEL, local(2024, 3, 15, 12, 0));

            // Assert
            assert!(
                matches!(result, Err(GuideError::MalformedDocument(_))),
                "{doc}: {result:?}"
            );
        }
    }

    #[test]
    fn test_whitespace_and_comments_after_root_are_accepted() {
        // Arrange
        let body = programme(CHANNEL, "20240315140000", "20240315150000", "<title>A</title>");
        let doc = format!("<tv>{body}</tv>\n<!-- generated -->\n");

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        // Arrange
        let doc = "<tv><programme></tv>";

        // Act
        let result = parse(doc, CHANNEL, local(2024, 3, 15, 12, 0));

        // Assert
        assert!(matches!(result, Err(GuideError::MalformedDocument(_))));
    }

    #[test]
    fn test_empty_onscreen_code_falls_back_to_year() {
        // Arrange
        let doc = document(&[programme(
            CHANNEL,
            "20240315140000",
            "20240315150000",
            r#"<title>A</title><episode-num system="onscreen"></episode-num><sub-title>Pilot</sub-title><date>2019</date>"#,
        )]);

        // Act
        let timeline = parse(&doc, CHANNEL, local(2024, 3, 15, 12, 0)).unwrap();

        // Assert
        assert_eq!(timeline.entries()[0].episode, "2019");
    }
}
