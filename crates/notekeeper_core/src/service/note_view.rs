//! Display projection for the note list.
//!
//! # Responsibility
//! - Derive list-row fields from notes so hosts render without re-deriving.
//!
//! # Invariants
//! - Blank title/content project to `None`, never to whitespace strings.
//! - Projection preserves snapshot order.

use crate::model::note::{is_blank, Note, NoteId};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Row timestamp format, e.g. `Mar 05, 2024 14:30`.
pub const TIMESTAMP_LABEL_FORMAT: &str = "%b %d, %Y %H:%M";

/// One display row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: NoteId,
    /// `None` when the title is blank.
    pub title: Option<String>,
    /// `None` when the content is blank.
    pub content: Option<String>,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Creation time rendered with [`TIMESTAMP_LABEL_FORMAT`].
    pub timestamp_label: String,
}

impl NoteListItem {
    /// Builds a row with the label rendered in `tz`.
    ///
    /// Pass `&chrono::Local` on hosts; each instant then uses the offset in
    /// effect at that instant, across daylight-saving changes.
    pub fn from_note<Tz>(note: &Note, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            id: note.id(),
            title: non_blank(note.title()),
            content: non_blank(note.content()),
            timestamp: note.timestamp(),
            timestamp_label: format_timestamp(note.timestamp(), tz),
        }
    }
}

/// Projects a snapshot into display rows.
pub fn note_list_items<Tz>(notes: &[Note], tz: &Tz) -> Vec<NoteListItem>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    notes
        .iter()
        .map(|note| NoteListItem::from_note(note, tz))
        .collect()
}

/// Renders epoch milliseconds in `tz`.
///
/// Returns an empty string for instants chrono cannot represent.
pub fn format_timestamp<Tz>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|utc| {
            utc.with_timezone(tz)
                .format(TIMESTAMP_LABEL_FORMAT)
                .to_string()
        })
        .unwrap_or_default()
}

fn non_blank(text: &str) -> Option<String> {
    if is_blank(text) {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, note_list_items};
    use crate::model::note::Note;
    use chrono::FixedOffset;
    use uuid::Uuid;

    const MAR_05_2024_1430_UTC: i64 = 1_709_649_000_000;

    #[test]
    fn format_timestamp_uses_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            format_timestamp(MAR_05_2024_1430_UTC, &utc),
            "Mar 05, 2024 14:30"
        );
        assert_eq!(
            format_timestamp(MAR_05_2024_1430_UTC, &plus_two),
            "Mar 05, 2024 16:30"
        );
    }

    #[test]
    fn blank_fields_project_to_none_and_order_is_kept() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let notes = vec![
            Note::with_id(Uuid::new_v4(), "  ", "Body", 2),
            Note::with_id(Uuid::new_v4(), "Title", "\n", 1),
        ];

        let items = note_list_items(&notes, &utc);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, None);
        assert_eq!(items[0].content.as_deref(), Some("Body"));
        assert_eq!(items[1].title.as_deref(), Some("Title"));
        assert_eq!(items[1].content, None);
        assert_eq!(items[1].id, notes[1].id());
    }
}
