//! Diary records and the read-only row models the list/search screens render.

use std::ops::Range;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type DiaryId = i64;

/// An entry holds at most five titled item sections.
pub const MAX_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

impl Weather {
    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Snowy => "snowy",
            Weather::Stormy => "stormy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sunny" => Some(Weather::Sunny),
            "cloudy" => Some(Weather::Cloudy),
            "rainy" => Some(Weather::Rainy),
            "snowy" => Some(Weather::Snowy),
            "stormy" => Some(Weather::Stormy),
            _ => None,
        }
    }
}

/// Mood recorded alongside the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Great,
    Good,
    Average,
    Poor,
    Awful,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Great => "great",
            Condition::Good => "good",
            Condition::Average => "average",
            Condition::Poor => "poor",
            Condition::Awful => "awful",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "great" => Some(Condition::Great),
            "good" => Some(Condition::Good),
            "average" => Some(Condition::Average),
            "poor" => Some(Condition::Poor),
            "awful" => Some(Condition::Awful),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryItem {
    pub title: String,
    pub comment: String,
}

/// Full diary record as stored. One entry per calendar date; the date is the
/// business key, `id` stays stable across edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    pub id: DiaryId,
    pub date: NaiveDate,
    pub title: String,
    pub weather: Option<Weather>,
    pub condition: Option<Condition>,
    /// Positional item sections 1..=5; unused slots are `None`.
    pub items: [Option<DiaryItem>; MAX_ITEMS],
    pub photo: Option<String>,
}

/// Payload for creating or replacing an entry; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiary {
    pub date: NaiveDate,
    pub title: String,
    pub weather: Option<Weather>,
    pub condition: Option<Condition>,
    pub items: [Option<DiaryItem>; MAX_ITEMS],
    pub photo: Option<String>,
}

/// Diary-list row. Produced read-only from storage; an edited entry yields a
/// new `ListEntry` with the same `id`/`date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: DiaryId,
    pub date: NaiveDate,
    pub title: String,
    /// Opaque handle to an attached picture, when one exists.
    pub photo: Option<String>,
}

/// Raw search-result row as returned by the store, before match extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub date: NaiveDate,
    pub title: String,
    pub items: [Option<DiaryItem>; MAX_ITEMS],
}

/// Search-result presentation row: the hit plus the located match spans and
/// the one item section shown as the excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRow {
    pub date: NaiveDate,
    pub title: String,
    pub title_spans: Vec<Range<usize>>,
    /// 1-based number of the excerpted item section.
    pub item_no: usize,
    pub item_title: String,
    pub item_comment: String,
    pub item_title_spans: Vec<Range<usize>>,
    pub item_comment_spans: Vec<Range<usize>>,
}

impl SearchRow {
    /// Locates `word` in the hit's title and picks the first item section
    /// containing it as the excerpt. When no item matches (title-only hit),
    /// item #1 is still shown; the excerpt then carries no spans. Longstanding
    /// app behavior, kept.
    pub fn from_hit(hit: &SearchHit, word: &str) -> Self {
        let matched = hit.items.iter().enumerate().find(|(_, slot)| {
            slot.as_ref()
                .is_some_and(|it| it.title.contains(word) || it.comment.contains(word))
        });
        let (idx, item) = match matched {
            Some((idx, slot)) => (idx, slot.clone().unwrap_or_default()),
            None => (0, hit.items[0].clone().unwrap_or_default()),
        };
        SearchRow {
            date: hit.date,
            title: hit.title.clone(),
            title_spans: find_spans(&hit.title, word),
            item_no: idx + 1,
            item_title_spans: find_spans(&item.title, word),
            item_comment_spans: find_spans(&item.comment, word),
            item_title: item.title,
            item_comment: item.comment,
        }
    }
}

/// Byte ranges of every occurrence of `word` in `text`.
fn find_spans(text: &str, word: &str) -> Vec<Range<usize>> {
    if word.is_empty() {
        return Vec::new();
    }
    text.match_indices(word).map(|(i, m)| i..i + m.len()).collect()
}

/// Anything carrying a calendar date, so the grouping layer can fold rows
/// into day and year-month groups.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for ListEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for SearchHit {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for SearchRow {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
