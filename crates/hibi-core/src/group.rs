//! Two-level grouped list model: day groups folded into year-month sections,
//! with a trailing pseudo-section describing the load state.
//!
//! Pure data, no I/O. The pager builds these from store pages; the UI binding
//! flattens them and the differ reconciles successive snapshots.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::Dated;

/// What a year-month section row represents in the rendered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Real diary rows for one calendar month.
    Entries,
    /// Trailing progress indicator: more unloaded rows are believed to exist.
    LoadingMore,
    /// The list is conclusively empty.
    Empty,
}

/// All rows of one calendar day. In the diary list there is at most one row
/// per day; search keeps the list shape so several matched rows of one day
/// can coexist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup<R> {
    pub date: NaiveDate,
    pub rows: Vec<R>,
}

/// One year-month section: descending day groups plus the section kind tag.
/// Pseudo-sections (`LoadingMore`/`Empty`) carry no days and use year 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSection<R> {
    pub year: i32,
    pub month: u32,
    pub kind: SectionKind,
    pub days: Vec<DayGroup<R>>,
}

impl<R> MonthSection<R> {
    pub fn loading() -> Self {
        MonthSection {
            year: 0,
            month: 0,
            kind: SectionKind::LoadingMore,
            days: Vec::new(),
        }
    }

    pub fn empty_message() -> Self {
        MonthSection {
            year: 0,
            month: 0,
            kind: SectionKind::Empty,
            days: Vec::new(),
        }
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind != SectionKind::Entries
    }
}

/// The full ordered sequence of sections a list screen renders.
///
/// Invariants:
/// - day dates are strictly descending across the whole list;
/// - at most one pseudo-section exists and it is always the last element;
/// - `LoadingMore` trails while more unloaded rows are believed to exist,
///   `Empty` stands alone when the list is conclusively empty, and a complete
///   non-empty list has no pseudo-section at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedList<R> {
    sections: Vec<MonthSection<R>>,
}

impl<R> Default for GroupedList<R> {
    fn default() -> Self {
        GroupedList { sections: Vec::new() }
    }
}

impl<R> GroupedList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The spinner-only list published while the first page is in flight.
    pub fn loading_placeholder() -> Self {
        GroupedList {
            sections: vec![MonthSection::loading()],
        }
    }

    pub fn sections(&self) -> &[MonthSection<R>] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Count of day-level rows across all real sections, used as the next
    /// page's offset.
    pub fn real_row_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.days.iter())
            .map(|d| d.rows.len())
            .sum()
    }

    pub fn ends_in_loading(&self) -> bool {
        matches!(
            self.sections.last().map(|s| s.kind),
            Some(SectionKind::LoadingMore)
        )
    }

    pub fn starts_with_loading(&self) -> bool {
        matches!(
            self.sections.first().map(|s| s.kind),
            Some(SectionKind::LoadingMore)
        )
    }

    /// Newest loaded date, the refresh anchor.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.sections
            .iter()
            .find(|s| !s.is_pseudo())
            .and_then(|s| s.days.first())
            .map(|d| d.date)
    }

    /// All day rows in list order, newest first.
    pub fn rows(&self) -> impl Iterator<Item = &R> {
        self.sections
            .iter()
            .flat_map(|s| s.days.iter())
            .flat_map(|d| d.rows.iter())
    }

    /// All day dates in list order, newest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.days.iter())
            .map(|d| d.date)
    }
}

impl<R: Dated + Clone + PartialEq> GroupedList<R> {
    /// Groups a store page (rows strictly date-descending) into sections and
    /// appends the trailing pseudo-section: `LoadingMore` when `more`, none
    /// when complete, `Empty` when there are no rows at all.
    pub fn from_rows(rows: Vec<R>, more: bool) -> Self {
        if rows.is_empty() {
            return GroupedList {
                sections: vec![MonthSection::empty_message()],
            };
        }
        let mut sections: Vec<MonthSection<R>> = Vec::new();
        for row in rows {
            let date = row.date();
            let same_month = sections
                .last()
                .is_some_and(|s| s.year == date.year() && s.month == date.month());
            if !same_month {
                sections.push(MonthSection {
                    year: date.year(),
                    month: date.month(),
                    kind: SectionKind::Entries,
                    days: Vec::new(),
                });
            }
            let section = sections.last_mut().unwrap();
            let same_day = section.days.last().is_some_and(|day| day.date == date);
            if same_day {
                section.days.last_mut().unwrap().rows.push(row);
            } else {
                section.days.push(DayGroup {
                    date,
                    rows: vec![row],
                });
            }
        }
        if more {
            sections.push(MonthSection::loading());
        }
        GroupedList { sections }
    }

    /// Appends a newly loaded page. `addition` must contain real rows
    /// (precondition, asserted); its pseudo-section and ours are both dropped
    /// and the trailing state is rebuilt from `complete`. A boundary section
    /// covering the same year-month is merged, de-duplicating days by date
    /// (the already-loaded day wins) and keeping days descending.
    pub fn combine(&self, addition: GroupedList<R>, complete: bool) -> Self {
        assert!(
            addition.real_row_count() > 0,
            "combine requires a non-empty addition"
        );
        let mut sections: Vec<MonthSection<R>> = self
            .sections
            .iter()
            .filter(|s| !s.is_pseudo())
            .cloned()
            .collect();
        for incoming in addition.sections.into_iter().filter(|s| !s.is_pseudo()) {
            let same_month = sections
                .last()
                .is_some_and(|last| last.year == incoming.year && last.month == incoming.month);
            if same_month {
                let last = sections.last_mut().unwrap();
                for day in incoming.days {
                    if !last.days.iter().any(|d| d.date == day.date) {
                        last.days.push(day);
                    }
                }
                last.days.sort_by(|a, b| b.date.cmp(&a.date));
            } else {
                sections.push(incoming);
            }
        }
        if sections.is_empty() {
            sections.push(MonthSection::empty_message());
        } else if !complete {
            sections.push(MonthSection::loading());
        }
        GroupedList { sections }
    }

    /// Rebuilds only the trailing pseudo-state over the existing real rows.
    pub fn with_completion(&self, complete: bool) -> Self {
        let mut sections: Vec<MonthSection<R>> = self
            .sections
            .iter()
            .filter(|s| !s.is_pseudo())
            .cloned()
            .collect();
        if sections.is_empty() {
            sections.push(MonthSection::empty_message());
        } else if !complete {
            sections.push(MonthSection::loading());
        }
        GroupedList { sections }
    }
}
