//! Flattens grouped lists into plain text: year-month headers, indented day
//! rows, and the pseudo rows for the loading and empty states.

use std::ops::Range;

use hibi_core::{GroupedList, ListEntry, SearchRow, SectionKind};

pub fn render_entries(list: &GroupedList<ListEntry>) -> String {
    let mut out = String::new();
    for section in list.sections() {
        match section.kind {
            SectionKind::LoadingMore => out.push_str("  … loading more\n"),
            SectionKind::Empty => out.push_str("  no diary entries yet\n"),
            SectionKind::Entries => {
                out.push_str(&format!("{}-{:02}\n", section.year, section.month));
                for day in &section.days {
                    for row in &day.rows {
                        let photo = if row.photo.is_some() { "  [photo]" } else { "" };
                        out.push_str(&format!("  {}  {}{}\n", row.date, row.title, photo));
                    }
                }
            }
        }
    }
    out
}

pub fn render_search(list: &GroupedList<SearchRow>) -> String {
    let mut out = String::new();
    for section in list.sections() {
        match section.kind {
            SectionKind::LoadingMore => out.push_str("  … loading more\n"),
            SectionKind::Empty => out.push_str("  no matching entries\n"),
            SectionKind::Entries => {
                out.push_str(&format!("{}-{:02}\n", section.year, section.month));
                for day in &section.days {
                    for row in &day.rows {
                        out.push_str(&format!(
                            "  {}  {}\n",
                            row.date,
                            mark(&row.title, &row.title_spans)
                        ));
                        out.push_str(&format!(
                            "      #{} {}: {}\n",
                            row.item_no,
                            mark(&row.item_title, &row.item_title_spans),
                            mark(&row.item_comment, &row.item_comment_spans)
                        ));
                    }
                }
            }
        }
    }
    out
}

/// Wraps every matched span in brackets: "the [sea]side".
fn mark(text: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::from(text);
    for span in spans.iter().rev() {
        out.insert(span.end, ']');
        out.insert(span.start, '[');
    }
    out
}
