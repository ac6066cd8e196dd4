use chrono::NaiveDate;
use hibi_core::{GroupedList, ListEntry, SectionKind};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn entry(y: i32, m: u32, day: u32) -> ListEntry {
    ListEntry {
        id: (y as i64) * 10_000 + (m as i64) * 100 + day as i64,
        date: d(y, m, day),
        title: format!("entry {y}-{m:02}-{day:02}"),
        photo: None,
    }
}

#[test]
fn groups_by_month_then_day() {
    let list = GroupedList::from_rows(
        vec![entry(2024, 3, 15), entry(2024, 3, 2), entry(2024, 2, 28)],
        false,
    );
    let sections = list.sections();
    assert_eq!(sections.len(), 2);
    assert_eq!((sections[0].year, sections[0].month), (2024, 3));
    assert_eq!(sections[0].days.len(), 2);
    assert_eq!((sections[1].year, sections[1].month), (2024, 2));
    assert_eq!(sections[1].days.len(), 1);
    assert!(sections.iter().all(|s| s.kind == SectionKind::Entries));
}

#[test]
fn day_dates_strictly_descending() {
    let list = GroupedList::from_rows(
        vec![
            entry(2024, 3, 15),
            entry(2024, 3, 2),
            entry(2024, 2, 28),
            entry(2023, 12, 31),
        ],
        true,
    );
    let dates: Vec<_> = list.dates().collect();
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn trailing_progress_section_only_when_more() {
    let more = GroupedList::from_rows(vec![entry(2024, 3, 15)], true);
    assert!(more.ends_in_loading());
    assert!(more.sections()[..more.len() - 1]
        .iter()
        .all(|s| s.kind == SectionKind::Entries));

    let complete = GroupedList::from_rows(vec![entry(2024, 3, 15)], false);
    assert!(!complete.ends_in_loading());
    assert!(complete.sections().iter().all(|s| s.kind == SectionKind::Entries));
}

#[test]
fn no_rows_yields_single_empty_message() {
    let list = GroupedList::<ListEntry>::from_rows(vec![], false);
    assert_eq!(list.len(), 1);
    assert_eq!(list.sections()[0].kind, SectionKind::Empty);
    assert_eq!(list.real_row_count(), 0);
}

#[test]
fn combine_merges_overlapping_month() {
    // A covers [2024-03, 2024-02], B covers [2024-02, 2024-01]; the shared
    // 2024-02-20 day appears in both pages.
    let a = GroupedList::from_rows(
        vec![entry(2024, 3, 10), entry(2024, 2, 25), entry(2024, 2, 20)],
        true,
    );
    let b = GroupedList::from_rows(
        vec![entry(2024, 2, 20), entry(2024, 2, 5), entry(2024, 1, 30)],
        false,
    );
    let merged = a.combine(b, true);

    let months: Vec<_> = merged
        .sections()
        .iter()
        .map(|s| (s.year, s.month))
        .collect();
    assert_eq!(months, vec![(2024, 3), (2024, 2), (2024, 1)]);

    let feb = &merged.sections()[1];
    let feb_days: Vec<_> = feb.days.iter().map(|day| day.date).collect();
    assert_eq!(feb_days, vec![d(2024, 2, 25), d(2024, 2, 20), d(2024, 2, 5)]);

    let dates: Vec<_> = merged.dates().collect();
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(merged.real_row_count(), 5);
}

#[test]
fn combine_replaces_trailing_pseudo_section() {
    let a = GroupedList::from_rows(vec![entry(2024, 3, 10)], true);
    let b = GroupedList::from_rows(vec![entry(2024, 2, 1)], true);
    let still_more = a.combine(b, false);
    assert!(still_more.ends_in_loading());
    // exactly one pseudo-section and it is last
    let pseudo: Vec<_> = still_more
        .sections()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_pseudo())
        .collect();
    assert_eq!(pseudo.len(), 1);
    assert_eq!(pseudo[0].0, still_more.len() - 1);

    let a = GroupedList::from_rows(vec![entry(2024, 3, 10)], true);
    let b = GroupedList::from_rows(vec![entry(2024, 2, 1)], true);
    let complete = a.combine(b, true);
    assert!(complete.sections().iter().all(|s| !s.is_pseudo()));
}

#[test]
#[should_panic(expected = "non-empty addition")]
fn combine_requires_rows_in_addition() {
    let a = GroupedList::from_rows(vec![entry(2024, 3, 10)], true);
    let b = GroupedList::<ListEntry>::from_rows(vec![], false);
    let _ = a.combine(b, true);
}

#[test]
fn real_row_count_excludes_pseudo_sections() {
    let list = GroupedList::from_rows(vec![entry(2024, 3, 15), entry(2024, 3, 2)], true);
    assert_eq!(list.len(), 2); // one month section + progress
    assert_eq!(list.real_row_count(), 2);

    assert_eq!(GroupedList::<ListEntry>::loading_placeholder().real_row_count(), 0);
}

#[test]
fn first_date_is_newest_loaded() {
    let list = GroupedList::from_rows(vec![entry(2024, 3, 15), entry(2024, 2, 2)], true);
    assert_eq!(list.first_date(), Some(d(2024, 3, 15)));
    assert_eq!(GroupedList::<ListEntry>::loading_placeholder().first_date(), None);
}

#[test]
fn with_completion_rebuilds_trailing_state() {
    let list = GroupedList::from_rows(vec![entry(2024, 3, 15)], true);
    assert!(!list.with_completion(true).ends_in_loading());
    assert!(list.with_completion(false).ends_in_loading());

    let empty = GroupedList::<ListEntry>::loading_placeholder().with_completion(true);
    assert_eq!(empty.sections()[0].kind, SectionKind::Empty);
}
