use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use hibi_core::{GroupedList, ListEntry, ScrollLoadTrigger};

fn entry(y: i32, m: u32, day: u32) -> ListEntry {
    ListEntry {
        id: (y as i64) * 10_000 + (m as i64) * 100 + day as i64,
        date: NaiveDate::from_ymd_opt(y, m, day).unwrap(),
        title: "entry".to_string(),
        photo: None,
    }
}

fn counting_trigger() -> (ScrollLoadTrigger, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&fired);
    let trigger = ScrollLoadTrigger::new(move || {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    (trigger, fired)
}

/// A month of rows plus the trailing progress section (two sections total).
fn open_list() -> GroupedList<ListEntry> {
    GroupedList::from_rows(vec![entry(2024, 3, 15), entry(2024, 3, 2)], true)
}

fn complete_list() -> GroupedList<ListEntry> {
    GroupedList::from_rows(vec![entry(2024, 3, 15), entry(2024, 3, 2)], false)
}

#[test]
fn fires_once_at_trailing_progress_row() {
    let (mut trigger, fired) = counting_trigger();
    let list = open_list();
    let last = list.len() - 1;

    trigger.on_scroll(3, last, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(trigger.is_load_requested());

    // further scroll events while disarmed do nothing
    trigger.on_scroll(3, last, &list);
    trigger.on_scroll(0, last, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn zero_delta_counts_as_forward() {
    let (mut trigger, fired) = counting_trigger();
    let list = open_list();
    trigger.on_scroll(0, list.len() - 1, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn backward_scroll_never_fires() {
    let (mut trigger, fired) = counting_trigger();
    let list = open_list();
    trigger.on_scroll(-1, list.len() - 1, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn spinner_only_list_never_fires() {
    let (mut trigger, fired) = counting_trigger();
    let list = GroupedList::<ListEntry>::loading_placeholder();
    trigger.on_scroll(1, 0, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn mid_list_position_never_fires() {
    let (mut trigger, fired) = counting_trigger();
    let list = open_list();
    trigger.on_scroll(5, list.len() - 2, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn complete_list_never_fires() {
    let (mut trigger, fired) = counting_trigger();
    let list = complete_list();
    trigger.on_scroll(5, list.len() - 1, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn rearms_only_after_real_list_change() {
    let (mut trigger, fired) = counting_trigger();
    let list = open_list();
    let last = list.len() - 1;
    trigger.on_scroll(2, last, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // the initial placeholder being (re)shown is not "load finished"
    trigger.on_list_changed(&GroupedList::<ListEntry>::loading_placeholder());
    trigger.on_scroll(2, last, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // a visible update with real rows re-arms the trigger
    trigger.on_list_changed(&list);
    trigger.on_scroll(2, last, &list);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}
