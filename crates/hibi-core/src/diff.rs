//! Minimal update operations between two list snapshots.
//!
//! Identity decides whether two rows are the same on-screen item; content
//! decides whether a kept row needs a redraw. One tie-break: two
//! `LoadingMore` sections never compare as the same item, so the initial-load
//! spinner and the end-of-list spinner always diff as a remove+insert pair —
//! the UI must not scroll-anchor to a spinner that survives the first load.

use crate::group::{DayGroup, MonthSection, SectionKind};
use crate::model::{ListEntry, SearchRow};

/// Row-level identity and content rules the UI binding relies on.
pub trait DiffItem {
    fn same_item(&self, other: &Self) -> bool;
    fn same_content(&self, other: &Self) -> bool;
}

/// One incremental update step. `Remove` indexes into the old list, `Insert`
/// and `Change` into the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Insert { at: usize },
    Remove { at: usize },
    Change { at: usize },
}

/// Edit script turning `old` into `new`: longest common subsequence over
/// `same_item`, then a `Change` for every kept row whose content differs.
pub fn diff<T: DiffItem>(old: &[T], new: &[T]) -> Vec<DiffOp> {
    let n = old.len();
    let m = new.len();
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i].same_item(&new[j]) {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i].same_item(&new[j]) {
            if !old[i].same_content(&new[j]) {
                ops.push(DiffOp::Change { at: j });
            }
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(DiffOp::Remove { at: i });
            i += 1;
        } else {
            ops.push(DiffOp::Insert { at: j });
            j += 1;
        }
    }
    while i < n {
        ops.push(DiffOp::Remove { at: i });
        i += 1;
    }
    while j < m {
        ops.push(DiffOp::Insert { at: j });
        j += 1;
    }
    ops
}

impl<R: PartialEq> DiffItem for MonthSection<R> {
    fn same_item(&self, other: &Self) -> bool {
        if self.kind == SectionKind::LoadingMore || other.kind == SectionKind::LoadingMore {
            return false;
        }
        self.kind == other.kind && self.year == other.year && self.month == other.month
    }

    fn same_content(&self, other: &Self) -> bool {
        self.days == other.days
    }
}

impl<R: PartialEq> DiffItem for DayGroup<R> {
    fn same_item(&self, other: &Self) -> bool {
        self.date == other.date
    }

    fn same_content(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl DiffItem for ListEntry {
    fn same_item(&self, other: &Self) -> bool {
        self.date == other.date
    }

    fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}

impl DiffItem for SearchRow {
    fn same_item(&self, other: &Self) -> bool {
        self.date == other.date
    }

    // Only the rendered excerpt fields count; highlight parameters are
    // rendering inputs, not content.
    fn same_content(&self, other: &Self) -> bool {
        self.title == other.title
            && self.item_no == other.item_no
            && self.item_title == other.item_title
            && self.item_comment == other.item_comment
    }
}
