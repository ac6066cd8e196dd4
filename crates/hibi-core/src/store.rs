//! Storage contract the pagination engine consumes, plus the in-memory
//! backend used by tests and scaffolding.

use chrono::NaiveDate;

use crate::model::{Diary, DiaryId, ListEntry, NewDiary, SearchHit};

/// Single opaque storage-access failure. Whatever the backend raised is
/// folded into this kind at the store boundary; callers only report or retry.
#[derive(Debug, Clone, thiserror::Error)]
#[error("diary store access failed: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::new(err.to_string())
    }
}

/// Paged read operations plus the entry-form write side.
///
/// Reads return rows strictly ordered by date descending. `limit >= 1` and a
/// non-empty search word are caller preconditions (violations panic, they are
/// not recoverable errors). The search match is a plain substring test
/// applied independently to the title and all ten item title/comment fields;
/// a row qualifies if any field contains the word.
pub trait DiaryStore: Send + Sync {
    fn count_all(&self) -> Result<usize, StoreError>;
    fn count_matching(&self, word: &str) -> Result<usize, StoreError>;
    /// With `anchor`, only rows dated at or before it are returned, so a
    /// refresh does not shift under rows added with newer dates.
    fn select_page(
        &self,
        limit: usize,
        offset: usize,
        anchor: Option<NaiveDate>,
    ) -> Result<Vec<ListEntry>, StoreError>;
    fn select_search_page(
        &self,
        limit: usize,
        offset: usize,
        word: &str,
    ) -> Result<Vec<SearchHit>, StoreError>;

    fn insert(&self, diary: &NewDiary) -> Result<Diary, StoreError>;
    fn update(&self, id: DiaryId, diary: &NewDiary) -> Result<(), StoreError>;
    fn get(&self, id: DiaryId) -> Result<Option<Diary>, StoreError>;
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Diary>, StoreError>;
    fn delete(&self, id: DiaryId) -> Result<(), StoreError>;
}

pub(crate) fn check_page_args(limit: usize) {
    assert!(limit >= 1, "page limit must be at least 1");
}

pub(crate) fn check_search_word(word: &str) {
    assert!(!word.is_empty(), "search word must be non-empty");
}

/// Minimal in-memory store; backs engine tests and the pre-sqlite scaffold.
#[cfg(feature = "mem-store")]
pub use mem::MemStore;

#[cfg(feature = "mem-store")]
mod mem {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::RwLock;

    use super::*;

    fn matches_word(diary: &Diary, word: &str) -> bool {
        if diary.title.contains(word) {
            return true;
        }
        diary
            .items
            .iter()
            .flatten()
            .any(|it| it.title.contains(word) || it.comment.contains(word))
    }

    #[derive(Default)]
    pub struct MemStore {
        inner: RwLock<Vec<Diary>>,
        next_id: AtomicI64,
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn sorted_desc(&self) -> Vec<Diary> {
            let mut all = self.inner.read().expect("poisoned").clone();
            all.sort_by(|a, b| b.date.cmp(&a.date));
            all
        }
    }

    impl DiaryStore for MemStore {
        fn count_all(&self) -> Result<usize, StoreError> {
            Ok(self.inner.read().expect("poisoned").len())
        }

        fn count_matching(&self, word: &str) -> Result<usize, StoreError> {
            check_search_word(word);
            let v = self.inner.read().expect("poisoned");
            Ok(v.iter().filter(|d| matches_word(d, word)).count())
        }

        fn select_page(
            &self,
            limit: usize,
            offset: usize,
            anchor: Option<NaiveDate>,
        ) -> Result<Vec<ListEntry>, StoreError> {
            check_page_args(limit);
            Ok(self
                .sorted_desc()
                .into_iter()
                .filter(|d| anchor.map_or(true, |a| d.date <= a))
                .skip(offset)
                .take(limit)
                .map(|d| ListEntry {
                    id: d.id,
                    date: d.date,
                    title: d.title,
                    photo: d.photo,
                })
                .collect())
        }

        fn select_search_page(
            &self,
            limit: usize,
            offset: usize,
            word: &str,
        ) -> Result<Vec<SearchHit>, StoreError> {
            check_page_args(limit);
            check_search_word(word);
            Ok(self
                .sorted_desc()
                .into_iter()
                .filter(|d| matches_word(d, word))
                .skip(offset)
                .take(limit)
                .map(|d| SearchHit {
                    date: d.date,
                    title: d.title,
                    items: d.items,
                })
                .collect())
        }

        fn insert(&self, diary: &NewDiary) -> Result<Diary, StoreError> {
            let mut v = self.inner.write().expect("poisoned");
            if v.iter().any(|d| d.date == diary.date) {
                return Err(StoreError::new(format!(
                    "an entry for {} already exists",
                    diary.date
                )));
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
            let stored = Diary {
                id,
                date: diary.date,
                title: diary.title.clone(),
                weather: diary.weather,
                condition: diary.condition,
                items: diary.items.clone(),
                photo: diary.photo.clone(),
            };
            v.push(stored.clone());
            Ok(stored)
        }

        fn update(&self, id: DiaryId, diary: &NewDiary) -> Result<(), StoreError> {
            let mut v = self.inner.write().expect("poisoned");
            match v.iter_mut().find(|d| d.id == id) {
                Some(d) => {
                    d.date = diary.date;
                    d.title = diary.title.clone();
                    d.weather = diary.weather;
                    d.condition = diary.condition;
                    d.items = diary.items.clone();
                    d.photo = diary.photo.clone();
                    Ok(())
                }
                None => Err(StoreError::new(format!("no diary with id {id}"))),
            }
        }

        fn get(&self, id: DiaryId) -> Result<Option<Diary>, StoreError> {
            let v = self.inner.read().expect("poisoned");
            Ok(v.iter().find(|d| d.id == id).cloned())
        }

        fn get_by_date(&self, date: NaiveDate) -> Result<Option<Diary>, StoreError> {
            let v = self.inner.read().expect("poisoned");
            Ok(v.iter().find(|d| d.date == date).cloned())
        }

        fn delete(&self, id: DiaryId) -> Result<(), StoreError> {
            let mut v = self.inner.write().expect("poisoned");
            v.retain(|d| d.id != id);
            Ok(())
        }
    }
}
