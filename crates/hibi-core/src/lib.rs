//! hibi-core: diary record types, paged storage, and the list/search
//! pagination engine (grouping, diffing, scroll-edge load trigger).

pub mod diff;
pub mod group;
pub mod model;
pub mod pager;
pub mod scroll;
pub mod store;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub use group::{DayGroup, GroupedList, MonthSection, SectionKind};
pub use model::{
    Condition, Dated, Diary, DiaryId, DiaryItem, ListEntry, NewDiary, SearchHit, SearchRow,
    Weather, MAX_ITEMS,
};
pub use pager::{AllEntries, ListState, PageSource, Pager, PagerEvent, SearchQuery};
pub use scroll::ScrollLoadTrigger;
pub use store::{DiaryStore, StoreError};

#[cfg(feature = "mem-store")]
pub use store::MemStore;
