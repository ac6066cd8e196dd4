//! SQLite backend: WAL journal, `PRAGMA user_version` migrations embedded at
//! build time, substring search via `instr` across all searchable fields.

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use include_dir::{include_dir, Dir};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::model::{
    Condition, Diary, DiaryId, DiaryItem, ListEntry, NewDiary, SearchHit, Weather, MAX_ITEMS,
};
use crate::store::{check_page_args, check_search_word, DiaryStore, StoreError};

static MIGRATIONS: Dir = include_dir!("$CARGO_MANIFEST_DIR/migrations");

/// Title plus the ten item fields, the columns the substring search covers.
const SEARCH_COLUMNS: [&str; 11] = [
    "title",
    "item1_title",
    "item1_comment",
    "item2_title",
    "item2_comment",
    "item3_title",
    "item3_comment",
    "item4_title",
    "item4_comment",
    "item5_title",
    "item5_comment",
];

const ITEM_COLUMNS: &str = "item1_title, item1_comment, item2_title, item2_comment, \
     item3_title, item3_comment, item4_title, item4_comment, item5_title, item5_comment";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        let _ = conn.busy_timeout(std::time::Duration::from_millis(5000));
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        let current: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        let mut files: Vec<_> = MIGRATIONS
            .files()
            .filter(|f| f.path().extension().map(|e| e == "sql").unwrap_or(false))
            .collect();
        files.sort_by_key(|f| f.path().to_path_buf());
        for file in files {
            let name = file
                .path()
                .file_stem()
                .unwrap()
                .to_string_lossy()
                .to_string();
            let ver = parse_version_prefix(&name).unwrap_or(0) as i64;
            if ver <= current {
                continue;
            }
            let sql = file
                .contents_utf8()
                .ok_or_else(|| StoreError::new(format!("invalid utf-8 in migration {name}")))?;
            let tx = conn.unchecked_transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(&format!("PRAGMA user_version = {ver}"), [])?;
            tx.commit()?;
        }
        Ok(())
    }

    fn search_predicate() -> String {
        SEARCH_COLUMNS
            .iter()
            .map(|c| format!("instr(IFNULL({c}, ''), ?1) > 0"))
            .collect::<Vec<_>>()
            .join(" OR ")
    }

    fn get_where<V: rusqlite::ToSql>(
        &self,
        clause: &str,
        value: V,
    ) -> Result<Option<Diary>, StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        let sql = format!(
            "SELECT id, date, title, weather, condition, {ITEM_COLUMNS}, photo_path \
             FROM diaries WHERE {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        Ok(stmt.query_row(params![value], read_diary).optional()?)
    }
}

fn parse_version_prefix(name: &str) -> Option<u32> {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse::<u32>().ok()
    }
}

fn column_date(idx: usize, text: String) -> rusqlite::Result<NaiveDate> {
    text.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn read_items(row: &Row<'_>, first_col: usize) -> rusqlite::Result<[Option<DiaryItem>; MAX_ITEMS]> {
    let mut items: [Option<DiaryItem>; MAX_ITEMS] = Default::default();
    for (slot, item) in items.iter_mut().enumerate() {
        let title: Option<String> = row.get(first_col + slot * 2)?;
        let comment: Option<String> = row.get(first_col + slot * 2 + 1)?;
        *item = title.map(|title| DiaryItem {
            title,
            comment: comment.unwrap_or_default(),
        });
    }
    Ok(items)
}

fn read_diary(row: &Row<'_>) -> rusqlite::Result<Diary> {
    let weather: Option<String> = row.get(3)?;
    let condition: Option<String> = row.get(4)?;
    Ok(Diary {
        id: row.get(0)?,
        date: column_date(1, row.get(1)?)?,
        title: row.get(2)?,
        weather: weather.as_deref().and_then(Weather::parse),
        condition: condition.as_deref().and_then(Condition::parse),
        items: read_items(row, 5)?,
        photo: row.get(15)?,
    })
}

impl DiaryStore for SqliteStore {
    fn count_all(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM diaries", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    fn count_matching(&self, word: &str) -> Result<usize, StoreError> {
        check_search_word(word);
        let conn = self.conn.lock().expect("poisoned");
        let sql = format!(
            "SELECT COUNT(*) FROM diaries WHERE {}",
            Self::search_predicate()
        );
        let n: i64 = conn.query_row(&sql, params![word], |r| r.get(0))?;
        Ok(n as usize)
    }

    fn select_page(
        &self,
        limit: usize,
        offset: usize,
        anchor: Option<NaiveDate>,
    ) -> Result<Vec<ListEntry>, StoreError> {
        check_page_args(limit);
        let conn = self.conn.lock().expect("poisoned");
        let mut sql = String::from("SELECT id, date, title, photo_path FROM diaries");
        if anchor.is_some() {
            sql.push_str(" WHERE date <= ?3");
        }
        sql.push_str(" ORDER BY date DESC LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&sql)?;
        let map = |row: &Row<'_>| -> rusqlite::Result<ListEntry> {
            Ok(ListEntry {
                id: row.get(0)?,
                date: column_date(1, row.get(1)?)?,
                title: row.get(2)?,
                photo: row.get(3)?,
            })
        };
        let rows = match anchor {
            Some(a) => stmt.query_map(params![limit as i64, offset as i64, a.to_string()], map)?,
            None => stmt.query_map(params![limit as i64, offset as i64], map)?,
        };
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn select_search_page(
        &self,
        limit: usize,
        offset: usize,
        word: &str,
    ) -> Result<Vec<SearchHit>, StoreError> {
        check_page_args(limit);
        check_search_word(word);
        let conn = self.conn.lock().expect("poisoned");
        let sql = format!(
            "SELECT date, title, {ITEM_COLUMNS} FROM diaries WHERE {} \
             ORDER BY date DESC LIMIT ?2 OFFSET ?3",
            Self::search_predicate()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![word, limit as i64, offset as i64], |row| {
            Ok(SearchHit {
                date: column_date(0, row.get(0)?)?,
                title: row.get(1)?,
                items: read_items(row, 2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn insert(&self, diary: &NewDiary) -> Result<Diary, StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        let created_at = chrono::Utc::now().timestamp();
        let sql = format!(
            "INSERT INTO diaries(date, title, weather, condition, {ITEM_COLUMNS}, photo_path, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
        );
        let it = |slot: usize| diary.items[slot].as_ref();
        conn.execute(
            &sql,
            params![
                diary.date.to_string(),
                diary.title,
                diary.weather.map(Weather::as_str),
                diary.condition.map(Condition::as_str),
                it(0).map(|x| x.title.as_str()),
                it(0).map(|x| x.comment.as_str()),
                it(1).map(|x| x.title.as_str()),
                it(1).map(|x| x.comment.as_str()),
                it(2).map(|x| x.title.as_str()),
                it(2).map(|x| x.comment.as_str()),
                it(3).map(|x| x.title.as_str()),
                it(3).map(|x| x.comment.as_str()),
                it(4).map(|x| x.title.as_str()),
                it(4).map(|x| x.comment.as_str()),
                diary.photo,
                created_at,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(Diary {
            id,
            date: diary.date,
            title: diary.title.clone(),
            weather: diary.weather,
            condition: diary.condition,
            items: diary.items.clone(),
            photo: diary.photo.clone(),
        })
    }

    fn update(&self, id: DiaryId, diary: &NewDiary) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        let updated_at = chrono::Utc::now().timestamp();
        let it = |slot: usize| diary.items[slot].as_ref();
        let changed = conn.execute(
            "UPDATE diaries SET date = ?1, title = ?2, weather = ?3, condition = ?4, \
             item1_title = ?5, item1_comment = ?6, item2_title = ?7, item2_comment = ?8, \
             item3_title = ?9, item3_comment = ?10, item4_title = ?11, item4_comment = ?12, \
             item5_title = ?13, item5_comment = ?14, photo_path = ?15, updated_at = ?16 \
             WHERE id = ?17",
            params![
                diary.date.to_string(),
                diary.title,
                diary.weather.map(Weather::as_str),
                diary.condition.map(Condition::as_str),
                it(0).map(|x| x.title.as_str()),
                it(0).map(|x| x.comment.as_str()),
                it(1).map(|x| x.title.as_str()),
                it(1).map(|x| x.comment.as_str()),
                it(2).map(|x| x.title.as_str()),
                it(2).map(|x| x.comment.as_str()),
                it(3).map(|x| x.title.as_str()),
                it(3).map(|x| x.comment.as_str()),
                it(4).map(|x| x.title.as_str()),
                it(4).map(|x| x.comment.as_str()),
                diary.photo,
                updated_at,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::new(format!("no diary with id {id}")));
        }
        Ok(())
    }

    fn get(&self, id: DiaryId) -> Result<Option<Diary>, StoreError> {
        self.get_where("id = ?1", id)
    }

    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Diary>, StoreError> {
        self.get_where("date = ?1", date.to_string())
    }

    fn delete(&self, id: DiaryId) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("poisoned");
        conn.execute("DELETE FROM diaries WHERE id = ?1", params![id])?;
        Ok(())
    }
}
