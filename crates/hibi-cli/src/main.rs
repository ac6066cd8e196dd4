use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hibi_core::{
    AllEntries, Condition, DiaryItem, DiaryStore, ListState, NewDiary, PageSource, Pager,
    PagerEvent, SearchQuery, SqliteStore, Weather, MAX_ITEMS,
};

mod config;
mod render;

#[derive(Parser)]
#[command(name = "hibi", version, about = "Hibi diary CLI")]
struct Cli {
    /// Optional database path (overrides settings)
    #[arg(long)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the local database
    InitDb,
    /// Add or replace the entry for a date
    Add {
        date: NaiveDate,
        #[arg(long)]
        title: String,
        /// sunny|cloudy|rainy|snowy|stormy
        #[arg(long)]
        weather: Option<String>,
        /// great|good|average|poor|awful
        #[arg(long)]
        condition: Option<String>,
        /// Item section as "title=comment"; repeat for up to five sections
        #[arg(long = "item")]
        items: Vec<String>,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Print one entry
    Show {
        date: NaiveDate,
        #[arg(long)]
        json: bool,
    },
    /// Remove the entry for a date
    Delete { date: NaiveDate },
    /// Browse the diary list, newest first
    List {
        #[arg(long)]
        page_size: Option<usize>,
        /// Stop after N page loads instead of loading to the end
        #[arg(long)]
        pages: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Search entries by substring
    Search {
        word: String,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective settings
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = config::load_settings();
    let db_path = cli
        .db
        .clone()
        .or_else(|| settings.db_path.clone())
        .unwrap_or_else(config::default_db_path);
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let store: Arc<dyn DiaryStore> = Arc::new(SqliteStore::open(&db_path)?);
    tracing::debug!(db = %db_path.display(), "store opened");
    let default_page_size = config::page_size(&settings);

    match cli.command {
        Commands::InitDb => {
            println!("database ready at {}", db_path.display());
        }
        Commands::Add {
            date,
            title,
            weather,
            condition,
            items,
            photo,
        } => {
            let diary = NewDiary {
                date,
                title,
                weather: weather
                    .as_deref()
                    .map(|w| Weather::parse(w).ok_or_else(|| anyhow!("unknown weather {w:?}")))
                    .transpose()?,
                condition: condition
                    .as_deref()
                    .map(|c| Condition::parse(c).ok_or_else(|| anyhow!("unknown condition {c:?}")))
                    .transpose()?,
                items: parse_items(&items)?,
                photo,
            };
            match store.get_by_date(date)? {
                Some(existing) => {
                    store.update(existing.id, &diary)?;
                    println!("updated {date}");
                }
                None => {
                    store.insert(&diary)?;
                    println!("added {date}");
                }
            }
        }
        Commands::Show { date, json } => match store.get_by_date(date)? {
            Some(diary) if json => println!("{}", serde_json::to_string_pretty(&diary)?),
            Some(diary) => {
                println!("{}  {}", diary.date, diary.title);
                if let Some(w) = diary.weather {
                    println!("  weather: {}", w.as_str());
                }
                if let Some(c) = diary.condition {
                    println!("  condition: {}", c.as_str());
                }
                for (slot, item) in diary.items.iter().enumerate() {
                    if let Some(item) = item {
                        println!("  #{} {}: {}", slot + 1, item.title, item.comment);
                    }
                }
                if let Some(photo) = &diary.photo {
                    println!("  photo: {photo}");
                }
            }
            None => bail!("no entry for {date}"),
        },
        Commands::Delete { date } => match store.get_by_date(date)? {
            Some(diary) => {
                store.delete(diary.id)?;
                println!("deleted {date}");
            }
            None => bail!("no entry for {date}"),
        },
        Commands::List {
            page_size,
            pages,
            json,
        } => {
            let pager = Pager::new(
                AllEntries::new(store),
                page_size.unwrap_or(default_page_size),
            );
            let state = drain(&pager, pages)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state.list)?);
            } else {
                print!("{}", render::render_entries(&state.list));
                eprintln!("{} of {} entries", state.list.real_row_count(), state.total_matching);
            }
        }
        Commands::Search {
            word,
            page_size,
            json,
        } => {
            if word.is_empty() {
                bail!("search word must be non-empty");
            }
            let pager = Pager::new(
                SearchQuery::new(store, word),
                page_size.unwrap_or(default_page_size),
            );
            let state = drain(&pager, None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&state.list)?);
            } else {
                print!("{}", render::render_search(&state.list));
                eprintln!("{} matching entries", state.total_matching);
            }
        }
        Commands::Config => {
            println!("# {}", config::settings_path().display());
            print!("{}", toml::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

/// Drives the pager until the list is complete (or `max_pages` loads ran),
/// surfacing any failure signal as the command error.
fn drain<Q: PageSource>(pager: &Pager<Q>, max_pages: Option<usize>) -> Result<ListState<Q::Row>> {
    let failed: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&failed);
    pager.subscribe(move |ev| {
        if let PagerEvent::Failure(err) = ev {
            *sink.lock().unwrap() = Some(err.to_string());
        }
    });

    pager.load_first_page();
    pager.wait_idle();
    let mut pages = 1;
    loop {
        if let Some(err) = failed.lock().unwrap().take() {
            bail!("loading failed: {err}");
        }
        let state = pager.current();
        if !state.list.ends_in_loading() {
            return Ok(state);
        }
        if max_pages.is_some_and(|max| pages >= max) {
            return Ok(state);
        }
        pager.load_next_page();
        pager.wait_idle();
        pages += 1;
    }
}

/// Parses repeated `--item "title=comment"` flags into the five positional
/// slots.
fn parse_items(raw: &[String]) -> Result<[Option<DiaryItem>; MAX_ITEMS]> {
    if raw.len() > MAX_ITEMS {
        bail!("an entry holds at most {MAX_ITEMS} item sections");
    }
    let mut items: [Option<DiaryItem>; MAX_ITEMS] = Default::default();
    for (slot, pair) in raw.iter().enumerate() {
        let (title, comment) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("item must look like \"title=comment\", got {pair:?}"))?;
        items[slot] = Some(DiaryItem {
            title: title.to_string(),
            comment: comment.to_string(),
        });
    }
    Ok(items)
}
