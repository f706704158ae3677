use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};
use tokio::sync::watch;

use crate::app::{NewsdeskError, Result};
use crate::domain::{Article, Source};
use crate::store::FavoriteStore;

const ARTICLE_COLUMNS: &str =
    "url, title, description, url_to_image, author, content, source_id, source_name, published_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: watch::Sender<Vec<Article>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let (changes, _) = watch::channel(Vec::new());
        let store = Self {
            conn: Mutex::new(conn),
            changes,
        };
        store.run_migrations()?;
        {
            let conn = store.lock()?;
            store.publish(&conn)?;
        }
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| NewsdeskError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            NewsdeskError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    /// Send the current list to subscribers. Takes the held connection so
    /// the snapshot and the send happen under the same lock as the write.
    fn publish(&self, conn: &Connection) -> Result<()> {
        let favorites = Self::query_all(conn)?;
        tracing::debug!("favorites changed: {} saved", favorites.len());
        self.changes.send_replace(favorites);
        Ok(())
    }

    fn query_all(conn: &Connection) -> Result<Vec<Article>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM favorites ORDER BY id",
            ARTICLE_COLUMNS
        ))?;

        let articles = stmt
            .query_map([], Self::article_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            url: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            url_to_image: row.get(3)?,
            author: row.get(4)?,
            content: row.get(5)?,
            source: Source {
                id: row.get(6)?,
                name: row.get(7)?,
            },
            published_at: row.get(8)?,
        })
    }
}

impl FavoriteStore for SqliteStore {
    fn upsert(&self, article: &Article) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO favorites (url, title, description, url_to_image, author, content,
                                    source_id, source_name, published_at, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                url_to_image = excluded.url_to_image,
                author = excluded.author,
                content = excluded.content,
                source_id = excluded.source_id,
                source_name = excluded.source_name,
                published_at = excluded.published_at",
            params![
                article.url,
                article.title,
                article.description,
                article.url_to_image,
                article.author,
                article.content,
                article.source.id,
                article.source.name,
                article.published_at,
                Utc::now().to_rfc3339()
            ],
        )?;
        self.publish(&conn)
    }

    fn remove(&self, article: &Article) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM favorites WHERE url = ?1", params![article.url])?;
        if removed > 0 {
            self.publish(&conn)?;
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<Article>> {
        let conn = self.lock()?;
        Self::query_all(&conn)
    }

    fn contains(&self, url: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM favorites WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get(&self, url: &str) -> Result<Option<Article>> {
        let conn = self.lock()?;
        let article = conn
            .query_row(
                &format!("SELECT {} FROM favorites WHERE url = ?1", ARTICLE_COLUMNS),
                params![url],
                Self::article_from_row,
            )
            .optional()?;
        Ok(article)
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Article>> {
        self.changes.subscribe()
    }
}
