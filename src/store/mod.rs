pub mod sqlite;

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::Article;

pub use sqlite::SqliteStore;

/// Persistent set of favorite articles, keyed by url.
pub trait FavoriteStore {
    /// Insert, or replace the stored article with the same url.
    fn upsert(&self, article: &Article) -> Result<()>;
    /// Remove by url. Removing an absent article is a no-op.
    fn remove(&self, article: &Article) -> Result<()>;
    fn all(&self) -> Result<Vec<Article>>;
    fn contains(&self, url: &str) -> Result<bool>;
    fn get(&self, url: &str) -> Result<Option<Article>>;
    /// Live view of `all()`, republished after every mutation.
    fn subscribe(&self) -> watch::Receiver<Vec<Article>>;
}
