use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{ApiResponse, NewsApi};
use crate::app::Result;
use crate::domain::Article;
use crate::store::FavoriteStore;

/// Single entry point over the remote api and the local favorites.
pub struct NewsRepository {
    api: Arc<dyn NewsApi + Send + Sync>,
    favorites: Arc<dyn FavoriteStore + Send + Sync>,
}

impl NewsRepository {
    pub fn new(
        api: Arc<dyn NewsApi + Send + Sync>,
        favorites: Arc<dyn FavoriteStore + Send + Sync>,
    ) -> Self {
        Self { api, favorites }
    }

    pub async fn headlines(&self, country_code: &str, page: u32) -> Result<ApiResponse> {
        self.api.headlines(country_code, page).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<ApiResponse> {
        self.api.search(query, page).await
    }

    pub fn add_favorite(&self, article: &Article) -> Result<()> {
        self.favorites.upsert(article)
    }

    pub fn remove_favorite(&self, article: &Article) -> Result<()> {
        self.favorites.remove(article)
    }

    pub fn favorites(&self) -> Result<Vec<Article>> {
        self.favorites.all()
    }

    pub fn is_favorite(&self, url: &str) -> Result<bool> {
        self.favorites.contains(url)
    }

    pub fn favorite(&self, url: &str) -> Result<Option<Article>> {
        self.favorites.get(url)
    }

    pub fn watch_favorites(&self) -> watch::Receiver<Vec<Article>> {
        self.favorites.subscribe()
    }
}
