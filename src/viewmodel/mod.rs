//! Observable view state for the headline, search and favorites screens.

pub mod debounce;
pub mod failure;
pub mod paging;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::api::ApiResponse;
use crate::app::{NewsdeskError, Result};
use crate::connectivity::{is_connected, NetworkMonitor};
use crate::domain::{Article, NewsResponse, Resource};
use crate::repository::NewsRepository;

pub use debounce::Debouncer;
pub use failure::FetchFailure;
pub use paging::{should_paginate, total_pages, ListFlags, PagedQuery, ScrollMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModelSettings {
    pub page_size: u32,
    pub search_delay: Duration,
}

impl Default for ViewModelSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_delay: Duration::from_millis(500),
        }
    }
}

pub struct NewsViewModel {
    repository: Arc<NewsRepository>,
    monitor: Arc<dyn NetworkMonitor + Send + Sync>,
    settings: ViewModelSettings,
    headlines_state: Mutex<PagedQuery>,
    search_state: Mutex<PagedQuery>,
    headlines: watch::Sender<Resource<NewsResponse>>,
    search_results: watch::Sender<Resource<NewsResponse>>,
    search_debouncer: Debouncer,
}

fn lock(state: &Mutex<PagedQuery>) -> MutexGuard<'_, PagedQuery> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl NewsViewModel {
    pub fn new(
        repository: Arc<NewsRepository>,
        monitor: Arc<dyn NetworkMonitor + Send + Sync>,
        settings: ViewModelSettings,
    ) -> Self {
        Self {
            repository,
            monitor,
            settings,
            headlines_state: Mutex::new(PagedQuery::new()),
            search_state: Mutex::new(PagedQuery::new()),
            headlines: watch::channel(Resource::Idle).0,
            search_results: watch::channel(Resource::Idle).0,
            search_debouncer: Debouncer::new(settings.search_delay),
        }
    }

    pub fn settings(&self) -> ViewModelSettings {
        self.settings
    }

    pub fn headlines(&self) -> watch::Receiver<Resource<NewsResponse>> {
        self.headlines.subscribe()
    }

    pub fn search_results(&self) -> watch::Receiver<Resource<NewsResponse>> {
        self.search_results.subscribe()
    }

    pub fn headlines_page(&self) -> u32 {
        lock(&self.headlines_state).page()
    }

    pub fn search_page(&self) -> u32 {
        lock(&self.search_state).page()
    }

    pub fn headlines_last_page(&self) -> bool {
        lock(&self.headlines_state).is_last_page(self.settings.page_size)
    }

    pub fn search_last_page(&self) -> bool {
        lock(&self.search_state).is_last_page(self.settings.page_size)
    }

    pub fn last_search_query(&self) -> Option<String> {
        lock(&self.search_state).last_query().map(String::from)
    }

    async fn ensure_connected(&self) -> std::result::Result<(), FetchFailure> {
        let network = self.monitor.active_network().await;
        if is_connected(network.as_ref()) {
            Ok(())
        } else {
            Err(FetchFailure::NoNetwork)
        }
    }

    /// Fetch the next page of headlines and publish the merged result.
    pub async fn fetch_headlines(&self, country_code: &str) -> Resource<NewsResponse> {
        self.headlines.send_replace(Resource::Loading);

        let resource = match self.load_headlines(country_code).await {
            Ok(merged) => Resource::Success(merged),
            Err(failure) => {
                warn!("headlines fetch failed: {}", failure);
                Resource::Error(failure.message())
            }
        };

        self.headlines.send_replace(resource.clone());
        resource
    }

    async fn load_headlines(
        &self,
        country_code: &str,
    ) -> std::result::Result<NewsResponse, FetchFailure> {
        self.ensure_connected().await?;

        let page = self.headlines_page();
        debug!("fetching headlines country={} page={}", country_code, page);

        match self.repository.headlines(country_code, page).await {
            Ok(ApiResponse::Success(response)) => {
                Ok(lock(&self.headlines_state).merge(response).clone())
            }
            Ok(ApiResponse::Failure { status, message }) => {
                Err(FetchFailure::Server { status, message })
            }
            Err(e) => {
                debug!("headlines transport error: {}", e);
                Err(FetchFailure::from_error(&e))
            }
        }
    }

    /// Fetch a page of search results for `query`. A new query starts over at
    /// page 1; the same query loads the next page.
    pub async fn search_news(&self, query: &str) -> Resource<NewsResponse> {
        let (page, generation) = {
            let mut state = lock(&self.search_state);
            if state.begin_search(query) {
                debug!("new search query {:?}, paging reset", query);
            }
            (state.page(), state.generation())
        };
        self.search_results.send_replace(Resource::Loading);

        let outcome = self.load_search(query, page).await;

        let resource = {
            let mut state = lock(&self.search_state);
            if !state.is_current(generation) {
                debug!("search for {:?} superseded, result dropped", query);
                return self.search_results.borrow().clone();
            }
            match outcome {
                Ok(response) => match state.merge_search(generation, response) {
                    Some(merged) => Resource::Success(merged.clone()),
                    None => return self.search_results.borrow().clone(),
                },
                Err(failure) => {
                    warn!("search {:?} failed: {}", query, failure);
                    Resource::Error(failure.message())
                }
            }
        };

        self.search_results.send_replace(resource.clone());
        resource
    }

    async fn load_search(
        &self,
        query: &str,
        page: u32,
    ) -> std::result::Result<NewsResponse, FetchFailure> {
        self.ensure_connected().await?;
        debug!("searching {:?} page={}", query, page);

        match self.repository.search(query, page).await {
            Ok(ApiResponse::Success(response)) => Ok(response),
            Ok(ApiResponse::Failure { status, message }) => {
                Err(FetchFailure::Server { status, message })
            }
            Err(e) => {
                debug!("search transport error: {}", e);
                Err(FetchFailure::from_error(&e))
            }
        }
    }

    /// Schedule a search once typing settles. Blank text cancels any pending
    /// search and schedules nothing.
    pub fn search_debounced(self: &Arc<Self>, text: &str) {
        if text.trim().is_empty() {
            self.search_debouncer.cancel();
            return;
        }

        let viewmodel = Arc::clone(self);
        let query = text.to_string();
        self.search_debouncer.schedule(async move {
            viewmodel.search_news(&query).await;
        });
    }

    pub fn favorites(&self) -> Result<Vec<Article>> {
        self.repository.favorites()
    }

    pub fn watch_favorites(&self) -> watch::Receiver<Vec<Article>> {
        self.repository.watch_favorites()
    }

    pub fn is_favorite(&self, url: &str) -> bool {
        self.repository.is_favorite(url).unwrap_or_else(|e| {
            warn!("favorite lookup failed for {}: {}", url, e);
            false
        })
    }

    /// Fire-and-forget save; the store's change feed is the only acknowledgement.
    pub fn add_favorite(&self, article: Article) -> JoinHandle<()> {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = repository.add_favorite(&article) {
                error!("failed to save favorite {}: {}", article.url, e);
            }
        })
    }

    /// Fire-and-forget removal; see [`NewsViewModel::add_favorite`].
    pub fn remove_favorite(&self, article: Article) -> JoinHandle<()> {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = repository.remove_favorite(&article) {
                error!("failed to remove favorite {}: {}", article.url, e);
            }
        })
    }

    pub async fn save_favorite(&self, article: Article) -> Result<()> {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || repository.add_favorite(&article))
            .await
            .map_err(|e| NewsdeskError::Other(e.to_string()))?
    }

    pub async fn delete_favorite(&self, article: Article) -> Result<()> {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || repository.remove_favorite(&article))
            .await
            .map_err(|e| NewsdeskError::Other(e.to_string()))?
    }
}
