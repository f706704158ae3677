use std::collections::HashSet;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::domain::{Article, NewsResponse, Resource};
use crate::viewmodel::{should_paginate, ListFlags, ScrollMetrics};

/// Rows each article occupies in a list (title, byline, description).
pub const ITEM_HEIGHT: usize = 3;
pub const PAGE_SIZE: usize = 10;
const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Headlines,
    Search,
    Favorites,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Headlines, Tab::Search, Tab::Favorites];

    pub fn next(self) -> Self {
        match self {
            Tab::Headlines => Tab::Search,
            Tab::Search => Tab::Favorites,
            Tab::Favorites => Tab::Headlines,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Tab::Headlines => Tab::Favorites,
            Tab::Search => Tab::Headlines,
            Tab::Favorites => Tab::Search,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Headlines => "Headlines",
            Tab::Search => "Search",
            Tab::Favorites => "Favorites",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Headlines => 0,
            Tab::Search => 1,
            Tab::Favorites => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// One list screen: the articles shown, its load/error flags and cursor.
#[derive(Debug, Default)]
pub struct ArticleScreen {
    pub articles: Vec<Article>,
    pub total_results: u32,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_last_page: bool,
    pub index: usize,
    pub list_state: ListState,
    /// Rows available for items at the last render.
    pub viewport_rows: usize,
}

impl ArticleScreen {
    /// Apply a newly observed resource. Returns the error message when the
    /// resource just turned into an error, so the caller can raise a toast.
    pub fn apply(&mut self, resource: &Resource<NewsResponse>) -> Option<String> {
        match resource {
            Resource::Idle => {
                self.is_loading = false;
                None
            }
            Resource::Loading => {
                self.is_loading = true;
                None
            }
            Resource::Success(response) => {
                self.is_loading = false;
                self.error = None;
                self.set_articles(response.articles.clone());
                self.total_results = response.total_results;
                None
            }
            Resource::Error(message) => {
                self.is_loading = false;
                self.error = Some(message.clone());
                Some(message.clone())
            }
        }
    }

    pub fn set_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        if self.articles.is_empty() {
            self.index = 0;
        } else if self.index >= self.articles.len() {
            self.index = self.articles.len() - 1;
        }
        self.list_state.select(Some(self.index));
    }

    /// Forget everything shown; used when a new search replaces the old one.
    pub fn reset(&mut self) {
        self.articles.clear();
        self.total_results = 0;
        self.error = None;
        self.is_last_page = false;
        self.index = 0;
        self.list_state = ListState::default();
        self.list_state.select(Some(0));
    }

    pub fn selected(&self) -> Option<&Article> {
        self.articles.get(self.index)
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.articles.is_empty() {
            return;
        }
        let max = self.articles.len() - 1;
        let target = self.index.saturating_add_signed(delta).min(max);
        if target != self.index {
            self.index = target;
            self.list_state.select(Some(self.index));
        }
    }

    pub fn scroll_metrics(&self) -> ScrollMetrics {
        let total_count = self.articles.len();
        let first_visible = self.list_state.offset().min(total_count);
        let visible_count = (self.viewport_rows / ITEM_HEIGHT)
            .max(1)
            .min(total_count - first_visible);
        ScrollMetrics {
            first_visible,
            visible_count,
            total_count,
        }
    }

    pub fn flags(&self) -> ListFlags {
        ListFlags {
            is_error: self.error.is_some(),
            is_loading: self.is_loading,
            is_last_page: self.is_last_page,
        }
    }

    pub fn wants_next_page(&self, page_size: u32) -> bool {
        should_paginate(self.scroll_metrics(), self.flags(), page_size)
    }
}

pub struct TuiApp {
    pub active_tab: Tab,
    pub input_mode: InputMode,
    pub headlines: ArticleScreen,
    pub search: ArticleScreen,
    pub favorites: ArticleScreen,
    pub favorite_urls: HashSet<String>,
    pub search_text: String,
    pub should_quit: bool,
    pub status_message: Option<(String, Instant)>,
    /// Last favorite removed, restorable with undo
    pub pending_undo: Option<Article>,
    /// Set by cursor moves; checked for pagination after the next render.
    pub scrolled: bool,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut app = Self {
            active_tab: Tab::Headlines,
            input_mode: InputMode::Normal,
            headlines: ArticleScreen::default(),
            search: ArticleScreen::default(),
            favorites: ArticleScreen::default(),
            favorite_urls: HashSet::new(),
            search_text: String::new(),
            should_quit: false,
            status_message: None,
            pending_undo: None,
            scrolled: false,
        };
        for screen in [&mut app.headlines, &mut app.search, &mut app.favorites] {
            screen.list_state.select(Some(0));
        }
        app
    }

    pub fn screen(&self) -> &ArticleScreen {
        match self.active_tab {
            Tab::Headlines => &self.headlines,
            Tab::Search => &self.search,
            Tab::Favorites => &self.favorites,
        }
    }

    pub fn screen_mut(&mut self) -> &mut ArticleScreen {
        match self.active_tab {
            Tab::Headlines => &mut self.headlines,
            Tab::Search => &mut self.search,
            Tab::Favorites => &mut self.favorites,
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.screen().selected()
    }

    pub fn is_favorite(&self, url: &str) -> bool {
        self.favorite_urls.contains(url)
    }

    pub fn set_favorites(&mut self, favorites: Vec<Article>) {
        self.favorite_urls = favorites.iter().map(|a| a.url.clone()).collect();
        self.favorites.set_articles(favorites);
    }

    pub fn move_selection(&mut self, delta: isize) {
        self.screen_mut().move_by(delta);
        self.scrolled = true;
    }

    pub fn next_tab(&mut self) {
        self.active_tab = self.active_tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.active_tab = self.active_tab.prev();
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn toast_error(&mut self, message: &str) {
        self.set_status(format!("Sorry error : {}", message));
    }

    /// Drop the toast once it has been visible long enough.
    pub fn expire_status(&mut self) {
        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed() >= TOAST_TTL {
                self.status_message = None;
            }
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article::new(format!("https://news/{}", i)))
            .collect()
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Headlines.next().next().next(), Tab::Headlines);
        assert_eq!(Tab::Headlines.prev(), Tab::Favorites);
        for tab in Tab::ALL {
            assert_eq!(Tab::ALL[tab.index()], tab);
        }
    }

    #[test]
    fn test_apply_keeps_articles_while_loading() {
        let mut screen = ArticleScreen::default();
        screen.apply(&Resource::Success(NewsResponse::new(articles(3), 30)));
        screen.apply(&Resource::Loading);

        assert!(screen.is_loading);
        assert_eq!(screen.articles.len(), 3);
    }

    #[test]
    fn test_apply_error_then_success_clears_error() {
        let mut screen = ArticleScreen::default();
        let toast = screen.apply(&Resource::Error("Unable to connect".into()));
        assert_eq!(toast.as_deref(), Some("Unable to connect"));
        assert!(screen.flags().is_error);

        assert!(screen
            .apply(&Resource::Success(NewsResponse::new(articles(1), 1)))
            .is_none());
        assert!(screen.error.is_none());
    }

    #[test]
    fn test_move_by_clamps() {
        let mut screen = ArticleScreen::default();
        screen.set_articles(articles(5));
        screen.move_by(-3);
        assert_eq!(screen.index, 0);
        screen.move_by(PAGE_SIZE as isize);
        assert_eq!(screen.index, 4);
        assert_eq!(screen.list_state.selected(), Some(4));
    }

    #[test]
    fn test_set_articles_clamps_index_after_shrink() {
        let mut screen = ArticleScreen::default();
        screen.set_articles(articles(5));
        screen.move_by(4);
        screen.set_articles(articles(2));
        assert_eq!(screen.index, 1);
    }

    #[test]
    fn test_wants_next_page_at_bottom_of_full_page() {
        let mut screen = ArticleScreen::default();
        screen.set_articles(articles(20));
        screen.viewport_rows = 60;
        assert!(screen.wants_next_page(20));

        screen.is_loading = true;
        assert!(!screen.wants_next_page(20));
    }

    #[test]
    fn test_wants_next_page_not_when_more_below() {
        let mut screen = ArticleScreen::default();
        screen.set_articles(articles(40));
        screen.viewport_rows = 30;
        let metrics = screen.scroll_metrics();
        assert_eq!(metrics.visible_count, 10);
        assert!(!screen.wants_next_page(20));
    }

    #[test]
    fn test_set_favorites_tracks_urls() {
        let mut app = TuiApp::new();
        app.set_favorites(articles(2));
        assert!(app.is_favorite("https://news/1"));
        assert!(!app.is_favorite("https://news/9"));
        assert_eq!(app.favorites.articles.len(), 2);
    }

    #[test]
    fn test_toast_expires() {
        let mut app = TuiApp::new();
        app.toast_error("No Internet Found");
        assert_eq!(app.status_text(), Some("Sorry error : No Internet Found"));

        app.status_message = Some(("old".into(), Instant::now() - TOAST_TTL));
        app.expire_status();
        assert!(app.status_text().is_none());
    }
}
