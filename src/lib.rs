//! # Newsdesk
//!
//! A terminal news reader backed by the NewsAPI service.
//!
//! ## Architecture
//!
//! ```text
//! NewsApi ─┐
//!          ├→ Repository → ViewModel → TUI / CLI
//! Store  ──┘
//! ```
//!
//! - [`api`]: HTTP client for the headline and search endpoints
//! - [`store`]: SQLite persistence for favorite articles
//! - [`viewmodel`]: Paging, debounced search and observable fetch state
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! export NEWSAPI_KEY=...
//!
//! # Print the first two pages of headlines
//! newsdesk headlines --pages 2
//!
//! # Search everything
//! newsdesk search "rust language"
//!
//! # Launch the TUI
//! newsdesk
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the api client,
/// favorites store, repository and view model.
pub mod app;

/// NewsAPI client.
///
/// - [`NewsApi`](api::NewsApi): Async trait for the two remote queries
/// - [`NewsApiClient`](api::newsapi::NewsApiClient): reqwest-based implementation
pub mod api;

/// Command-line interface using clap.
///
/// - `headlines [--country] [--pages]` - Print top headlines
/// - `search <query> [--pages]` - Search all articles
/// - `favorites [--json]` - List saved favorites
/// - `unfavorite <url>` - Remove a favorite
/// - `tui` - Launch the TUI (default)
pub mod cli;

/// Configuration loaded from `~/.config/newsdesk/config.toml`.
pub mod config;

/// Network reachability checks run before every fetch.
pub mod connectivity;

/// Core domain models.
///
/// - [`Article`](domain::Article) and [`Source`](domain::Source)
/// - [`NewsResponse`](domain::NewsResponse): One or more accumulated pages
/// - [`Resource`](domain::Resource): Idle / loading / success / error
pub mod domain;

/// Single access point for remote queries and local favorites.
pub mod repository;

/// SQLite persistence layer.
///
/// - [`FavoriteStore`](store::FavoriteStore): Trait defining favorite operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Terminal user interface.
///
/// Tabs for headlines, search and favorites over a list and preview pane.
///
/// Keybindings: j/k navigate, Tab cycles tabs, / searches, f saves,
/// d removes, u undoes, o opens in browser, R retries, q quits.
pub mod tui;

/// Fetch state, paging and debounced search shared by the TUI and CLI.
pub mod viewmodel;
