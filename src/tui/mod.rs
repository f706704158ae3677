pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::debug;

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::{Article, NewsResponse, Resource};

use self::app::{InputMode, Tab, TuiApp, PAGE_SIZE};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Receivers for everything the view model publishes.
struct Feeds {
    headlines: watch::Receiver<Resource<NewsResponse>>,
    search: watch::Receiver<Resource<NewsResponse>>,
    favorites: watch::Receiver<Vec<Article>>,
    /// Query whose results the search screen currently shows
    search_query: Option<String>,
}

impl Feeds {
    fn new(ctx: &AppContext) -> Self {
        Self {
            headlines: ctx.viewmodel.headlines(),
            search: ctx.viewmodel.search_results(),
            favorites: ctx.viewmodel.watch_favorites(),
            search_query: None,
        }
    }

    /// Copy any newly published state into the app, toasting failures.
    fn apply(&mut self, tui_app: &mut TuiApp, ctx: &AppContext) {
        let vm = &ctx.viewmodel;

        if self.headlines.has_changed().unwrap_or(false) {
            let resource = self.headlines.borrow_and_update().clone();
            if let Some(message) = tui_app.headlines.apply(&resource) {
                tui_app.toast_error(&message);
            }
            tui_app.headlines.is_last_page = vm.headlines_last_page();
        }

        if self.search.has_changed().unwrap_or(false) {
            let query = vm.last_search_query();
            if query != self.search_query {
                tui_app.search.reset();
                self.search_query = query;
            }
            let resource = self.search.borrow_and_update().clone();
            if let Some(message) = tui_app.search.apply(&resource) {
                tui_app.toast_error(&message);
            }
            tui_app.search.is_last_page = vm.search_last_page();
        }

        if self.favorites.has_changed().unwrap_or(false) {
            let favorites = self.favorites.borrow_and_update().clone();
            tui_app.set_favorites(favorites);
        }
    }
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>, config: Arc<Config>) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let mut feeds = Feeds::new(&ctx);

    tui_app.set_favorites(ctx.viewmodel.favorites()?);
    spawn_headlines(&ctx);

    loop {
        feeds.apply(&mut tui_app, &ctx);
        tui_app.expire_status();

        terminal.draw(|frame| layout::render(frame, &mut tui_app, &config.colors))?;

        // Viewport size is only known after a render
        if std::mem::take(&mut tui_app.scrolled) {
            maybe_load_more(&tui_app, &ctx);
        }

        match event_handler.next()? {
            AppEvent::Key(key) => {
                if tui_app.input_mode == InputMode::Search {
                    handle_search_input(&mut tui_app, &ctx, key);
                } else {
                    let action = config.keybindings.get_action(&key);
                    handle_action(&mut tui_app, &ctx, action);
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_headlines(ctx: &AppContext) {
    let vm = ctx.viewmodel.clone();
    let country = ctx.api_config.country.clone();
    tokio::spawn(async move {
        vm.fetch_headlines(&country).await;
    });
}

fn spawn_search(ctx: &AppContext, query: String) {
    let vm = ctx.viewmodel.clone();
    tokio::spawn(async move {
        vm.search_news(&query).await;
    });
}

fn maybe_load_more(tui_app: &TuiApp, ctx: &AppContext) {
    let page_size = ctx.viewmodel.settings().page_size;
    match tui_app.active_tab {
        Tab::Headlines if tui_app.headlines.wants_next_page(page_size) => {
            debug!("loading headlines page {}", ctx.viewmodel.headlines_page());
            spawn_headlines(ctx);
        }
        Tab::Search if tui_app.search.wants_next_page(page_size) => {
            if let Some(query) = ctx.viewmodel.last_search_query() {
                debug!("loading search page {}", ctx.viewmodel.search_page());
                spawn_search(ctx, query);
            }
        }
        _ => {}
    }
}

fn handle_search_input(tui_app: &mut TuiApp, ctx: &AppContext, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            tui_app.should_quit = true;
        }
        KeyCode::Esc | KeyCode::Enter => {
            tui_app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            tui_app.search_text.pop();
            schedule_search(tui_app, ctx);
        }
        KeyCode::Char(c) => {
            tui_app.search_text.push(c);
            schedule_search(tui_app, ctx);
        }
        _ => {}
    }
}

/// Blank text cancels any pending search.
fn schedule_search(tui_app: &TuiApp, ctx: &AppContext) {
    ctx.viewmodel.search_debounced(tui_app.search_text.trim());
}

fn handle_action(tui_app: &mut TuiApp, ctx: &AppContext, action: Action) {
    match action {
        Action::Quit => {
            tui_app.should_quit = true;
        }
        Action::MoveUp => {
            tui_app.move_selection(-1);
        }
        Action::MoveDown => {
            tui_app.move_selection(1);
        }
        Action::NextPage => {
            tui_app.move_selection(PAGE_SIZE as isize);
        }
        Action::PrevPage => {
            tui_app.move_selection(-(PAGE_SIZE as isize));
        }
        Action::NextTab => {
            tui_app.next_tab();
        }
        Action::PrevTab => {
            tui_app.prev_tab();
        }
        Action::StartSearch => {
            tui_app.active_tab = Tab::Search;
            tui_app.input_mode = InputMode::Search;
        }
        Action::OpenArticle => {
            if let Some(article) = tui_app.selected_article() {
                if let Err(e) = open::that(&article.url) {
                    tui_app.set_status(format!("Failed to open browser: {}", e));
                }
            }
        }
        Action::AddFavorite => {
            if let Some(article) = tui_app.selected_article().cloned() {
                if tui_app.is_favorite(&article.url) {
                    tui_app.set_status("Already in favorites");
                } else {
                    tui_app.set_status(format!("Saved: {}", article.display_title()));
                    ctx.viewmodel.add_favorite(article);
                }
            }
        }
        Action::RemoveFavorite => {
            if tui_app.active_tab != Tab::Favorites {
                return;
            }
            if let Some(article) = tui_app.selected_article().cloned() {
                tui_app.set_status(format!(
                    "Removed: {}  (u: Undo)",
                    article.display_title()
                ));
                ctx.viewmodel.remove_favorite(article.clone());
                tui_app.pending_undo = Some(article);
            }
        }
        Action::UndoRemove => {
            if let Some(article) = tui_app.pending_undo.take() {
                tui_app.set_status(format!("Restored: {}", article.display_title()));
                ctx.viewmodel.add_favorite(article);
            }
        }
        Action::Retry => match tui_app.active_tab {
            Tab::Headlines => spawn_headlines(ctx),
            Tab::Search => {
                let query = ctx
                    .viewmodel
                    .last_search_query()
                    .unwrap_or_else(|| tui_app.search_text.trim().to_string());
                if !query.is_empty() {
                    spawn_search(ctx, query);
                }
            }
            Tab::Favorites => {}
        },
        Action::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    use crate::api::fake::{page, ScriptedApi};
    use crate::config::{ApiConfig, ColorConfig};
    use crate::connectivity::AlwaysOnline;
    use crate::store::SqliteStore;

    fn offline_ctx() -> AppContext {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            skip_connectivity_check: true,
            ..ApiConfig::default()
        };
        AppContext::in_memory(config).unwrap()
    }

    fn scripted_ctx(api: Arc<ScriptedApi>) -> AppContext {
        AppContext::from_parts(
            Arc::new(SqliteStore::in_memory().unwrap()),
            api,
            Arc::new(AlwaysOnline),
            ApiConfig::default(),
        )
    }

    fn draw(tui_app: &mut TuiApp) {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let colors = ColorConfig::default();
        terminal
            .draw(|frame| layout::render(frame, tui_app, &colors))
            .unwrap();
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn loaded(rx: watch::Receiver<Resource<NewsResponse>>) -> usize {
        let len = rx.borrow().data().map_or(0, |r| r.len());
        len
    }

    #[tokio::test]
    async fn test_cursor_at_end_of_full_page_loads_next_headlines() {
        let api = Arc::new(ScriptedApi::default());
        api.reply(Ok(page("h1", 20, 100)));
        api.reply(Ok(page("h2", 20, 100)));
        let ctx = scripted_ctx(api.clone());
        let mut tui_app = TuiApp::new();
        let mut feeds = Feeds::new(&ctx);

        ctx.viewmodel.fetch_headlines("in").await;
        feeds.apply(&mut tui_app, &ctx);
        assert_eq!(tui_app.headlines.articles.len(), 20);
        assert!(!tui_app.headlines.is_last_page);

        // near the top, more rows below the viewport
        tui_app.move_selection(1);
        draw(&mut tui_app);
        assert!(std::mem::take(&mut tui_app.scrolled));
        maybe_load_more(&tui_app, &ctx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(api.calls().len(), 1);

        tui_app.move_selection(19);
        draw(&mut tui_app);
        assert!(std::mem::take(&mut tui_app.scrolled));
        maybe_load_more(&tui_app, &ctx);

        wait_until(|| loaded(ctx.viewmodel.headlines()) == 40).await;
        assert_eq!(api.calls(), vec![("in".into(), 1), ("in".into(), 2)]);

        feeds.apply(&mut tui_app, &ctx);
        assert_eq!(tui_app.headlines.articles.len(), 40);
        assert_eq!(tui_app.headlines.index, 19);
    }

    #[tokio::test]
    async fn test_cursor_at_end_of_search_results_loads_next_page() {
        let api = Arc::new(ScriptedApi::default());
        api.reply(Ok(page("r1", 20, 100)));
        api.reply(Ok(page("r2", 20, 100)));
        let ctx = scripted_ctx(api.clone());
        let mut tui_app = TuiApp::new();
        let mut feeds = Feeds::new(&ctx);

        ctx.viewmodel.search_news("rust").await;
        feeds.apply(&mut tui_app, &ctx);
        tui_app.active_tab = Tab::Search;

        tui_app.move_selection(19);
        draw(&mut tui_app);
        assert!(std::mem::take(&mut tui_app.scrolled));
        maybe_load_more(&tui_app, &ctx);

        wait_until(|| loaded(ctx.viewmodel.search_results()) == 40).await;
        assert_eq!(api.calls(), vec![("rust".into(), 1), ("rust".into(), 2)]);
    }

    #[tokio::test]
    async fn test_new_search_query_resets_search_screen() {
        let api = Arc::new(ScriptedApi::default());
        api.reply(Ok(page("rust", 20, 100)));
        api.reply(Ok(page("go", 10, 10)));
        let ctx = scripted_ctx(api.clone());
        let mut tui_app = TuiApp::new();
        let mut feeds = Feeds::new(&ctx);

        ctx.viewmodel.search_news("rust").await;
        feeds.apply(&mut tui_app, &ctx);
        tui_app.active_tab = Tab::Search;
        tui_app.move_selection(7);
        assert_eq!(tui_app.search.index, 7);

        ctx.viewmodel.search_news("go").await;
        feeds.apply(&mut tui_app, &ctx);

        let screen = &tui_app.search;
        assert_eq!(screen.index, 0);
        assert_eq!(screen.articles.len(), 10);
        assert!(screen.articles.iter().all(|a| a.url.contains("/go/")));
        // 10 results fit in the first page
        assert!(screen.is_last_page);
        assert!(tui_app.headlines.articles.is_empty());
    }

    #[tokio::test]
    async fn test_remove_then_undo_restores_favorite() {
        let ctx = offline_ctx();
        let mut tui_app = TuiApp::new();
        let mut feeds = Feeds::new(&ctx);

        let mut article = Article::new("https://news/keep");
        article.title = Some("Keep me".into());
        ctx.viewmodel.save_favorite(article.clone()).await.unwrap();
        feeds.apply(&mut tui_app, &ctx);
        assert!(tui_app.is_favorite("https://news/keep"));

        tui_app.active_tab = Tab::Favorites;
        handle_action(&mut tui_app, &ctx, Action::RemoveFavorite);
        assert_eq!(tui_app.pending_undo.as_ref(), Some(&article));

        // let the background delete land
        for _ in 0..50 {
            if !ctx.viewmodel.is_favorite(&article.url) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        feeds.apply(&mut tui_app, &ctx);
        assert!(!tui_app.is_favorite("https://news/keep"));

        handle_action(&mut tui_app, &ctx, Action::UndoRemove);
        assert!(tui_app.pending_undo.is_none());
        for _ in 0..50 {
            if ctx.viewmodel.is_favorite(&article.url) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        feeds.apply(&mut tui_app, &ctx);
        assert!(tui_app.is_favorite("https://news/keep"));
    }

    #[tokio::test]
    async fn test_remove_ignored_outside_favorites_tab() {
        let ctx = offline_ctx();
        let mut tui_app = TuiApp::new();
        tui_app
            .headlines
            .set_articles(vec![Article::new("https://news/1")]);

        handle_action(&mut tui_app, &ctx, Action::RemoveFavorite);
        assert!(tui_app.pending_undo.is_none());
    }

    #[tokio::test]
    async fn test_search_input_mode_edits_text() {
        let ctx = offline_ctx();
        let mut tui_app = TuiApp::new();
        handle_action(&mut tui_app, &ctx, Action::StartSearch);
        assert_eq!(tui_app.active_tab, Tab::Search);
        assert_eq!(tui_app.input_mode, InputMode::Search);

        for c in "rust".chars() {
            handle_search_input(
                &mut tui_app,
                &ctx,
                KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE),
            );
        }
        handle_search_input(
            &mut tui_app,
            &ctx,
            KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
        );
        assert_eq!(tui_app.search_text, "rus");

        handle_search_input(
            &mut tui_app,
            &ctx,
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        );
        assert_eq!(tui_app.input_mode, InputMode::Normal);
        assert!(!tui_app.should_quit);
    }
}
