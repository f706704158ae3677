use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::tui::app::{ArticleScreen, InputMode, Tab, TuiApp};

const DESCRIPTION_WIDTH: usize = 120;

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let show_search = app.active_tab == Tab::Search;
    let show_error = app.screen().error.is_some();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                                    // Tabs
            Constraint::Length(if show_search { 3 } else { 0 }),      // Search input
            Constraint::Length(if show_error { 3 } else { 0 }),       // Error panel
            Constraint::Percentage(55),                               // Article list
            Constraint::Min(6),                                       // Preview
            Constraint::Length(1),                                    // Status bar
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0], colors);
    if show_search {
        render_search_input(frame, app, chunks[1], colors);
    }
    if show_error {
        render_error_panel(frame, app.screen(), chunks[2], colors);
    }
    render_article_list(frame, app, chunks[3], colors);
    render_preview(frame, app, chunks[4], colors);
    render_status_bar(frame, app, chunks[5], colors);
}

fn render_tabs(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let count = match tab {
                Tab::Favorites => format!(" ({})", app.favorites.articles.len()),
                _ => String::new(),
            };
            Line::from(format!(" {}{} ", tab.title(), count))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active_tab.index())
        .style(Style::default().fg(colors.inactive_border))
        .highlight_style(
            Style::default()
                .fg(colors.active_border)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    frame.render_widget(tabs, area);
}

fn render_search_input(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let editing = app.input_mode == InputMode::Search;
    let border = if editing {
        colors.active_border
    } else {
        colors.inactive_border
    };

    let text = if app.search_text.is_empty() && !editing {
        Span::styled(
            "Press / to search",
            Style::default().fg(colors.inactive_border),
        )
    } else {
        Span::raw(format!("{}{}", app.search_text, if editing { "_" } else { "" }))
    };

    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .title(" Search ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(input, area);
}

fn render_error_panel(frame: &mut Frame, screen: &ArticleScreen, area: Rect, colors: &ColorConfig) {
    let message = screen.error.as_deref().unwrap_or_default();
    let panel = Paragraph::new(Line::from(vec![
        Span::styled(message.to_string(), Style::default().fg(colors.error_fg)),
        Span::raw("  (R: Retry)"),
    ]))
    .block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.error_fg)),
    );
    frame.render_widget(panel, area);
}

fn render_article_list(frame: &mut Frame, app: &mut TuiApp, area: Rect, colors: &ColorConfig) {
    let rows: Vec<ListItem> = app
        .screen()
        .articles
        .iter()
        .map(|article| {
            let marker = if app.is_favorite(&article.url) {
                Span::styled("★ ", Style::default().fg(colors.favorite_marker))
            } else {
                Span::raw("  ")
            };
            let title = Line::from(vec![
                marker,
                Span::styled(
                    article.display_title().to_string(),
                    Style::default()
                        .fg(colors.article_title)
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
            let byline = Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    article.display_source().to_string(),
                    Style::default().fg(colors.metadata_source),
                ),
                Span::raw("  "),
                Span::styled(
                    article.published_display(),
                    Style::default().fg(colors.metadata_date),
                ),
            ]);
            let summary = Line::from(vec![
                Span::raw("  "),
                Span::raw(truncate(&article.display_description(), DESCRIPTION_WIDTH)),
            ]);
            ListItem::new(Text::from(vec![title, byline, summary]))
        })
        .collect();

    let screen = app.screen();
    let mut title = format!(
        " {} ({}) [{}/{}] ",
        app.active_tab.title(),
        screen.articles.len(),
        (screen.index + 1).min(screen.articles.len().max(1)),
        screen.articles.len().max(1)
    );
    if screen.is_loading {
        title.push_str("Loading... ");
    } else if screen.is_last_page && !screen.articles.is_empty() {
        title.push_str("End ");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.active_border));

    let list = List::new(rows)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(colors.selection_bg_active)
                .fg(colors.selection_fg_active)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let screen = app.screen_mut();
    screen.viewport_rows = area.height.saturating_sub(2) as usize;
    frame.render_stateful_widget(list, area, &mut screen.list_state);
}

fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn render_preview(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let (title, content) = match app.selected_article() {
        Some(article) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    article.display_title().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Source: {}", article.display_source()),
                    Style::default().fg(colors.metadata_source),
                )),
            ];
            if let Some(author) = &article.author {
                lines.push(Line::from(Span::styled(
                    format!("By: {}", author),
                    Style::default().fg(colors.metadata_source),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!("Published: {}", article.published_display()),
                Style::default().fg(colors.metadata_date),
            )));
            lines.push(Line::from(Span::styled(
                format!("Link: {}", article.url),
                Style::default().fg(colors.metadata_link),
            )));
            if let Some(image) = &article.url_to_image {
                lines.push(Line::from(Span::styled(
                    format!("Image: {}", image),
                    Style::default().fg(colors.metadata_link),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(article.display_description()));

            (" Article ", Text::from(lines))
        }
        None => (" Article ", Text::from(empty_hint(app))),
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.inactive_border)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn empty_hint(app: &TuiApp) -> &'static str {
    match app.active_tab {
        Tab::Headlines if app.headlines.is_loading => "Loading headlines...",
        Tab::Headlines => "No headlines",
        Tab::Search if app.search_text.is_empty() => "Type / to search for news",
        Tab::Search => "No results",
        Tab::Favorites => "No favorites yet. Press f on any article to save it.",
    }
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let status = if let Some(msg) = app.status_text() {
        msg.to_string()
    } else if app.input_mode == InputMode::Search {
        "Type to search  Enter/Esc:Done".to_string()
    } else {
        match app.active_tab {
            Tab::Favorites => {
                "j/k:Nav  Tab:Switch  Enter:Open  d:Remove  u:Undo  q:Quit".to_string()
            }
            Tab::Search => {
                "j/k:Nav  Tab:Switch  /:Search  Enter:Open  f:Favorite  R:Retry  q:Quit"
                    .to_string()
            }
            Tab::Headlines => {
                "j/k:Nav  n/p:Page  Tab:Switch  Enter:Open  f:Favorite  R:Retry  q:Quit"
                    .to_string()
            }
        }
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
