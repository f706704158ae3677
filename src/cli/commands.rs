use crate::app::{AppContext, NewsdeskError, Result};
use crate::domain::{Article, NewsResponse, Resource};

pub async fn headlines(ctx: &AppContext, country: &str, pages: u32) -> Result<()> {
    let vm = &ctx.viewmodel;
    let mut latest = Resource::Idle;

    for _ in 0..pages.max(1) {
        latest = vm.fetch_headlines(country).await;
        if latest.is_error() || vm.headlines_last_page() {
            break;
        }
    }

    print_resource(&latest)
}

pub async fn search(ctx: &AppContext, query: &str, pages: u32) -> Result<()> {
    if query.trim().is_empty() {
        return Err(NewsdeskError::Other("Search query is empty".into()));
    }

    let vm = &ctx.viewmodel;
    let mut latest = Resource::Idle;

    for _ in 0..pages.max(1) {
        latest = vm.search_news(query).await;
        if latest.is_error() || vm.search_last_page() {
            break;
        }
    }

    print_resource(&latest)
}

fn print_resource(resource: &Resource<NewsResponse>) -> Result<()> {
    match resource {
        Resource::Success(response) => {
            if response.is_empty() {
                println!("No articles");
                return Ok(());
            }
            for article in &response.articles {
                print_article(article);
            }
            println!(
                "\n{} of {} results",
                response.len(),
                response.total_results
            );
            Ok(())
        }
        Resource::Error(message) => Err(NewsdeskError::Other(format!("Sorry error : {}", message))),
        Resource::Idle | Resource::Loading => Ok(()),
    }
}

fn print_article(article: &Article) {
    let date = article
        .published_at_utc()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());

    println!(
        "{} [{}] {}\n  {}",
        date,
        article.display_source(),
        article.display_title(),
        article.url
    );
}

pub fn list_favorites(ctx: &AppContext, json: bool) -> Result<()> {
    let favorites = ctx.repository.favorites()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
        return Ok(());
    }

    if favorites.is_empty() {
        println!("No favorites");
        return Ok(());
    }

    for article in &favorites {
        print_article(article);
    }
    Ok(())
}

pub fn unfavorite(ctx: &AppContext, url: &str) -> Result<()> {
    let article = ctx
        .repository
        .favorite(url)?
        .ok_or_else(|| NewsdeskError::ArticleNotFound(url.to_string()))?;

    ctx.repository.remove_favorite(&article)?;
    println!("Removed favorite: {}", article.display_title());
    Ok(())
}
