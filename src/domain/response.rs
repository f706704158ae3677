use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// One page (or an accumulation of pages) of articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl NewsResponse {
    pub fn new(articles: Vec<Article>, total_results: u32) -> Self {
        Self {
            status: "ok".to_string(),
            total_results,
            articles,
        }
    }

    /// Append a freshly fetched page to the tail, keeping arrival order.
    pub fn append_page(&mut self, page: NewsResponse) {
        self.articles.extend(page.articles);
        self.total_results = page.total_results;
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
