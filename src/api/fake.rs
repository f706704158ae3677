//! Scripted [`NewsApi`] for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiResponse, NewsApi};
use crate::app::Result;
use crate::domain::{Article, NewsResponse};

/// Replays queued replies in call order and records every `(key, page)`.
/// Once the script runs out it answers with an empty page.
#[derive(Default)]
pub struct ScriptedApi {
    replies: Mutex<VecDeque<(Duration, Result<ApiResponse>)>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedApi {
    pub fn reply(&self, reply: Result<ApiResponse>) {
        self.reply_after(Duration::ZERO, reply);
    }

    /// Queue a reply that arrives `delay` after the call.
    pub fn reply_after(&self, delay: Duration, reply: Result<ApiResponse>) {
        self.replies.lock().unwrap().push_back((delay, reply));
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    async fn next(&self, key: &str, page: u32) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push((key.to_string(), page));
        let scripted = self.replies.lock().unwrap().pop_front();
        let (delay, reply) = scripted.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Ok(ApiResponse::Success(NewsResponse::new(vec![], 0))),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

#[async_trait]
impl NewsApi for ScriptedApi {
    async fn headlines(&self, country_code: &str, page: u32) -> Result<ApiResponse> {
        self.next(country_code, page).await
    }

    async fn search(&self, query: &str, page: u32) -> Result<ApiResponse> {
        self.next(query, page).await
    }
}

/// `n` titled articles under `https://news/<prefix>/<i>`.
pub fn page(prefix: &str, n: usize, total: u32) -> ApiResponse {
    let articles = (0..n)
        .map(|i| {
            let mut a = Article::new(format!("https://news/{}/{}", prefix, i));
            a.title = Some(format!("{} {}", prefix, i));
            a
        })
        .collect();
    ApiResponse::Success(NewsResponse::new(articles, total))
}
