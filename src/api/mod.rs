#[cfg(test)]
pub(crate) mod fake;
pub mod newsapi;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::NewsResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    /// 2xx with a decoded body
    Success(NewsResponse),
    /// Non-success HTTP status, with the server's message when it sent one
    Failure { status: u16, message: Option<String> },
}

#[async_trait]
pub trait NewsApi {
    async fn headlines(&self, country_code: &str, page: u32) -> Result<ApiResponse>;

    async fn search(&self, query: &str, page: u32) -> Result<ApiResponse>;
}
