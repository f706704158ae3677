use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A single news article as returned by the news API.
///
/// Two articles are the *same item* when their urls match; they are *equal*
/// only when every field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: Source,
    pub published_at: Option<String>,
    pub author: Option<String>,
    pub content: Option<String>,
}

impl Article {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn same_item(&self, other: &Article) -> bool {
        self.url == other.url
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("(Untitled)")
    }

    pub fn display_description(&self) -> String {
        self.description
            .as_deref()
            .map(|d| html_escape::decode_html_entities(d).trim().to_string())
            .unwrap_or_default()
    }

    pub fn display_source(&self) -> &str {
        if self.source.name.is_empty() {
            "Unknown source"
        } else {
            &self.source.name
        }
    }

    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        self.published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Publication time as `YYYY-MM-DD HH:MM`, or the raw value if it isn't RFC 3339.
    pub fn published_display(&self) -> String {
        match self.published_at_utc() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => self.published_at.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article {
            url: "https://example.com/a".into(),
            title: Some("Title".into()),
            description: Some("Tom &amp; Jerry".into()),
            url_to_image: None,
            source: Source {
                id: None,
                name: "Example".into(),
            },
            published_at: Some("2024-03-05T10:15:00Z".into()),
            author: None,
            content: None,
        }
    }

    #[test]
    fn test_same_item_by_url_only() {
        let a = sample();
        let mut b = sample();
        b.title = Some("Other title".into());

        assert!(a.same_item(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_deserializes_newsapi_shape() {
        let json = r#"{
            "source": {"id": null, "name": "BBC News"},
            "author": "BBC",
            "title": "Headline",
            "description": "Desc",
            "url": "https://bbc.co.uk/1",
            "urlToImage": "https://bbc.co.uk/1.jpg",
            "publishedAt": "2024-01-01T00:00:00Z",
            "content": null
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.url, "https://bbc.co.uk/1");
        assert_eq!(article.url_to_image.as_deref(), Some("https://bbc.co.uk/1.jpg"));
        assert_eq!(article.source.name, "BBC News");
        assert!(article.source.id.is_none());
    }

    #[test]
    fn test_display_description_decodes_entities() {
        assert_eq!(sample().display_description(), "Tom & Jerry");
    }

    #[test]
    fn test_display_title_fallback() {
        let article = Article::new("https://example.com/x");
        assert_eq!(article.display_title(), "(Untitled)");
    }

    #[test]
    fn test_published_display() {
        assert_eq!(sample().published_display(), "2024-03-05 10:15");

        let mut article = sample();
        article.published_at = Some("yesterday".into());
        assert_eq!(article.published_display(), "yesterday");
    }
}
