use anyhow::{Context, Result};
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
}

/// Downloads a web page and pulls out its main body text.
#[derive(Clone)]
pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Article> {
        let parsed = Url::parse(url.trim()).with_context(|| format!("Invalid URL: {}", url))?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", parsed))?;

        if !response.status().is_success() {
            anyhow::bail!("Fetching {} failed: {}", parsed, response.status());
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", parsed))?;

        let (title, text) = extract_article(&html);
        tracing::info!(url = %parsed, chars = text.len(), "Fetched article");

        Ok(Article {
            url: parsed.to_string(),
            title,
            text,
        })
    }
}

fn selector(css: &str) -> Selector {
    // Only called with literal selectors below.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// Best-effort main text: paragraphs inside `<article>`, else `<main>`,
/// else the whole `<body>`. Paragraphs are separated by blank lines.
pub fn extract_article(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector("title"))
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let paragraphs = selector("p, h1, h2, h3, li");
    for container in ["article", "main", "body"] {
        let Some(root) = document.select(&selector(container)).next() else {
            continue;
        };

        let blocks: Vec<String> = root
            .select(&paragraphs)
            .filter(|el| !inside_skipped(el))
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect();

        if !blocks.is_empty() {
            return (title, blocks.join("\n\n"));
        }
    }

    (title, String::new())
}

/// Collapsed text content of an element.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Navigation, boilerplate and nested list items are not article text.
fn inside_skipped(el: &ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "nav" | "header" | "footer" | "aside" | "script" | "style" | "li" | "p"))
}
