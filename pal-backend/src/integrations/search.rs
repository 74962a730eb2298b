//! Web search via the DuckDuckGo Instant Answer API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEARCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub heading: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub source: String,
    pub url: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    abstract_source: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a plain topic or a named group of topics
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}

fn flatten_topics(topics: Vec<RelatedTopic>, out: &mut Vec<SearchResult>) {
    for topic in topics {
        if let (Some(text), Some(url)) = (topic.text, topic.first_url) {
            out.push(SearchResult { text, url });
        }
        flatten_topics(topic.topics, out);
    }
}

pub struct SearchClient {
    client: Client,
    endpoint: String,
}

impl SearchClient {
    pub fn new(endpoint: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub async fn search(&self, query: &str) -> Result<SearchResponse, String> {
        log::info!("[SEARCH] Querying instant answers for '{}'", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| format!("Search request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Search API returned error status: {}", status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read search response: {}", e))?;

        let answer: InstantAnswer = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse search response: {}", e))?;

        let mut results = Vec::new();
        flatten_topics(answer.related_topics, &mut results);

        Ok(SearchResponse {
            query: query.to_string(),
            heading: answer.heading,
            abstract_text: answer.abstract_text,
            source: answer.abstract_source,
            url: answer.abstract_url,
            results,
        })
    }
}
