//! Minimal client for the MediaWiki `action=query` API.
//!
//! Both the encyclopedia and the mapping registry run MediaWiki, so one client
//! and one response model serve the langlink and the registry lookups.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TranslatorConfig;
use crate::error::TranslateError;

/// Raw response of an `action=query` request (`format=json`, legacy format).
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub query: Option<Query>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Query {
    /// Keyed by page id; missing pages get negative ids.
    #[serde(default)]
    pub pages: Option<HashMap<String, Page>>,
    #[serde(default)]
    pub normalized: Vec<TitleAlias>,
    #[serde(default)]
    pub redirects: Vec<TitleAlias>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub langlinks: Vec<Langlink>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
pub struct Langlink {
    pub lang: String,
    #[serde(rename = "*")]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct Revision {
    #[serde(rename = "*", default)]
    pub content: Option<String>,
}

/// `from` was answered under the title `to`.
#[derive(Debug, Deserialize)]
pub struct TitleAlias {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// One batch query against a MediaWiki endpoint.
pub trait QueryApi {
    /// `params` are sent as-is alongside `format=json`.
    fn query(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiResponse, TranslateError>;
}

/// [`QueryApi`] over HTTP. Requests are POSTed as urlencoded forms so long
/// title batches never hit URL length limits.
pub struct HttpQueryApi {
    client: Client,
}

impl HttpQueryApi {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(HttpQueryApi {
            client: builder.build()?,
        })
    }
}

impl QueryApi for HttpQueryApi {
    fn query(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ApiResponse, TranslateError> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("format", "json"));

        let body = self
            .client
            .post(endpoint)
            .form(&form)
            .send()?
            .error_for_status()?
            .text()?;
        debug!(endpoint, bytes = body.len(), "api response received");

        let mut response: ApiResponse = serde_json::from_str(&body)?;
        if let Some(error) = response.error.take() {
            return Err(TranslateError::Api {
                code: error.code,
                info: error.info,
            });
        }
        Ok(response)
    }
}

/// Copy each answered title back onto the title it was requested under.
///
/// Redirects are applied before normalization because the API normalizes
/// first and resolves redirects second, so a chain
/// `requested -> normalized -> redirect target` unwinds in reverse.
pub fn propagate_aliases(pages: &mut BTreeMap<String, String>, query: &Query) {
    for alias in query.redirects.iter().chain(&query.normalized) {
        if let Some(value) = pages.get(&alias.to).cloned() {
            pages.insert(alias.from.clone(), value);
        }
    }
}

/// Fetch the current wikitext of `titles` in one request.
///
/// Titles without exactly one content-bearing revision are left out.
pub fn get_page_contents<A: QueryApi + ?Sized>(
    api: &A,
    endpoint: &str,
    titles: &[String],
) -> Result<BTreeMap<String, String>, TranslateError> {
    if titles.is_empty() {
        return Ok(BTreeMap::new());
    }
    let joined = titles.join("|");
    let response = api.query(
        endpoint,
        &[
            ("action", "query"),
            ("titles", &joined),
            ("prop", "revisions"),
            ("rvprop", "content"),
        ],
    )?;

    let Some(query) = response.query else {
        return Ok(BTreeMap::new());
    };
    let Some(found) = query.pages.as_ref() else {
        return Ok(BTreeMap::new());
    };

    let mut pages = BTreeMap::new();
    for page in found.values() {
        if let [Revision { content: Some(content) }] = page.revisions.as_slice() {
            pages.insert(page.title.clone(), content.clone());
        }
    }
    propagate_aliases(&mut pages, &query);
    debug!(requested = titles.len(), found = pages.len(), "page contents fetched");
    Ok(pages)
}
