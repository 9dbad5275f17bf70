use std::future::Future;
use std::sync::{Arc, RwLock};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, REFERER};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{AppError, Context, Result};

use super::csrf;
use super::request::{build_headers, expand_env_vars};
use super::{
    ActionReply, AnalyticsReply, AnalyticsSnapshot, ApiCall, GroceryApi, GroceryItem,
    NotificationsReply, SearchReply, ServerNotification,
};

const CSRF_HEADER: &str = "X-CSRFToken";
const SESSION_COOKIE: &str = "sessionid";
/// Upper bound on items requested from `/api/search/`; the server defaults to 10.
pub const SEARCH_LIMIT: usize = 200;

/// Cloneable handle to the grocery tracker API. Clones share the cookie jar and CSRF token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    csrf_page: String,
    jar: Arc<Jar>,
    csrf_token: Arc<RwLock<Option<String>>>,
    has_session: bool,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| AppError::message(format!("Invalid base URL: {err}")))?;

        let jar = Arc::new(Jar::default());
        let has_session = match &config.session_cookie {
            Some(raw) => {
                let value = expand_env_vars(raw)?;
                jar.add_cookie_str(&format!("{SESSION_COOKIE}={value}; Path=/"), &base);
                true
            }
            None => false,
        };

        let csrf_token = match &config.csrf_token {
            Some(raw) => Some(expand_env_vars(raw)?),
            None => None,
        };

        let client = Client::builder()
            .default_headers(build_headers(&config.headers)?)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()
            .context("Failed to construct HTTP client")?;

        Ok(Self {
            client,
            base,
            csrf_page: config.csrf_page.clone(),
            jar,
            csrf_token: Arc::new(RwLock::new(csrf_token)),
            has_session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Whether an authenticated session cookie was configured.
    pub fn has_session(&self) -> bool {
        self.has_session
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token.read().ok().and_then(|guard| guard.clone())
    }

    /// Resolve the CSRF token once: configured value, then the bootstrap page, then the cookie.
    pub async fn acquire_csrf_token(&self) -> Result<Option<String>> {
        if let Some(token) = self.csrf_token() {
            return Ok(Some(token));
        }

        let segments: Vec<&str> = self.csrf_page.trim_start_matches('/').split('/').collect();
        let url = self.url_for(&segments)?;
        let html = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to load CSRF page {url}"))?
            .text()
            .await
            .context("Failed to read CSRF page body")?;

        let token = csrf::extract_from_html(&html).or_else(|| {
            self.jar
                .cookies(&self.base)
                .and_then(|header| header.to_str().ok().map(str::to_string))
                .and_then(|header| csrf::token_from_cookie_header(&header))
        });

        match &token {
            Some(_) => log::debug!("CSRF token acquired from {url}"),
            None => log::warn!("No CSRF token found at {url}; mutating requests may be rejected"),
        }

        if let Ok(mut guard) = self.csrf_token.write() {
            *guard = token.clone();
        }
        Ok(token)
    }

    pub async fn execute(&self, call: &ApiCall) -> Result<ActionReply> {
        let url = self.url_for(&call.segments())?;
        self.request_json(call.method(), url, call.body()).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<GroceryItem>> {
        let mut url = self.url_for(&["api", "search", ""])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &SEARCH_LIMIT.to_string());

        let reply: SearchReply = self.request_json(Method::GET, url, None).await?;
        if reply.success {
            Ok(reply.items)
        } else {
            Err(AppError::message(
                reply.error.unwrap_or_else(|| "Search failed".to_string()),
            ))
        }
    }

    pub async fn notifications(&self) -> Result<Vec<ServerNotification>> {
        let url = self.url_for(&["api", "notifications", ""])?;
        let reply: NotificationsReply = self.request_json(Method::GET, url, None).await?;
        if reply.success {
            Ok(reply.notifications)
        } else {
            Err(AppError::message(reply.error.unwrap_or_else(|| {
                "Failed to load notifications".to_string()
            })))
        }
    }

    pub async fn analytics(&self) -> Result<AnalyticsSnapshot> {
        let url = self.url_for(&["api", "analytics", ""])?;
        let reply: AnalyticsReply = self.request_json(Method::GET, url, None).await?;
        if reply.success {
            Ok(reply.snapshot)
        } else {
            Err(AppError::message(reply.error.unwrap_or_else(|| {
                "Failed to load analytics".to_string()
            })))
        }
    }

    /// Best-effort server-side logout; the response body is not inspected.
    pub async fn logout(&self) -> Result<()> {
        let url = self.url_for(&["accounts", "logout", ""])?;
        self.client
            .get(url)
            .send()
            .await
            .context("Logout request failed")?;
        Ok(())
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::message("Base URL cannot be used as a path base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<T> {
        let mut request = self.client.request(method.clone(), url.clone());

        if method != Method::GET {
            if let Some(token) = self.csrf_token() {
                request = request.header(CSRF_HEADER, token);
            }
            if let Ok(referer) = HeaderValue::from_str(self.base.as_str()) {
                request = request.header(REFERER, referer);
            }
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        log::debug!("{method} {url}");
        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {url} failed"))?;
        let status = response.status();
        let text = response.text().await?;

        // Error statuses still carry `{success: false, error}` bodies, so parse regardless.
        serde_json::from_str(&text)
            .with_context(|| format!("Unexpected response from {url} ({status})"))
            .map_err(AppError::from)
    }
}

impl GroceryApi for ApiClient {
    fn send(&self, call: &ApiCall) -> impl Future<Output = Result<ActionReply>> + Send {
        self.execute(call)
    }
}
