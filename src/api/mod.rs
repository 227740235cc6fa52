use crate::models::{Comment, Post, PostDraft};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn http(status: u16, body: &str, ctx: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("{ctx} ({status})")
        } else {
            format!("{ctx} ({status}): {}", body.trim())
        };
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

pub(crate) const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";
pub(crate) const DEFAULT_PAGE_SIZE: usize = 6;

/// Where comments for a post are looked up.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub(crate) enum CommentsRoute {
    /// `GET /comments?postId={id}`
    #[default]
    Query,
    /// `GET /posts/{id}/comments`
    Nested,
}

impl CommentsRoute {
    pub fn path(self, post_id: u64) -> String {
        match self {
            CommentsRoute::Query => format!("/comments?postId={post_id}"),
            CommentsRoute::Nested => format!("/posts/{post_id}/comments"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub page_size: usize,
    pub comments_route: CommentsRoute,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            comments_route: CommentsRoute::default(),
        }
    }
}

impl EnvConfig {
    /// Reads `window.ENV`, falling back to defaults for anything missing.
    pub fn new() -> Self {
        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return Self::default();
        };

        Self::from_lookup(|key| {
            let value = js_sys::Reflect::get(&env, &key.into()).ok()?;
            // Numbers are accepted for PAGE_SIZE as well as strings.
            value
                .as_string()
                .or_else(|| value.as_f64().map(|n| n.to_string()))
        })
    }

    /// Builds a config from a key lookup. Upper-case keys win over lower-case ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |upper: &str, lower: &str| lookup(upper).or_else(|| lookup(lower));
        let defaults = Self::default();

        let api_url = get("API_URL", "api_url")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_url);

        let page_size = get("PAGE_SIZE", "page_size")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| n as usize)
            .unwrap_or(defaults.page_size);

        let comments_route = match get("COMMENTS_ROUTE", "comments_route") {
            Some(raw) => CommentsRoute::from_str(raw.trim()).unwrap_or_else(|_| {
                log::warn!("unknown COMMENTS_ROUTE {raw:?}, using {}", defaults.comments_route);
                defaults.comments_route
            }),
            None => defaults.comments_route,
        };

        Self {
            api_url,
            page_size,
            comments_route,
        }
    }
}

/// Remote post store. Implemented by [`ApiClient`] over HTTP.
#[async_trait(?Send)]
pub(crate) trait PostsApi {
    async fn list_posts(&self) -> ApiResult<Vec<Post>>;

    #[allow(dead_code)]
    async fn get_post(&self, id: u64) -> ApiResult<Post>;

    async fn create_post(&self, draft: &PostDraft) -> ApiResult<Post>;

    async fn update_post(&self, id: u64, draft: &PostDraft) -> ApiResult<Post>;

    /// `Ok(false)` means the server answered with a non-success status.
    async fn delete_post(&self, id: u64) -> ApiResult<bool>;

    async fn list_comments(&self, post_id: u64) -> ApiResult<Vec<Comment>>;
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) comments_route: CommentsRoute,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            comments_route: CommentsRoute::default(),
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            comments_route: config.comments_route,
            ..Self::new(config.api_url.clone())
        }
    }

    pub(crate) fn post_path(id: u64) -> String {
        format!("/posts/{id}")
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&PostDraft>,
    ) -> ApiResult<reqwest::Response> {
        let url = self.url(path);
        log::debug!("{method} {url}");

        let mut req = reqwest::Client::new().request(method, url);
        if let Some(b) = body {
            // `.json` also sets `Content-Type: application/json`.
            req = req.json(b);
        }
        req.send().await.map_err(ApiError::network)
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&PostDraft>,
    ) -> ApiResult<T> {
        let res = self.send(method, path, body).await?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, &body, "Request failed"))
        }
    }

    /// Reads a post out of a create/update response.
    ///
    /// Update responses on some backends echo the body without an id; `fallback_id`
    /// covers that case. Create responses must carry the server-assigned id.
    pub(crate) fn parse_post_response(
        data: serde_json::Value,
        fallback_id: Option<u64>,
    ) -> ApiResult<Post> {
        let id = data
            .get("id")
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .or(fallback_id)
            .ok_or_else(|| ApiError::parse(format!("response is missing post id: {data}")))?;

        let get_s = |k: &str| {
            data.get(k)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        Ok(Post {
            id,
            user_id: data.get("userId").and_then(|v| v.as_u64()),
            title: get_s("title"),
            body: get_s("body"),
        })
    }
}

#[async_trait(?Send)]
impl PostsApi for ApiClient {
    async fn list_posts(&self) -> ApiResult<Vec<Post>> {
        self.request(Method::GET, "/posts", None).await
    }

    async fn get_post(&self, id: u64) -> ApiResult<Post> {
        self.request(Method::GET, &Self::post_path(id), None).await
    }

    async fn create_post(&self, draft: &PostDraft) -> ApiResult<Post> {
        let data: serde_json::Value = self.request(Method::POST, "/posts", Some(draft)).await?;
        Self::parse_post_response(data, None)
    }

    async fn update_post(&self, id: u64, draft: &PostDraft) -> ApiResult<Post> {
        let data: serde_json::Value = self
            .request(Method::PUT, &Self::post_path(id), Some(draft))
            .await?;
        Self::parse_post_response(data, Some(id))
    }

    async fn delete_post(&self, id: u64) -> ApiResult<bool> {
        let res = self
            .send(Method::DELETE, &Self::post_path(id), None)
            .await?;
        Ok(res.status().is_success())
    }

    async fn list_comments(&self, post_id: u64) -> ApiResult<Vec<Comment>> {
        self.request(Method::GET, &self.comments_route.path(post_id), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_env_config_defaults() {
        let cfg = EnvConfig::from_lookup(|_| None);
        assert_eq!(cfg, EnvConfig::default());
        assert_eq!(cfg.api_url, "https://jsonplaceholder.typicode.com");
        assert_eq!(cfg.page_size, 6);
        assert_eq!(cfg.comments_route, CommentsRoute::Query);
    }

    #[test]
    fn test_env_config_prefers_upper_case_keys() {
        let cfg = EnvConfig::from_lookup(lookup_from(&[
            ("API_URL", "http://upper:1/"),
            ("api_url", "http://lower:2"),
            ("page_size", "5"),
            ("COMMENTS_ROUTE", "Nested"),
        ]));
        assert_eq!(cfg.api_url, "http://upper:1");
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.comments_route, CommentsRoute::Nested);
    }

    #[test]
    fn test_env_config_rejects_bad_values() {
        let cfg = EnvConfig::from_lookup(lookup_from(&[
            ("API_URL", "   "),
            ("PAGE_SIZE", "0"),
            ("COMMENTS_ROUTE", "graphql"),
        ]));
        assert_eq!(cfg, EnvConfig::default());
    }

    #[test]
    fn test_comments_route_paths() {
        assert_eq!(CommentsRoute::Query.path(3), "/comments?postId=3");
        assert_eq!(CommentsRoute::Nested.path(3), "/posts/3/comments");
    }

    #[test]
    fn test_api_client_new_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/".to_string());
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(client.url("/posts/1"), "http://localhost:3000/posts/1");
    }

    #[test]
    fn test_single_post_path() {
        let client = ApiClient::new(DEFAULT_API_URL.to_string());
        assert_eq!(ApiClient::post_path(42), "/posts/42");
        assert_eq!(
            client.url(&ApiClient::post_path(42)),
            format!("{DEFAULT_API_URL}/posts/42")
        );
    }

    #[test]
    fn test_api_client_from_config_uses_comments_route() {
        let cfg = EnvConfig {
            comments_route: CommentsRoute::Nested,
            ..EnvConfig::default()
        };
        let client = ApiClient::from_config(&cfg);
        assert_eq!(client.comments_route, CommentsRoute::Nested);
        assert_eq!(client.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_parse_create_response_requires_id() {
        let err = ApiClient::parse_post_response(serde_json::json!({"title": "t"}), None)
            .expect_err("create without id must fail");
        assert_eq!(err.kind, ApiErrorKind::Parse);
    }

    #[test]
    fn test_parse_update_response_falls_back_to_requested_id() {
        let post =
            ApiClient::parse_post_response(serde_json::json!({"title": "t", "body": "b"}), Some(9))
                .expect("update response should parse");
        assert_eq!(post, Post::new(9, "t", "b"));
    }

    #[test]
    fn test_parse_response_prefers_server_id() {
        let post = ApiClient::parse_post_response(
            serde_json::json!({"id": 101, "title": "t", "body": "b", "userId": 1}),
            Some(9),
        )
        .expect("should parse");
        assert_eq!(post.id, 101);
        assert_eq!(post.user_id, Some(1));
    }

    #[test]
    fn test_http_error_message() {
        let e = ApiError::http(404, "", "Request failed");
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.to_string(), "Request failed (404)");

        let e = ApiError::http(500, " boom ", "Request failed");
        assert_eq!(e.to_string(), "Request failed (500): boom");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_env_config_reads_window_env() {
        let window = web_sys::window().expect("window");
        let env = js_sys::Object::new();
        js_sys::Reflect::set(&env, &"API_URL".into(), &"http://example.test".into())
            .expect("set API_URL");
        js_sys::Reflect::set(&env, &"PAGE_SIZE".into(), &wasm_bindgen::JsValue::from_f64(5.0))
            .expect("set PAGE_SIZE");
        js_sys::Reflect::set(&window, &"ENV".into(), &env).expect("set ENV");

        let cfg = EnvConfig::new();
        assert_eq!(cfg.api_url, "http://example.test");
        assert_eq!(cfg.page_size, 5);

        js_sys::Reflect::delete_property(&window, &"ENV".into()).expect("delete ENV");
        assert_eq!(EnvConfig::new(), EnvConfig::default());
    }
}
