use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use codegram_types::{
    Comment, CommentList, ContentRef, FeedPage, FollowStatus, InteractionKind, NotificationList,
    ToggleState, User,
};

use crate::api::{CodegramApi, FeedSource};
use crate::error::ApiError;

/// Connection settings for [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// API root, e.g. `https://codegram.dev/api`. A trailing `/` is ignored.
    pub base_url: String,
    /// Raw `Cookie` header value issued by the identity provider flow,
    /// e.g. `connect.sid=s%3Aabc`. `None` sends anonymous requests.
    pub session_cookie: Option<String>,
}

/// reqwest-backed [`CodegramApi`].
///
/// Stateless apart from the underlying connection pool and cookie jar;
/// cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

// ── Wire shapes private to the client ───────────────────────────────

/// `POST /likes` answers `{isLiked, likesCount}`, `POST /bookmarks`
/// answers `{isBookmarked, bookmarksCount}`.
#[derive(Deserialize)]
struct ToggleResponse {
    #[serde(alias = "isLiked", alias = "isBookmarked")]
    active: bool,
    #[serde(alias = "likesCount", alias = "bookmarksCount")]
    count: u32,
}

#[derive(Serialize)]
struct FeedQuery {
    page: u32,
    limit: u32,
}

#[derive(Serialize)]
struct NewComment<'a> {
    content: &'a str,
    #[serde(flatten)]
    target: &'a ContentRef,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowRequest<'a> {
    following_id: &'a str,
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::Config("base URL is empty".into()));
        }

        let mut headers = HeaderMap::new();
        if let Some(cookie) = options.session_cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::Config(format!("session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-2xx responses to `ApiError::Server` and decode the body.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let resp = Self::check(resp).await?;
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server { status: code, message: body });
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl CodegramApi for HttpClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        let resp = self.http.get(self.url("/auth/me")).send().await?;
        Self::parse(resp).await
    }

    async fn fetch_feed(
        &self,
        source: FeedSource,
        page: u32,
        limit: u32,
    ) -> Result<FeedPage, ApiError> {
        debug!(%source, page, limit, "fetching feed page");
        let resp = self
            .http
            .get(self.url(source.path()))
            .query(&FeedQuery { page, limit })
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn toggle(
        &self,
        kind: InteractionKind,
        target: &ContentRef,
    ) -> Result<ToggleState, ApiError> {
        let path = match kind {
            InteractionKind::Like => "/likes",
            InteractionKind::Bookmark => "/bookmarks",
        };
        let resp = self.http.post(self.url(path)).json(target).send().await?;
        let body: ToggleResponse = Self::parse(resp).await?;
        Ok(ToggleState::new(body.active, body.count))
    }

    async fn fetch_notifications(&self) -> Result<NotificationList, ApiError> {
        let resp = self.http.get(self.url("/notifications")).send().await?;
        Self::parse(resp).await
    }

    async fn mark_notifications_read(&self) -> Result<(), ApiError> {
        let resp = self.http.post(self.url("/notifications/read")).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn fetch_comments(&self, target: &ContentRef) -> Result<Vec<Comment>, ApiError> {
        let resp = self.http.get(self.url("/comments")).query(target).send().await?;
        let list: CommentList = Self::parse(resp).await?;
        Ok(list.comments)
    }

    async fn add_comment(&self, target: &ContentRef, content: &str) -> Result<Comment, ApiError> {
        let body = NewComment { content, target };
        let resp = self.http.post(self.url("/comments")).json(&body).send().await?;
        Self::parse(resp).await
    }

    async fn toggle_follow(&self, user_id: &str) -> Result<FollowStatus, ApiError> {
        let body = FollowRequest { following_id: user_id };
        let resp = self.http.post(self.url("/follows")).json(&body).send().await?;
        Self::parse(resp).await
    }
}
