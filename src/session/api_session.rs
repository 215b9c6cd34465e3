use super::error::ApiError;
use super::request::{ApiRequest, Backend, HttpMethod, RequestBody};
use super::urls::join_url;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

/// 后端会话
///
/// 持有 HTTP 客户端、服务地址和当前 token。除登录外的每个请求都会带上
/// `Authorization: Bearer <token>`；没有 token 时照常发送，由后端返回 401。
pub struct ApiSession {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiSession {
    /// 创建一个新的 ApiSession
    ///
    /// # 参数
    ///
    /// * `base_url` - 后端地址，如 `http://localhost:8000`
    /// * `timeout` - 单个请求的超时时间
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zhitou/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    fn build(&self, req: &ApiRequest) -> RequestBuilder {
        let url = join_url(&self.base_url, &req.path);
        let mut builder = match req.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match &req.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(fields) => builder.form(fields),
        };
        if req.authenticated {
            if let Some(token) = self.token() {
                builder = builder.bearer_auth(token);
            }
        }
        builder
    }
}

#[async_trait]
impl Backend for ApiSession {
    async fn execute(&self, req: &ApiRequest) -> Result<Value, ApiError> {
        let resp = self.build(req).send().await.map_err(|e| {
            warn!("{} execute(...) [{}] failed: {}", self, req, e);
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("{} execute(...) [{}] -> {}", self, req, status.as_u16());
            return Err(ApiError::status(status.as_u16(), &body));
        }
        info!("{} execute(...) [{}] -> {}", self, req, status.as_u16());

        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 设置或清除 token
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }
}

impl std::fmt::Display for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = if self.token().is_some() { "auth" } else { "anon" };
        write!(f, "<ApiSession [{} {}]>", self.base_url, auth)
    }
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_only_when_authenticated() {
        let session = ApiSession::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        session.set_token(Some("abc".into()));

        let req = session.build(&ApiRequest::get("/assets/")).build().unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:8000/assets/");
        assert_eq!(
            req.headers().get("authorization").unwrap().to_str().unwrap(),
            "Bearer abc"
        );

        let login = ApiRequest::post_form("/auth/token", vec![]).anonymous();
        let req = session.build(&login).build().unwrap();
        assert!(req.headers().get("authorization").is_none());
    }

    #[test]
    fn query_is_encoded() {
        let session = ApiSession::new("http://localhost:8000", Duration::from_secs(5)).unwrap();
        let req = ApiRequest::get("/strategy/backtest").with_query("strategy_id", 3);
        let built = session.build(&req).build().unwrap();
        assert_eq!(built.url().query(), Some("strategy_id=3"));
    }

    #[test]
    fn clearing_token_changes_display() {
        let session = ApiSession::new("http://h", Duration::from_secs(5)).unwrap();
        session.set_token(Some("t".into()));
        assert_eq!(session.to_string(), "<ApiSession [http://h auth]>");
        session.set_token(None);
        assert_eq!(session.token(), None);
        assert_eq!(session.to_string(), "<ApiSession [http://h anon]>");
    }
}
