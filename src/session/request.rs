use super::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// 一次 REST 调用的描述
///
/// 页面状态只负责产出描述，真正的发送由后台执行器完成。
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// 是否附带 Bearer token（只有登录请求为 false）
    pub authenticated: bool,
}

impl ApiRequest {
    fn new(method: HttpMethod, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, RequestBody::Empty)
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path, RequestBody::Json(body))
    }

    pub fn put_json(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Put, path, RequestBody::Json(body))
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path, RequestBody::Empty)
    }

    pub fn post_form(path: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self::new(HttpMethod::Post, path, RequestBody::Form(fields))
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method.as_str(), self.path)?;
        if !self.query.is_empty() {
            let qs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "?{}", qs.join("&"))?;
        }
        Ok(())
    }
}

/// 请求的实际承接方：远端 HTTP 会话，或本地特征目录
///
/// 成功时返回解析后的 JSON；空响应体（如 204）返回 `Value::Null`。
#[async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, req: &ApiRequest) -> Result<Value, ApiError>;

    /// 登录/退出时更新凭证；本地后端不需要
    fn set_token(&self, _token: Option<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_includes_query() {
        let req = ApiRequest::get("/strategy/signals").with_query("strategy_id", 7);
        assert_eq!(req.to_string(), "GET /strategy/signals?strategy_id=7");
        assert_eq!(req.query_value("strategy_id"), Some("7"));
    }

    #[test]
    fn login_is_anonymous_form() {
        let req = ApiRequest::post_form(
            "/auth/token",
            vec![("username".into(), "u".into()), ("password".into(), "p".into())],
        )
        .anonymous();
        assert!(!req.authenticated);
        assert!(req.json_body().is_none());
    }

    #[test]
    fn json_constructors_default_to_authenticated() {
        let req = ApiRequest::put_json("/assets/1", json!({"code": "AAPL"}));
        assert!(req.authenticated);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.json_body(), Some(&json!({"code": "AAPL"})));
    }
}
