use serde_json::Value;

/// 请求失败
///
/// 只有两类：网络/解析失败，以及非成功状态码。界面上统一折叠成一句话，
/// 见 [`ApiError::user_message`]。
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| extract_detail(&v));
        ApiError::Status { status, detail }
    }

    /// 响应体里有 `detail` 就用它，否则用调用方给的兜底文案
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// 取出 `detail` 字段：字符串直接返回；校验错误数组取第一条的 `msg`
pub fn extract_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_string_wins_over_fallback() {
        let err = ApiError::status(400, r#"{"detail":"资产代码已存在"}"#);
        assert_eq!(err.user_message("添加失败"), "资产代码已存在");
    }

    #[test]
    fn validation_array_uses_first_message() {
        let body = json!({"detail": [{"loc": ["body", "name"], "msg": "field required"}]});
        assert_eq!(extract_detail(&body).as_deref(), Some("field required"));
    }

    #[test]
    fn non_json_body_falls_back() {
        let err = ApiError::status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message("获取资产失败"), "获取资产失败");
    }

    #[test]
    fn network_errors_fall_back() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.user_message("登录失败"), "登录失败");
    }
}
