use std::time::Duration;

pub const APP_TITLE: &str = "智能投顾系统";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 主题偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DarkMode {
    Light,
    Dark,
    System,
}

impl DarkMode {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => DarkMode::Light,
            "dark" => DarkMode::Dark,
            _ => DarkMode::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlags {
    pub enable_mock: bool,
    pub enable_analytics: bool,
    pub dark_mode: DarkMode,
}

/// 运行配置
///
/// 所有字段都来自环境变量（可由 `.env` 提供），未设置时使用默认值。
/// 每个变量同时接受 `VITE_` 前缀的写法，便于沿用网页版的 `.env`。
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub database_url: String,
    pub http_timeout: Duration,
    pub feature_failure_rate: f64,
    pub features: FeatureFlags,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            database_url: "sqlite://zhitou.db?mode=rwc".to_string(),
            http_timeout: Duration::from_secs(30),
            feature_failure_rate: 0.1,
            features: FeatureFlags {
                enable_mock: false,
                enable_analytics: true,
                dark_mode: DarkMode::System,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 用任意查找函数构造配置（测试里直接传闭包）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .or_else(|| lookup(&format!("VITE_{}", key)))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let api_base_url = get("API_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let database_url = get("DATABASE_URL").unwrap_or(defaults.database_url);
        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);
        let feature_failure_rate = get("FEATURE_MOCK_FAILURE_RATE")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or(defaults.feature_failure_rate);

        // 与网页版一致：ENABLE_MOCK 只有 "true" 才开启，ENABLE_ANALYTICS 只有 "true" 才开启
        let enable_mock = get("ENABLE_MOCK").map(|v| v == "true").unwrap_or(false);
        let enable_analytics = get("ENABLE_ANALYTICS")
            .map(|v| v == "true")
            .unwrap_or(true);
        let dark_mode = get("DARK_MODE")
            .map(|v| DarkMode::parse(&v))
            .unwrap_or(DarkMode::System);

        Self {
            api_base_url,
            database_url,
            http_timeout,
            feature_failure_rate,
            features: FeatureFlags {
                enable_mock,
                enable_analytics,
                dark_mode,
            },
        }
    }
}
