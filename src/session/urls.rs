/// 认证
pub const PATH_AUTH_TOKEN: &str = "/auth/token";

/// 健康检查
pub const PATH_HEALTH: &str = "/health";

/// 资产
pub const PATH_ASSETS: &str = "/assets/";

/// 标签（只读）
pub const PATH_TAGS: &str = "/tags/";

/// 投资组合：列表只返回当前用户的组合
pub const PATH_PORTFOLIOS: &str = "/portfolios/";
pub const PATH_PORTFOLIOS_ME: &str = "/portfolios/me";

/// 策略
pub const PATH_STRATEGY: &str = "/strategy/";
pub const PATH_STRATEGY_SIGNALS: &str = "/strategy/signals";
pub const PATH_STRATEGY_BACKTEST: &str = "/strategy/backtest";

/// 风险测评
pub const PATH_RISK_SUBMIT: &str = "/risk_assessment/submit";
pub const PATH_RISK_LATEST: &str = "/risk_assessment/latest";

/// 市场数据
pub const PATH_MARKET_DATA: &str = "/market-data/";

/// 特征库：没有后端，由本地 SQLite 目录应答
pub const PATH_FEATURES: &str = "/features/";

/// 集合路径下的单条记录，如 `/assets/` + 1 => `/assets/1`
pub fn item_path(collection: &str, id: i64) -> String {
    format!("{}/{}", collection.trim_end_matches('/'), id)
}

/// 该路径是否由本地特征目录处理
pub fn is_local_path(path: &str) -> bool {
    path == PATH_FEATURES.trim_end_matches('/') || path.starts_with(PATH_FEATURES)
}

/// 拼接完整 URL
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
