pub mod assets;
pub mod feature_store;
pub mod login;
pub mod market_data;
pub mod portfolios;
pub mod risk_assessment;
pub mod strategy;
pub mod tags;

pub use assets::{assets_page, AssetsPage};
pub use feature_store::{feature_store_page, FeatureStorePage};
pub use login::LoginPage;
pub use market_data::{market_data_page, MarketDataPage};
pub use portfolios::{portfolios_page, PortfoliosPage};
pub use risk_assessment::RiskAssessmentPage;
pub use strategy::StrategyPage;
pub use tags::TagsPage;

use crate::session::{ApiError, ApiRequest};
use crossterm::event::KeyCode;
use serde_json::Value;

/// 请求结果回到哪个页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Login,
    Health,
    Assets,
    Tags,
    Portfolios,
    Strategies,
    Risk,
    MarketData,
    Features,
}

impl PageId {
    /// 左侧菜单顺序
    pub const MENU: [PageId; 7] = [
        PageId::Assets,
        PageId::Tags,
        PageId::Portfolios,
        PageId::Strategies,
        PageId::Risk,
        PageId::MarketData,
        PageId::Features,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            PageId::Login => "登录",
            PageId::Health => "健康检查",
            PageId::Assets => "资产管理",
            PageId::Tags => "标签管理",
            PageId::Portfolios => "投资组合管理",
            PageId::Strategies => "策略管理",
            PageId::Risk => "风险测评",
            PageId::MarketData => "市场数据",
            PageId::Features => "特征库",
        }
    }
}

/// 请求用途；带 id 的变体用于丢弃过期响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Save,
    Delete,
    Signals(i64),
    Backtests(i64),
    SaveSignal(i64),
    SaveBacktest(i64),
    RetryBacktest(i64),
    Submit,
    Latest,
    Login,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub page: PageId,
    pub op: Op,
}

impl Ticket {
    pub fn new(page: PageId, op: Op) -> Self {
        Self { page, op }
    }
}

/// 页面产出的待发请求
pub type Outgoing = Vec<(Op, ApiRequest)>;

/// 页面状态机
///
/// 页面本身不做 IO：按键和响应只改状态，需要的请求以 [`Outgoing`] 返回，
/// 由 App 交给后台执行器。
pub trait Page {
    /// 进入页面时的请求（通常是列表读取）
    fn activate(&mut self) -> Outgoing;
    fn handle_key(&mut self, key: KeyCode) -> Outgoing;
    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing;
    /// 弹窗、确认框等占用键盘时为 true
    fn captures_input(&self) -> bool;
}
