pub mod asset;
pub mod feature;
pub mod market_data;
pub mod portfolio;
pub mod risk;
pub mod strategy;
pub mod tag;

pub use asset::Asset;
pub use feature::FeatureRecord;
pub use market_data::{MarketAssetType, MarketData};
pub use portfolio::Portfolio;
pub use risk::RiskAssessment;
pub use strategy::{AssetClass, Backtest, Signal, SignalType, Strategy, StrategyType};
pub use tag::Tag;

/// 有服务端 id 的记录
pub trait Identified {
    fn id(&self) -> i64;
    /// 删除确认框里显示的名字
    fn display_name(&self) -> String;
}

/// 表格列与只读详情
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;

    fn details(&self) -> Vec<(&'static str, String)> {
        Self::headers().iter().copied().zip(self.cells()).collect()
    }
}

/// 枚举取值与中文标签
pub trait Labeled: Sized + Copy + 'static {
    const ALL: &'static [Self];
    fn code(&self) -> &'static str;
    fn label(&self) -> &'static str;

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

/// 代码转中文标签，未知代码原样返回
pub fn label_of<T: Labeled>(code: &str) -> String {
    T::from_code(code)
        .map(|v| v.label().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// 可选值的表格显示
pub fn fmt_opt<T: std::fmt::Display>(v: &Option<T>) -> String {
    v.as_ref()
        .map(|x| x.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn yes_no(v: bool) -> String {
    if v { "是" } else { "否" }.to_string()
}
