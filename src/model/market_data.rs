use super::{fmt_opt, label_of, yes_no, Identified, Labeled, TableRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketAssetType {
    Stock,
    Bond,
    Fund,
    Etf,
    Futures,
    Options,
    Forex,
    Commodity,
}

impl Labeled for MarketAssetType {
    const ALL: &'static [Self] = &[
        MarketAssetType::Stock,
        MarketAssetType::Bond,
        MarketAssetType::Fund,
        MarketAssetType::Etf,
        MarketAssetType::Futures,
        MarketAssetType::Options,
        MarketAssetType::Forex,
        MarketAssetType::Commodity,
    ];

    fn code(&self) -> &'static str {
        match self {
            MarketAssetType::Stock => "STOCK",
            MarketAssetType::Bond => "BOND",
            MarketAssetType::Fund => "FUND",
            MarketAssetType::Etf => "ETF",
            MarketAssetType::Futures => "FUTURES",
            MarketAssetType::Options => "OPTIONS",
            MarketAssetType::Forex => "FOREX",
            MarketAssetType::Commodity => "COMMODITY",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MarketAssetType::Stock => "股票",
            MarketAssetType::Bond => "债券",
            MarketAssetType::Fund => "基金",
            MarketAssetType::Etf => "ETF",
            MarketAssetType::Futures => "期货",
            MarketAssetType::Options => "期权",
            MarketAssetType::Forex => "外汇",
            MarketAssetType::Commodity => "商品",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
    pub exchange: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
}

pub fn default_currency() -> String {
    "CNY".to_string()
}

fn default_true() -> bool {
    true
}

impl Identified for MarketData {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl TableRow for MarketData {
    fn headers() -> &'static [&'static str] {
        &[
            "ID", "证券代码", "证券名称", "资产类型", "交易所", "货币", "活跃", "行业", "板块",
            "市值", "市盈率", "市净率", "股息率",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.symbol.clone(),
            self.name.clone(),
            label_of::<MarketAssetType>(&self.asset_type),
            self.exchange.clone(),
            self.currency.clone(),
            yes_no(self.is_active),
            fmt_opt(&self.industry),
            fmt_opt(&self.sector),
            fmt_opt(&self.market_cap),
            fmt_opt(&self.pe_ratio),
            fmt_opt(&self.pb_ratio),
            fmt_opt(&self.dividend_yield),
        ]
    }
}
