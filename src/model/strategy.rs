use super::{fmt_opt, label_of, Identified, Labeled, TableRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    MacroTiming,
    SectorRotation,
    MultiFactor,
    Momentum,
    MeanReversion,
    Arbitrage,
    Custom,
}

impl Labeled for StrategyType {
    const ALL: &'static [Self] = &[
        StrategyType::MacroTiming,
        StrategyType::SectorRotation,
        StrategyType::MultiFactor,
        StrategyType::Momentum,
        StrategyType::MeanReversion,
        StrategyType::Arbitrage,
        StrategyType::Custom,
    ];

    fn code(&self) -> &'static str {
        match self {
            StrategyType::MacroTiming => "MACRO_TIMING",
            StrategyType::SectorRotation => "SECTOR_ROTATION",
            StrategyType::MultiFactor => "MULTI_FACTOR",
            StrategyType::Momentum => "MOMENTUM",
            StrategyType::MeanReversion => "MEAN_REVERSION",
            StrategyType::Arbitrage => "ARBITRAGE",
            StrategyType::Custom => "CUSTOM",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StrategyType::MacroTiming => "宏观择时",
            StrategyType::SectorRotation => "行业轮动",
            StrategyType::MultiFactor => "多因子",
            StrategyType::Momentum => "动量",
            StrategyType::MeanReversion => "均值回归",
            StrategyType::Arbitrage => "套利",
            StrategyType::Custom => "自定义",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Stock,
    Bond,
    Commodity,
    Cash,
    RealEstate,
    Alternative,
}

impl Labeled for AssetClass {
    const ALL: &'static [Self] = &[
        AssetClass::Stock,
        AssetClass::Bond,
        AssetClass::Commodity,
        AssetClass::Cash,
        AssetClass::RealEstate,
        AssetClass::Alternative,
    ];

    fn code(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Bond => "BOND",
            AssetClass::Commodity => "COMMODITY",
            AssetClass::Cash => "CASH",
            AssetClass::RealEstate => "REAL_ESTATE",
            AssetClass::Alternative => "ALTERNATIVE",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AssetClass::Stock => "股票",
            AssetClass::Bond => "债券",
            AssetClass::Commodity => "商品",
            AssetClass::Cash => "现金",
            AssetClass::RealEstate => "房地产",
            AssetClass::Alternative => "另类投资",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
    Overweight,
    Underweight,
}

impl Labeled for SignalType {
    const ALL: &'static [Self] = &[
        SignalType::Buy,
        SignalType::Sell,
        SignalType::Hold,
        SignalType::Overweight,
        SignalType::Underweight,
    ];

    fn code(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
            SignalType::Overweight => "OVERWEIGHT",
            SignalType::Underweight => "UNDERWEIGHT",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SignalType::Buy => "买入",
            SignalType::Sell => "卖出",
            SignalType::Hold => "持有",
            SignalType::Overweight => "超配",
            SignalType::Underweight => "低配",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub strategy_type: String,
    pub asset_class: String,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default = "default_risk_level")]
    pub risk_level: i64,
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn default_risk_level() -> i64 {
    3
}

impl Strategy {
    /// 参数的多行展示
    pub fn pretty_parameters(&self) -> String {
        match &self.parameters {
            None | Some(Value::Null) => "{}".to_string(),
            Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        }
    }
}

impl Identified for Strategy {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub strategy_id: i64,
    pub signal_type: String,
    #[serde(default)]
    pub signal_strength: Option<f64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub factors: Option<Value>,
    #[serde(default)]
    pub signal_date: Option<String>,
    #[serde(default)]
    pub market_data_id: Option<i64>,
}

impl Identified for Signal {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} #{}", self.signal_type, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backtest {
    pub id: i64,
    pub strategy_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    #[serde(default)]
    pub total_return: Option<f64>,
    #[serde(default)]
    pub annualized_return: Option<f64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub sharpe_ratio: Option<f64>,
    #[serde(default)]
    pub sortino_ratio: Option<f64>,
    #[serde(default)]
    pub max_drawdown: Option<f64>,
    #[serde(default)]
    pub calmar_ratio: Option<f64>,
    #[serde(default)]
    pub win_rate: Option<f64>,
    #[serde(default)]
    pub total_trades: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Backtest {
    pub fn is_failed(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("failed"))
            .unwrap_or(false)
    }

    /// 日期只取前 10 位，后端可能返回完整时间戳
    pub fn start_day(&self) -> &str {
        day_part(&self.start_date)
    }

    pub fn end_day(&self) -> &str {
        day_part(&self.end_date)
    }

    /// 失败的回测在行内直接给出重试按键
    fn status_cell(&self) -> String {
        if self.is_failed() {
            format!("{} [t 重试]", fmt_opt(&self.status))
        } else {
            fmt_opt(&self.status)
        }
    }
}

fn day_part(s: &str) -> &str {
    s.get(..10).unwrap_or(s)
}

impl Identified for Backtest {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} ~ {}", self.start_day(), self.end_day())
    }
}

impl TableRow for Strategy {
    fn headers() -> &'static [&'static str] {
        &["ID", "名称", "类型", "资产类别", "风险等级", "预期收益", "最大回撤"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            label_of::<StrategyType>(&self.strategy_type),
            label_of::<AssetClass>(&self.asset_class),
            self.risk_level.to_string(),
            fmt_opt(&self.expected_return),
            fmt_opt(&self.max_drawdown),
        ]
    }
}

impl TableRow for Signal {
    fn headers() -> &'static [&'static str] {
        &["日期", "类型", "强度", "目标权重", "置信度"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.signal_date
                .as_deref()
                .map(day_part)
                .unwrap_or("-")
                .to_string(),
            label_of::<SignalType>(&self.signal_type),
            fmt_opt(&self.signal_strength),
            fmt_opt(&self.target_weight),
            fmt_opt(&self.confidence_score),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut rows: Vec<(&'static str, String)> = vec![("ID", self.id.to_string())];
        rows.extend(Self::headers().iter().copied().zip(self.cells()));
        rows.push(("市场数据ID", fmt_opt(&self.market_data_id)));
        rows.push(("推理", fmt_opt(&self.reasoning)));
        rows.push((
            "影响因子",
            self.factors
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
        rows
    }
}

impl TableRow for Backtest {
    fn headers() -> &'static [&'static str] {
        &["区间", "总收益", "夏普", "状态"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            format!("{} ~ {}", self.start_day(), self.end_day()),
            fmt_opt(&self.total_return),
            fmt_opt(&self.sharpe_ratio),
            self.status_cell(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("起始日期", self.start_day().to_string()),
            ("结束日期", self.end_day().to_string()),
            ("初始资金", self.initial_capital.to_string()),
            ("总收益率", fmt_opt(&self.total_return)),
            ("年化收益率", fmt_opt(&self.annualized_return)),
            ("波动率", fmt_opt(&self.volatility)),
            ("夏普比率", fmt_opt(&self.sharpe_ratio)),
            ("索提诺比率", fmt_opt(&self.sortino_ratio)),
            ("最大回撤", fmt_opt(&self.max_drawdown)),
            ("卡玛比率", fmt_opt(&self.calmar_ratio)),
            ("胜率", fmt_opt(&self.win_rate)),
            ("总交易次数", fmt_opt(&self.total_trades)),
            ("状态", fmt_opt(&self.status)),
        ]
    }
}
