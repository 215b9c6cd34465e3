pub mod backtest;
pub mod detail;
pub mod signal;

pub use backtest::BacktestDraft;
pub use detail::{ChildList, DetailFocus, DetailModal, StrategyDetail};
pub use signal::SignalDraft;

use crate::crud::draft::{
    check_required, choices_of, fmt_number, insert_opt, opt_text, optional_number,
    parse_json_text, ranged_integer,
};
use crate::crud::{CrudPage, Draft, Endpoint, FieldSpec, Messages};
use crate::model::{AssetClass, Strategy, StrategyType};
use crate::pages::{Op, Outgoing, Page};
use crate::session::{ApiError, PATH_STRATEGY};
use crossterm::event::KeyCode;
use serde_json::{json, Map, Value};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("策略名称", true),
    FieldSpec::text("描述", false),
    FieldSpec::choice("策略类型", choices_of::<StrategyType>),
    FieldSpec::choice("资产类别", choices_of::<AssetClass>),
    FieldSpec::json("参数(JSON)"),
    FieldSpec::number("风险等级", true),
    FieldSpec::number("预期收益", false),
    FieldSpec::number("最大回撤", false),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyDraft {
    pub name: String,
    pub description: String,
    pub strategy_type: String,
    pub asset_class: String,
    pub parameters: String,
    pub risk_level: String,
    pub expected_return: String,
    pub max_drawdown: String,
}

impl Default for StrategyDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            strategy_type: "MULTI_FACTOR".to_string(),
            asset_class: "STOCK".to_string(),
            parameters: "{}".to_string(),
            risk_level: "3".to_string(),
            expected_return: String::new(),
            max_drawdown: String::new(),
        }
    }
}

impl Draft for StrategyDraft {
    type Record = Strategy;

    fn from_record(r: &Strategy) -> Self {
        Self {
            name: r.name.clone(),
            description: r.description.clone().unwrap_or_default(),
            strategy_type: r.strategy_type.clone(),
            asset_class: r.asset_class.clone(),
            parameters: r.pretty_parameters(),
            risk_level: r.risk_level.to_string(),
            expected_return: fmt_number(r.expected_return),
            max_drawdown: fmt_number(r.max_drawdown),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.name.clone(),
            1 => self.description.clone(),
            2 => self.strategy_type.clone(),
            3 => self.asset_class.clone(),
            4 => self.parameters.clone(),
            5 => self.risk_level.clone(),
            6 => self.expected_return.clone(),
            7 => self.max_drawdown.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.name = value,
            1 => self.description = value,
            2 => self.strategy_type = value,
            3 => self.asset_class = value,
            4 => self.parameters = value,
            5 => self.risk_level = value,
            6 => self.expected_return = value,
            7 => self.max_drawdown = value,
            _ => {}
        }
    }

    /// 参数不是合法 JSON 时，不论其它字段如何都报这一条
    fn validate(&self) -> Result<(), String> {
        parse_json_text(&self.parameters)?;
        check_required(self)?;
        ranged_integer("风险等级", &self.risk_level, 1, 5)?;
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.trim().to_string()));
        insert_opt(&mut obj, "description", opt_text(&self.description));
        obj.insert(
            "strategy_type".into(),
            Value::String(self.strategy_type.clone()),
        );
        obj.insert("asset_class".into(), Value::String(self.asset_class.clone()));
        obj.insert("parameters".into(), parse_json_text(&self.parameters)?);
        obj.insert(
            "risk_level".into(),
            json!(ranged_integer("风险等级", &self.risk_level, 1, 5)?),
        );
        insert_opt(
            &mut obj,
            "expected_return",
            optional_number("预期收益", &self.expected_return)?.map(|v| json!(v)),
        );
        insert_opt(
            &mut obj,
            "max_drawdown",
            optional_number("最大回撤", &self.max_drawdown)?.map(|v| json!(v)),
        );
        Ok(Value::Object(obj))
    }
}

/// 策略页：策略列表加上按策略打开的详情
pub struct StrategyPage {
    pub crud: CrudPage<StrategyDraft>,
    pub detail: Option<StrategyDetail>,
}

impl Default for StrategyPage {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyPage {
    pub fn new() -> Self {
        Self {
            crud: CrudPage::new(
                "策略管理",
                "策略",
                Endpoint::new(PATH_STRATEGY),
                Messages {
                    load_failed: "登录状态已失效，请重新登录",
                    create_failed: "创建失败",
                    ..Messages::default()
                },
            ),
            detail: None,
        }
    }

    /// 打开选中策略的详情
    pub fn open_detail(&mut self) -> Outgoing {
        let Some(strategy) = self.crud.list.selected_record().cloned() else {
            return Vec::new();
        };
        let (detail, out) = StrategyDetail::open(strategy);
        self.detail = Some(detail);
        out
    }
}

impl Page for StrategyPage {
    fn activate(&mut self) -> Outgoing {
        self.crud.activate()
    }

    fn handle_key(&mut self, key: KeyCode) -> Outgoing {
        if let Some(detail) = self.detail.as_mut() {
            return match detail.handle_key(key) {
                Some(out) => out,
                None => {
                    self.detail = None;
                    Vec::new()
                }
            };
        }
        if !self.crud.captures_input() && key == KeyCode::Char('v') {
            return self.open_detail();
        }
        self.crud.handle_key(key)
    }

    fn on_response(&mut self, op: Op, result: Result<Value, ApiError>) -> Outgoing {
        match op {
            Op::Signals(_)
            | Op::Backtests(_)
            | Op::SaveSignal(_)
            | Op::SaveBacktest(_)
            | Op::RetryBacktest(_) => match self.detail.as_mut() {
                Some(detail) => detail.on_response(op, result),
                // 详情已关闭
                None => Vec::new(),
            },
            _ => self.crud.on_response(op, result),
        }
    }

    fn captures_input(&self) -> bool {
        self.detail.is_some() || self.crud.captures_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::HttpMethod;

    fn loaded() -> StrategyPage {
        let mut page = StrategyPage::new();
        let out = page.activate();
        assert_eq!(out[0].1.path, "/strategy/");
        page.on_response(
            Op::List,
            Ok(json!([{"id": 7, "name": "多因子A", "strategy_type": "MULTI_FACTOR",
                       "asset_class": "STOCK", "risk_level": 3,
                       "parameters": {"window": 20}}])),
        );
        page
    }

    #[test]
    fn invalid_json_wins_over_other_errors() {
        let draft = StrategyDraft {
            name: String::new(),
            parameters: "{window:".into(),
            risk_level: "9".into(),
            ..StrategyDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), "参数必须为合法JSON");
    }

    #[test]
    fn create_payload() {
        let draft = StrategyDraft {
            name: " 动量一号 ".into(),
            parameters: r#"{"lookback": 60}"#.into(),
            expected_return: "0.12".into(),
            ..StrategyDraft::default()
        };
        draft.validate().unwrap();
        assert_eq!(
            draft.to_payload().unwrap(),
            json!({
                "name": "动量一号", "strategy_type": "MULTI_FACTOR",
                "asset_class": "STOCK", "parameters": {"lookback": 60},
                "risk_level": 3, "expected_return": 0.12
            })
        );
    }

    #[test]
    fn edit_prefills_pretty_parameters() {
        let mut page = loaded();
        page.handle_key(KeyCode::Char('e'));
        let form = page.crud.form.as_ref().unwrap();
        assert_eq!(form.draft.parameters, "{\n  \"window\": 20\n}");
        let out = page.handle_key(KeyCode::Enter);
        assert_eq!(out[0].1.method, HttpMethod::Put);
        assert_eq!(out[0].1.path, "/strategy/7");
    }

    #[test]
    fn detail_with_empty_signals_and_failed_backtest() {
        let mut page = loaded();
        let out = page.handle_key(KeyCode::Char('v'));
        assert_eq!(out.len(), 2);
        assert!(page.captures_input());

        page.on_response(Op::Signals(7), Ok(json!([])));
        page.on_response(
            Op::Backtests(7),
            Ok(json!([{"id": 1, "strategy_id": 7, "start_date": "2023-01-01",
                       "end_date": "2023-12-31", "initial_capital": 1000000.0,
                       "status": "failed"}])),
        );
        let detail = page.detail.as_ref().unwrap();
        assert!(detail.error().is_none());
        assert!(detail.signals.records.is_empty());
        assert_eq!(detail.backtests.records.len(), 1);
        assert!(detail.backtests.records[0].is_failed());

        page.handle_key(KeyCode::Esc);
        assert!(page.detail.is_none());
        // 关闭后迟到的响应被丢弃
        assert!(page
            .on_response(Op::Backtests(7), Ok(json!([])))
            .is_empty());
    }

    #[test]
    fn list_failure_uses_login_hint() {
        let mut page = StrategyPage::new();
        page.activate();
        page.on_response(Op::List, Err(ApiError::status(401, "")));
        assert_eq!(
            page.crud.list.error.as_deref(),
            Some("登录状态已失效，请重新登录")
        );
    }
}
