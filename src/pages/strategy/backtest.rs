use crate::crud::draft::{check_required, parse_number};
use crate::crud::{Draft, FieldSpec};
use crate::model::Backtest;
use crate::session::{ApiRequest, PATH_STRATEGY_BACKTEST};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("开始日期", true),
    FieldSpec::text("结束日期", true),
    FieldSpec::number("初始资金", true),
];

fn date_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
}

fn parse_day(label: &str, raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let err = || format!("{}格式应为YYYY-MM-DD", label);
    if !date_pattern().map_or(true, |re| re.is_match(raw)) {
        return Err(err());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| err())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestDraft {
    pub strategy_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: String,
}

impl BacktestDraft {
    pub fn for_strategy(strategy_id: i64) -> Self {
        Self {
            strategy_id,
            ..Self::default()
        }
    }
}

/// 按失败回测的原参数重新提交
pub fn retry_request(bt: &Backtest) -> ApiRequest {
    ApiRequest::post_json(
        PATH_STRATEGY_BACKTEST,
        json!({
            "strategy_id": bt.strategy_id,
            "start_date": bt.start_day(),
            "end_date": bt.end_day(),
            "initial_capital": bt.initial_capital,
        }),
    )
}

impl Draft for BacktestDraft {
    type Record = Backtest;

    fn from_record(r: &Backtest) -> Self {
        Self {
            strategy_id: r.strategy_id,
            start_date: r.start_day().to_string(),
            end_date: r.end_day().to_string(),
            initial_capital: r.initial_capital.to_string(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.start_date.clone(),
            1 => self.end_date.clone(),
            2 => self.initial_capital.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.start_date = value,
            1 => self.end_date = value,
            2 => self.initial_capital = value,
            _ => {}
        }
    }

    fn validate(&self) -> Result<(), String> {
        check_required(self)?;
        let start = parse_day("开始日期", &self.start_date)?;
        let end = parse_day("结束日期", &self.end_date)?;
        if end < start {
            return Err("结束日期不能早于开始日期".to_string());
        }
        if parse_number("初始资金", &self.initial_capital)? <= 0.0 {
            return Err("初始资金必须大于0".to_string());
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, String> {
        Ok(json!({
            "strategy_id": self.strategy_id,
            "start_date": self.start_date.trim(),
            "end_date": self.end_date.trim(),
            "initial_capital": parse_number("初始资金", &self.initial_capital)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(start: &str, end: &str, capital: &str) -> BacktestDraft {
        BacktestDraft {
            strategy_id: 7,
            start_date: start.into(),
            end_date: end.into(),
            initial_capital: capital.into(),
        }
    }

    #[test]
    fn date_rules() {
        assert_eq!(
            draft("2023/01/01", "2023-12-31", "1000").validate().unwrap_err(),
            "开始日期格式应为YYYY-MM-DD"
        );
        assert_eq!(
            draft("2023-02-30", "2023-12-31", "1000").validate().unwrap_err(),
            "开始日期格式应为YYYY-MM-DD"
        );
        assert_eq!(
            draft("2023-12-31", "2023-01-01", "1000").validate().unwrap_err(),
            "结束日期不能早于开始日期"
        );
    }

    #[test]
    fn capital_must_be_positive() {
        assert_eq!(
            draft("2023-01-01", "2023-12-31", "0").validate().unwrap_err(),
            "初始资金必须大于0"
        );
        assert_eq!(
            draft("2023-01-01", "2023-12-31", "").validate().unwrap_err(),
            "初始资金为必填项"
        );
    }

    #[test]
    fn payload_shape() {
        let d = draft("2023-01-01", "2023-12-31", "100000");
        d.validate().unwrap();
        assert_eq!(
            d.to_payload().unwrap(),
            json!({"strategy_id": 7, "start_date": "2023-01-01",
                   "end_date": "2023-12-31", "initial_capital": 100000.0})
        );
    }
}
