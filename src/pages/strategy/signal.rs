use crate::crud::draft::{
    choices_of, fmt_number, insert_opt, opt_text, optional_number, parse_integer,
};
use crate::crud::{Draft, FieldSpec};
use crate::model::{Labeled, Signal, SignalType};
use crate::session::{item_path, ApiRequest, PATH_STRATEGY_SIGNALS};
use chrono::{Local, NaiveDate};
use serde_json::{json, Map, Value};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::choice("信号类型", choices_of::<SignalType>),
    FieldSpec::number("信号强度", false),
    FieldSpec::number("目标权重", false),
    FieldSpec::number("置信度", false),
    FieldSpec::text("推理", false),
    FieldSpec::text("信号日期", true),
    FieldSpec::number("市场数据ID", false),
];

/// 信号草稿，新增时挂在某个策略下
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDraft {
    pub strategy_id: i64,
    pub signal_type: String,
    pub signal_strength: String,
    pub target_weight: String,
    pub confidence_score: String,
    pub reasoning: String,
    pub signal_date: String,
    pub market_data_id: String,
    existing: bool,
}

impl Default for SignalDraft {
    fn default() -> Self {
        Self {
            strategy_id: 0,
            signal_type: SignalType::Buy.code().to_string(),
            signal_strength: String::new(),
            target_weight: String::new(),
            confidence_score: String::new(),
            reasoning: String::new(),
            signal_date: Local::now().format("%Y-%m-%d").to_string(),
            market_data_id: String::new(),
            existing: false,
        }
    }
}

impl SignalDraft {
    pub fn for_strategy(strategy_id: i64) -> Self {
        Self {
            strategy_id,
            ..Self::default()
        }
    }

    /// 新增走集合路径，编辑走单条路径
    pub fn request(&self, signal_id: Option<i64>, body: Value) -> ApiRequest {
        match signal_id {
            Some(id) => ApiRequest::put_json(item_path(PATH_STRATEGY_SIGNALS, id), body),
            None => ApiRequest::post_json(PATH_STRATEGY_SIGNALS, body),
        }
    }
}

/// 0 到 1 之间的可选小数
fn unit_interval(label: &str, raw: &str) -> Result<Option<f64>, String> {
    let v = optional_number(label, raw)?;
    if let Some(x) = v {
        if !(0.0..=1.0).contains(&x) {
            return Err(format!("{}必须在0到1之间", label));
        }
    }
    Ok(v)
}

impl Draft for SignalDraft {
    type Record = Signal;

    fn from_record(r: &Signal) -> Self {
        Self {
            strategy_id: r.strategy_id,
            signal_type: r.signal_type.clone(),
            signal_strength: fmt_number(r.signal_strength),
            target_weight: fmt_number(r.target_weight),
            confidence_score: fmt_number(r.confidence_score),
            reasoning: r.reasoning.clone().unwrap_or_default(),
            signal_date: r
                .signal_date
                .as_deref()
                .map(|d| d.get(..10).unwrap_or(d).to_string())
                .unwrap_or_default(),
            market_data_id: r.market_data_id.map(|v| v.to_string()).unwrap_or_default(),
            existing: true,
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.signal_type.clone(),
            1 => self.signal_strength.clone(),
            2 => self.target_weight.clone(),
            3 => self.confidence_score.clone(),
            4 => self.reasoning.clone(),
            5 => self.signal_date.clone(),
            6 => self.market_data_id.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.signal_type = value,
            1 => self.signal_strength = value,
            2 => self.target_weight = value,
            3 => self.confidence_score = value,
            4 => self.reasoning = value,
            5 => self.signal_date = value,
            6 => self.market_data_id = value,
            _ => {}
        }
    }

    fn validate(&self) -> Result<(), String> {
        crate::crud::draft::check_required(self)?;
        if !self.existing && self.market_data_id.trim().is_empty() {
            return Err("市场数据ID为必填项".to_string());
        }
        NaiveDate::parse_from_str(self.signal_date.trim(), "%Y-%m-%d")
            .map_err(|_| "信号日期格式应为YYYY-MM-DD".to_string())?;
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        obj.insert("signal_type".into(), Value::String(self.signal_type.clone()));
        insert_opt(
            &mut obj,
            "signal_strength",
            unit_interval("信号强度", &self.signal_strength)?.map(|v| json!(v)),
        );
        insert_opt(
            &mut obj,
            "target_weight",
            optional_number("目标权重", &self.target_weight)?.map(|v| json!(v)),
        );
        insert_opt(
            &mut obj,
            "confidence_score",
            unit_interval("置信度", &self.confidence_score)?.map(|v| json!(v)),
        );
        insert_opt(&mut obj, "reasoning", opt_text(&self.reasoning));
        obj.insert(
            "signal_date".into(),
            Value::String(format!("{}T00:00:00", self.signal_date.trim())),
        );
        if !self.existing {
            obj.insert("strategy_id".into(), json!(self.strategy_id));
            obj.insert(
                "market_data_id".into(),
                json!(parse_integer("市场数据ID", &self.market_data_id)?),
            );
        }
        Ok(Value::Object(obj))
    }
}
