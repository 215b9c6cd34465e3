use crate::model::Labeled;
use serde_json::{Map, Value};

/// 选项列表：`(取值, 显示标签)`
pub type Choices = fn() -> Vec<(&'static str, &'static str)>;

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Number,
    Choice(Choices),
    Toggle,
    /// 多行 JSON 文本
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(label: &'static str, required: bool) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            required,
        }
    }

    pub const fn number(label: &'static str, required: bool) -> Self {
        Self {
            label,
            kind: FieldKind::Number,
            required,
        }
    }

    pub const fn choice(label: &'static str, choices: Choices) -> Self {
        Self {
            label,
            kind: FieldKind::Choice(choices),
            required: true,
        }
    }

    pub const fn toggle(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Toggle,
            required: false,
        }
    }

    pub const fn json(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Json,
            required: false,
        }
    }

    /// 界面显示值：选项显示标签，开关显示 是/否
    pub fn display(&self, raw: &str) -> String {
        match self.kind {
            FieldKind::Choice(choices) => choices()
                .into_iter()
                .find(|(code, _)| *code == raw)
                .map(|(_, label)| label.to_string())
                .unwrap_or_else(|| raw.to_string()),
            FieldKind::Toggle => {
                if raw == "true" {
                    "是".to_string()
                } else {
                    "否".to_string()
                }
            }
            _ => raw.to_string(),
        }
    }
}

pub fn choices_of<T: Labeled>() -> Vec<(&'static str, &'static str)> {
    T::ALL.iter().map(|v| (v.code(), v.label())).collect()
}

/// 表单草稿
///
/// 所有可编辑字段都以文本保存，提交时再做校验和类型转换。
/// 字段按 [`Draft::fields`] 的下标读写。
pub trait Draft: Clone + Default {
    type Record;

    fn from_record(record: &Self::Record) -> Self;
    fn fields() -> &'static [FieldSpec];
    fn value(&self, idx: usize) -> String;
    fn set_value(&mut self, idx: usize, value: String);

    /// 本地校验，失败时返回显示给用户的错误
    fn validate(&self) -> Result<(), String> {
        check_required(self)
    }

    /// 线上格式：数值已转换，空的可选字段已去掉
    fn to_payload(&self) -> Result<Value, String>;
}

/// 按字段顺序检查必填项，返回第一个缺失字段的错误
pub fn check_required<D: Draft>(draft: &D) -> Result<(), String> {
    for (idx, spec) in D::fields().iter().enumerate() {
        if spec.required && draft.value(idx).trim().is_empty() {
            return Err(format!("{}为必填项", spec.label));
        }
    }
    Ok(())
}

/// 按字符数（不是字节数）限制长度
pub fn max_chars(label: &str, value: &str, max: usize) -> Result<(), String> {
    if value.trim().chars().count() > max {
        return Err(format!("{}不能超过{}字", label, max));
    }
    Ok(())
}

pub fn parse_number(label: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{}必须为数字", label))
}

/// 空串视为未填写
pub fn optional_number(label: &str, raw: &str) -> Result<Option<f64>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_number(label, raw).map(Some)
}

pub fn parse_integer(label: &str, raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("{}必须为整数", label))
}

/// 整数且在闭区间内
pub fn ranged_integer(label: &str, raw: &str, min: i64, max: i64) -> Result<i64, String> {
    let v = parse_integer(label, raw)?;
    if v < min || v > max {
        return Err(format!("{}必须在{}到{}之间", label, min, max));
    }
    Ok(v)
}

/// 空文本解析为 `{}`
pub fn parse_json_text(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw).map_err(|_| "参数必须为合法JSON".to_string())
}

/// 值为 `None` 或空串时不写入
pub fn insert_opt(obj: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    match value {
        Some(Value::String(s)) if s.trim().is_empty() => {}
        Some(v) => {
            obj.insert(key.to_string(), v);
        }
        None => {}
    }
}

pub fn opt_text(raw: &str) -> Option<Value> {
    let t = raw.trim();
    if t.is_empty() {
        None
    } else {
        Some(Value::String(t.to_string()))
    }
}

pub fn fmt_number(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_text_rules() {
        assert_eq!(parse_json_text("  ").unwrap(), json!({}));
        assert_eq!(parse_json_text(r#"{"window": 20}"#).unwrap(), json!({"window": 20}));
        assert_eq!(parse_json_text("{bad").unwrap_err(), "参数必须为合法JSON");
    }

    #[test]
    fn length_counts_characters() {
        let fifty: String = "特".repeat(50);
        assert!(max_chars("特征名称", &fifty, 50).is_ok());
        let err = max_chars("特征名称", &format!("{}x", fifty), 50).unwrap_err();
        assert_eq!(err, "特征名称不能超过50字");
    }

    #[test]
    fn numbers() {
        assert_eq!(optional_number("市值", "").unwrap(), None);
        assert_eq!(optional_number("市值", " 12.5 ").unwrap(), Some(12.5));
        assert_eq!(parse_number("强度", "abc").unwrap_err(), "强度必须为数字");
        assert_eq!(
            ranged_integer("风险等级", "6", 1, 5).unwrap_err(),
            "风险等级必须在1到5之间"
        );
        assert!(ranged_integer("风险等级", "2.5", 1, 5).is_err());
    }

    #[test]
    fn insert_opt_drops_empty() {
        let mut obj = Map::new();
        insert_opt(&mut obj, "industry", opt_text("  "));
        insert_opt(&mut obj, "sector", opt_text("科技"));
        insert_opt(&mut obj, "market_cap", None);
        assert_eq!(Value::Object(obj), json!({"sector": "科技"}));
    }
}
