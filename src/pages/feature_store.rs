use crate::crud::draft::{check_required, insert_opt, max_chars, opt_text};
use crate::crud::{CrudPage, Draft, Endpoint, FieldSpec, Messages};
use crate::model::feature::{FEATURE_STATUSES, FEATURE_TYPES};
use crate::model::FeatureRecord;
use crate::session::PATH_FEATURES;
use serde_json::{Map, Value};

/// 特征库页，请求由本地特征目录应答
pub type FeatureStorePage = CrudPage<FeatureDraft>;

pub fn feature_store_page() -> FeatureStorePage {
    CrudPage::new(
        "特征库",
        "特征",
        Endpoint::new(PATH_FEATURES),
        Messages {
            load_failed: "加载特征失败",
            ..Messages::default()
        },
    )
}

fn type_choices() -> Vec<(&'static str, &'static str)> {
    FEATURE_TYPES.iter().map(|t| (*t, *t)).collect()
}

fn status_choices() -> Vec<(&'static str, &'static str)> {
    FEATURE_STATUSES
        .iter()
        .map(|s| (*s, if *s == "active" { "启用" } else { "停用" }))
        .collect()
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("特征名称", true),
    FieldSpec::choice("类型", type_choices),
    FieldSpec::text("版本", true),
    FieldSpec::text("创建人", true),
    FieldSpec::choice("状态", status_choices),
    FieldSpec::text("描述", false),
    FieldSpec::text("血缘", false),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDraft {
    pub name: String,
    pub feature_type: String,
    pub version: String,
    pub created_by: String,
    pub status: String,
    pub description: String,
    pub lineage: String,
}

impl Default for FeatureDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            feature_type: FEATURE_TYPES[0].to_string(),
            version: String::new(),
            created_by: String::new(),
            status: FEATURE_STATUSES[0].to_string(),
            description: String::new(),
            lineage: String::new(),
        }
    }
}

impl Draft for FeatureDraft {
    type Record = FeatureRecord;

    fn from_record(r: &FeatureRecord) -> Self {
        Self {
            name: r.name.clone(),
            feature_type: r.feature_type.clone(),
            version: r.version.clone(),
            created_by: r.created_by.clone(),
            status: r.status.clone(),
            description: r.description.clone().unwrap_or_default(),
            lineage: r.lineage.clone().unwrap_or_default(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.name.clone(),
            1 => self.feature_type.clone(),
            2 => self.version.clone(),
            3 => self.created_by.clone(),
            4 => self.status.clone(),
            5 => self.description.clone(),
            6 => self.lineage.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.name = value,
            1 => self.feature_type = value,
            2 => self.version = value,
            3 => self.created_by = value,
            4 => self.status = value,
            5 => self.description = value,
            6 => self.lineage = value,
            _ => {}
        }
    }

    /// 先查必填，再查长度
    fn validate(&self) -> Result<(), String> {
        check_required(self)?;
        max_chars("特征名称", &self.name, 50)?;
        max_chars("版本", &self.version, 20)?;
        max_chars("创建人", &self.created_by, 20)?;
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.trim().to_string()));
        obj.insert("type".into(), Value::String(self.feature_type.clone()));
        obj.insert(
            "version".into(),
            Value::String(self.version.trim().to_string()),
        );
        obj.insert(
            "created_by".into(),
            Value::String(self.created_by.trim().to_string()),
        );
        obj.insert("status".into(), Value::String(self.status.clone()));
        insert_opt(&mut obj, "description", opt_text(&self.description));
        insert_opt(&mut obj, "lineage", opt_text(&self.lineage));
        Ok(Value::Object(obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled() -> FeatureDraft {
        FeatureDraft {
            name: "换手率".into(),
            version: "v1".into(),
            created_by: "张三".into(),
            ..FeatureDraft::default()
        }
    }

    #[test]
    fn required_checked_before_length() {
        let draft = FeatureDraft {
            name: "名".repeat(60),
            created_by: String::new(),
            ..filled()
        };
        assert_eq!(draft.validate().unwrap_err(), "创建人为必填项");
    }

    #[test]
    fn name_length_limit() {
        let draft = FeatureDraft {
            name: "名".repeat(51),
            ..filled()
        };
        assert_eq!(draft.validate().unwrap_err(), "特征名称不能超过50字");
        let draft = FeatureDraft {
            version: "v".repeat(21),
            ..filled()
        };
        assert_eq!(draft.validate().unwrap_err(), "版本不能超过20字");
    }

    #[test]
    fn payload_uses_type_key() {
        assert_eq!(
            filled().to_payload().unwrap(),
            json!({"name": "换手率", "type": "数值", "version": "v1",
                   "created_by": "张三", "status": "active"})
        );
    }

    #[test]
    fn status_choice_shows_label() {
        assert_eq!(FIELDS[4].display("inactive"), "停用");
    }
}
