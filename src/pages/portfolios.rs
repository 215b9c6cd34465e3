use crate::crud::draft::{insert_opt, opt_text, ranged_integer};
use crate::crud::{CrudPage, Draft, Endpoint, FieldSpec, Messages};
use crate::model::Portfolio;
use crate::session::{PATH_PORTFOLIOS, PATH_PORTFOLIOS_ME};
use serde_json::{json, Map, Value};

pub type PortfoliosPage = CrudPage<PortfolioDraft>;

/// 列表只读当前用户的组合，增删改走集合路径
pub fn portfolios_page() -> PortfoliosPage {
    CrudPage::new(
        "投资组合管理",
        "投资组合",
        Endpoint::new(PATH_PORTFOLIOS).with_list_path(PATH_PORTFOLIOS_ME),
        Messages {
            load_failed: "获取投资组合失败",
            ..Messages::default()
        },
    )
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("组合名称", true),
    FieldSpec::text("描述", false),
    FieldSpec::number("风险等级", true),
    FieldSpec::toggle("是否启用"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDraft {
    pub name: String,
    pub description: String,
    pub risk_level: String,
    pub is_active: bool,
    /// 编辑已有组合时为 true
    existing: bool,
}

impl Default for PortfolioDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            risk_level: "3".to_string(),
            is_active: true,
            existing: false,
        }
    }
}

impl Draft for PortfolioDraft {
    type Record = Portfolio;

    fn from_record(r: &Portfolio) -> Self {
        Self {
            name: r.name.clone(),
            description: r.description.clone().unwrap_or_default(),
            risk_level: r.risk_level.to_string(),
            is_active: r.is_active,
            existing: true,
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.name.clone(),
            1 => self.description.clone(),
            2 => self.risk_level.clone(),
            3 => self.is_active.to_string(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.name = value,
            1 => self.description = value,
            2 => self.risk_level = value,
            3 => self.is_active = value == "true",
            _ => {}
        }
    }

    fn validate(&self) -> Result<(), String> {
        crate::crud::draft::check_required(self)?;
        ranged_integer("风险等级", &self.risk_level, 1, 5)?;
        Ok(())
    }

    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::String(self.name.trim().to_string()));
        insert_opt(&mut obj, "description", opt_text(&self.description));
        obj.insert(
            "risk_level".into(),
            json!(ranged_integer("风险等级", &self.risk_level, 1, 5)?),
        );
        if self.existing {
            obj.insert("is_active".into(), Value::Bool(self.is_active));
        } else {
            obj.insert("assets".into(), json!([]));
        }
        Ok(Value::Object(obj))
    }
}
