use crate::crud::draft::{insert_opt, opt_text};
use crate::crud::{CrudPage, Draft, Endpoint, FieldSpec, Messages};
use crate::model::Asset;
use crate::session::PATH_ASSETS;
use serde_json::{Map, Value};

pub type AssetsPage = CrudPage<AssetDraft>;

pub fn assets_page() -> AssetsPage {
    CrudPage::new(
        "资产管理",
        "资产",
        Endpoint::new(PATH_ASSETS),
        Messages {
            load_failed: "获取资产失败",
            ..Messages::default()
        },
    )
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("资产代码", true),
    FieldSpec::text("资产名称", true),
    FieldSpec::text("资产类型", true),
    FieldSpec::text("描述", false),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetDraft {
    pub code: String,
    pub name: String,
    pub asset_type: String,
    pub description: String,
}

impl Draft for AssetDraft {
    type Record = Asset;

    fn from_record(r: &Asset) -> Self {
        Self {
            code: r.code.clone(),
            name: r.name.clone(),
            asset_type: r.asset_type.clone(),
            description: r.description.clone().unwrap_or_default(),
        }
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn value(&self, idx: usize) -> String {
        match idx {
            0 => self.code.clone(),
            1 => self.name.clone(),
            2 => self.asset_type.clone(),
            3 => self.description.clone(),
            _ => String::new(),
        }
    }

    fn set_value(&mut self, idx: usize, value: String) {
        match idx {
            0 => self.code = value,
            1 => self.name = value,
            2 => self.asset_type = value,
            3 => self.description = value,
            _ => {}
        }
    }

    fn to_payload(&self) -> Result<Value, String> {
        let mut obj = Map::new();
        obj.insert("code".into(), Value::String(self.code.trim().to_string()));
        obj.insert("name".into(), Value::String(self.name.trim().to_string()));
        obj.insert(
            "asset_type".into(),
            Value::String(self.asset_type.trim().to_string()),
        );
        insert_opt(&mut obj, "description", opt_text(&self.description));
        Ok(Value::Object(obj))
    }
}
