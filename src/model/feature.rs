use super::{fmt_opt, Identified, TableRow};
use crate::storage::entity::feature;
use serde::{Deserialize, Serialize};

pub const FEATURE_TYPES: &[&str] = &["数值", "分类"];
pub const FEATURE_STATUSES: &[&str] = &["active", "inactive"];

/// 特征库条目（线上格式，`type` 字段与本地表的 `feature_type` 对应）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: String,
    pub version: String,
    pub created_by: String,
    pub created_at: String,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lineage: Option<String>,
}

impl From<feature::Model> for FeatureRecord {
    fn from(m: feature::Model) -> Self {
        Self {
            id: m.id as i64,
            name: m.name,
            feature_type: m.feature_type,
            version: m.version,
            created_by: m.created_by,
            created_at: m.created_at,
            status: m.status,
            description: m.description,
            lineage: m.lineage,
        }
    }
}

impl FeatureRecord {
    pub fn status_label(&self) -> &'static str {
        if self.status == "active" {
            "启用"
        } else {
            "停用"
        }
    }
}

impl Identified for FeatureRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl TableRow for FeatureRecord {
    fn headers() -> &'static [&'static str] {
        &["ID", "名称", "类型", "版本", "创建人", "创建时间", "状态"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.feature_type.clone(),
            self.version.clone(),
            self.created_by.clone(),
            self.created_at.clone(),
            self.status_label().to_string(),
        ]
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut rows: Vec<(&'static str, String)> =
            Self::headers().iter().copied().zip(self.cells()).collect();
        rows.push(("描述", fmt_opt(&self.description)));
        rows.push(("血缘", fmt_opt(&self.lineage)));
        rows
    }
}
