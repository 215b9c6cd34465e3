use super::{Identified, TableRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub asset_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Identified for Asset {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} {}", self.code, self.name)
    }
}

impl TableRow for Asset {
    fn headers() -> &'static [&'static str] {
        &["代码", "名称", "类型", "描述"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.asset_type.clone(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}
