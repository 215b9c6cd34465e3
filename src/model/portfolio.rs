use super::{yes_no, Identified, TableRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_risk_level")]
    pub risk_level: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_risk_level() -> i64 {
    3
}

fn default_true() -> bool {
    true
}

impl Identified for Portfolio {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

impl TableRow for Portfolio {
    fn headers() -> &'static [&'static str] {
        &["ID", "名称", "描述", "风险等级", "启用"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            self.risk_level.to_string(),
            yes_no(self.is_active),
        ]
    }
}
