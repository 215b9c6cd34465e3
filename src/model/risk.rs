use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 最近一次风险测评：提交的答案与时间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
