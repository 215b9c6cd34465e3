use super::TableRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub ref_count: i64,
}

impl TableRow for Tag {
    fn headers() -> &'static [&'static str] {
        &["名称", "被引用次数"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.ref_count.to_string()]
    }
}
