use super::endpoint::Endpoint;
use crate::model::Identified;
use crate::session::{ApiError, ApiRequest};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 待确认的删除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: i64,
    pub name: String,
}

/// 列表页状态：记录按响应顺序保存，不分页、不排序
#[derive(Debug, Clone)]
pub struct ListState<R> {
    pub records: Vec<R>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: usize,
    pub pending_delete: Option<PendingDelete>,
    pub deleting: bool,
    /// 行操作失败时的提示（列表本身仍然显示）
    pub notice: Option<String>,
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            selected: 0,
            pending_delete: None,
            deleting: false,
            notice: None,
        }
    }
}

impl<R: DeserializeOwned> ListState<R> {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// 失败时清空表格，只显示错误
    pub fn apply_load(&mut self, result: Result<Value, ApiError>, fallback: &str) {
        self.loading = false;
        let decoded = result.and_then(|v| {
            serde_json::from_value::<Vec<R>>(v).map_err(|e| ApiError::Decode(e.to_string()))
        });
        match decoded {
            Ok(records) => {
                self.records = records;
                self.error = None;
                self.clamp();
            }
            Err(e) => {
                self.records.clear();
                self.selected = 0;
                self.error = Some(e.user_message(fallback));
            }
        }
    }
}

impl<R> ListState<R> {
    pub fn clamp(&mut self) {
        if self.selected >= self.records.len() {
            self.selected = self.records.len().saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.records.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_record(&self) -> Option<&R> {
        self.records.get(self.selected)
    }
}

impl<R: Identified> ListState<R> {
    /// 对选中行弹出删除确认，不发请求
    pub fn request_delete(&mut self) -> bool {
        if self.deleting {
            return false;
        }
        match self.records.get(self.selected) {
            Some(r) => {
                self.pending_delete = Some(PendingDelete {
                    id: r.id(),
                    name: r.display_name(),
                });
                true
            }
            None => false,
        }
    }

    pub fn confirm_delete(&mut self, endpoint: &Endpoint) -> Option<ApiRequest> {
        let pending = self.pending_delete.take()?;
        self.deleting = true;
        self.notice = None;
        Some(endpoint.delete(pending.id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// 删除结果，成功返回 true（调用方负责重新加载）
    pub fn apply_delete(&mut self, result: &Result<Value, ApiError>, fallback: &str) -> bool {
        self.deleting = false;
        match result {
            Ok(_) => true,
            Err(e) => {
                self.notice = Some(e.user_message(fallback));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Asset;
    use serde_json::json;

    #[test]
    fn failed_load_clears_rows() {
        let mut list: ListState<Asset> = ListState::default();
        list.begin_load();
        list.apply_load(
            Ok(json!([{"id": 1, "code": "AAPL", "name": "Apple", "asset_type": "股票"}])),
            "获取资产失败",
        );
        assert_eq!(list.records.len(), 1);

        list.begin_load();
        list.apply_load(Err(ApiError::status(500, "")), "获取资产失败");
        assert!(list.records.is_empty());
        assert_eq!(list.error.as_deref(), Some("获取资产失败"));
        assert!(!list.loading);
    }

    #[test]
    fn cancel_issues_nothing() {
        let ep = Endpoint::new("/assets/");
        let mut list: ListState<Asset> = ListState::default();
        list.apply_load(
            Ok(json!([{"id": 3, "code": "X", "name": "X", "asset_type": "债券"}])),
            "",
        );
        assert!(list.request_delete());
        list.cancel_delete();
        assert_eq!(list.confirm_delete(&ep), None);

        assert!(list.request_delete());
        let req = list.confirm_delete(&ep).unwrap();
        assert_eq!(req.path, "/assets/3");
    }
}
