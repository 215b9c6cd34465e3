use crate::session::{item_path, ApiRequest};
use serde_json::Value;

/// 一类记录的 REST 路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// 集合路径，如 `/assets/`
    pub collection: &'static str,
    /// 列表读取路径（组合是 `/portfolios/me`）
    pub list_path: &'static str,
}

impl Endpoint {
    pub const fn new(collection: &'static str) -> Self {
        Self {
            collection,
            list_path: collection,
        }
    }

    pub const fn with_list_path(mut self, list_path: &'static str) -> Self {
        self.list_path = list_path;
        self
    }

    pub fn list(&self) -> ApiRequest {
        ApiRequest::get(self.list_path)
    }

    pub fn create(&self, body: Value) -> ApiRequest {
        ApiRequest::post_json(self.collection, body)
    }

    pub fn update(&self, id: i64, body: Value) -> ApiRequest {
        ApiRequest::put_json(item_path(self.collection, id), body)
    }

    pub fn delete(&self, id: i64) -> ApiRequest {
        ApiRequest::delete(item_path(self.collection, id))
    }
}

/// 页面兜底文案（响应体没有 `detail` 时显示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub load_failed: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            load_failed: "加载失败",
            create_failed: "添加失败",
            update_failed: "更新失败",
            delete_failed: "删除失败",
        }
    }
}
