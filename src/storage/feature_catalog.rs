use crate::model::FeatureRecord;
use crate::session::{ApiError, ApiRequest, Backend, HttpMethod, PATH_FEATURES};
use crate::storage::error::StorageError;
use crate::storage::repository::{FeatureRepository, NewFeature};
use async_trait::async_trait;
use chrono::Local;
use log::{info, warn};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;

pub const DELETE_RETRY_HINT: &str = "删除失败，请重试";

/// 本地特征目录
///
/// 特征库没有后端接口，这里按 REST 的形状应答 `/features/` 下的请求，
/// 数据落在本地 SQLite。删除按 `failure_rate` 随机失败，用来演示错误提示。
pub struct FeatureCatalog {
    db: Arc<DatabaseConnection>,
    failure_rate: f64,
}

impl FeatureCatalog {
    pub fn new(db: Arc<DatabaseConnection>, failure_rate: f64) -> Self {
        Self {
            db,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    async fn list(&self) -> Result<Value, ApiError> {
        let rows = FeatureRepository::list_all(&self.db).await.map_err(storage_error)?;
        let records: Vec<FeatureRecord> = rows.into_iter().map(FeatureRecord::from).collect();
        to_json(&records)
    }

    async fn create(&self, body: &Value) -> Result<Value, ApiError> {
        let created_at = Local::now().format("%Y-%m-%d").to_string();
        let feature = parse_feature(body, created_at)?;
        let model = FeatureRepository::insert(&self.db, feature)
            .await
            .map_err(storage_error)?;
        to_json(&FeatureRecord::from(model))
    }

    async fn update(&self, id: i32, body: &Value) -> Result<Value, ApiError> {
        // 创建时间不随编辑改变
        let created_at = FeatureRepository::find_by_id(&self.db, id)
            .await
            .map_err(storage_error)?
            .created_at;
        let feature = parse_feature(body, created_at)?;
        let model = FeatureRepository::update(&self.db, id, feature)
            .await
            .map_err(storage_error)?;
        to_json(&FeatureRecord::from(model))
    }

    async fn delete(&self, id: i32) -> Result<Value, ApiError> {
        if self.failure_rate > 0.0 && rand::random::<f64>() < self.failure_rate {
            warn!("{} delete({}) simulated failure", self, id);
            return Err(ApiError::Status {
                status: 500,
                detail: Some(DELETE_RETRY_HINT.to_string()),
            });
        }
        FeatureRepository::delete(&self.db, id)
            .await
            .map_err(storage_error)?;
        Ok(Value::Null)
    }
}

#[async_trait]
impl Backend for FeatureCatalog {
    async fn execute(&self, req: &ApiRequest) -> Result<Value, ApiError> {
        let id = item_id(&req.path);
        let result = match (req.method, id, req.json_body()) {
            (HttpMethod::Get, None, _) => self.list().await,
            (HttpMethod::Post, None, Some(body)) => self.create(body).await,
            (HttpMethod::Put, Some(id), Some(body)) => self.update(id, body).await,
            (HttpMethod::Delete, Some(id), _) => self.delete(id).await,
            _ => Err(ApiError::Status {
                status: 405,
                detail: None,
            }),
        };
        match &result {
            Ok(_) => info!("{} execute(...) [{}] -> ok", self, req),
            Err(e) => warn!("{} execute(...) [{}] -> {}", self, req, e),
        }
        result
    }
}

impl std::fmt::Display for FeatureCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<FeatureCatalog [failure_rate={}]>", self.failure_rate)
    }
}

/// `/features/3` -> 3，集合路径返回 `None`
fn item_id(path: &str) -> Option<i32> {
    path.strip_prefix(PATH_FEATURES)
        .map(|rest| rest.trim_matches('/'))
        .filter(|rest| !rest.is_empty())
        .and_then(|rest| rest.parse().ok())
}

fn storage_error(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(_) => ApiError::Status {
            status: 404,
            detail: Some("特征不存在".to_string()),
        },
        StorageError::Database(db) => ApiError::Status {
            status: 500,
            detail: Some(db.to_string()),
        },
    }
}

fn to_json<T: serde::Serialize>(v: &T) -> Result<Value, ApiError> {
    serde_json::to_value(v).map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_feature(body: &Value, created_at: String) -> Result<NewFeature, ApiError> {
    let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);
    let required = |key: &str| {
        text(key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::Status {
                status: 422,
                detail: Some(format!("缺少字段: {}", key)),
            })
    };
    Ok(NewFeature {
        name: required("name")?,
        feature_type: required("type")?,
        version: required("version")?,
        created_by: required("created_by")?,
        created_at,
        status: text("status").unwrap_or_else(|| "active".to_string()),
        description: text("description"),
        lineage: text("lineage"),
    })
}
