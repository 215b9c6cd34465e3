use crate::storage::entity::feature::{
    ActiveModel as FeatureActiveModel, Column as FeatureColumn, Entity as Feature,
    Model as FeatureModel,
};
use crate::storage::error::StorageError;
use log::info;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};

/// 新建或更新特征时的字段
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeature {
    pub name: String,
    pub feature_type: String,
    pub version: String,
    pub created_by: String,
    pub created_at: String,
    pub status: String,
    pub description: Option<String>,
    pub lineage: Option<String>,
}

impl NewFeature {
    fn into_active_model(self) -> FeatureActiveModel {
        FeatureActiveModel {
            name: Set(self.name),
            feature_type: Set(self.feature_type),
            version: Set(self.version),
            created_by: Set(self.created_by),
            created_at: Set(self.created_at),
            status: Set(self.status),
            description: Set(self.description),
            lineage: Set(self.lineage),
            ..Default::default()
        }
    }
}

pub struct FeatureRepository;

impl FeatureRepository {
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<FeatureModel>, StorageError> {
        Ok(Feature::find()
            .order_by_asc(FeatureColumn::Id)
            .all(db)
            .await?)
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<FeatureModel, StorageError> {
        Feature::find_by_id(id)
            .one(db)
            .await?
            .ok_or(StorageError::NotFound(id))
    }

    pub async fn insert(
        db: &DatabaseConnection,
        feature: NewFeature,
    ) -> Result<FeatureModel, StorageError> {
        Ok(feature.into_active_model().insert(db).await?)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        feature: NewFeature,
    ) -> Result<FeatureModel, StorageError> {
        Self::find_by_id(db, id).await?;
        let mut am = feature.into_active_model();
        am.id = Set(id);
        Ok(am.update(db).await?)
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), StorageError> {
        let res = Feature::delete_by_id(id).exec(db).await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    /// 目录为空时写入示例特征，返回写入条数
    pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<usize, StorageError> {
        if Feature::find().count(db).await? > 0 {
            return Ok(0);
        }
        let samples = sample_features();
        let n = samples.len();
        Feature::insert_many(samples.into_iter().map(NewFeature::into_active_model))
            .exec(db)
            .await?;
        info!("Seeded {} sample features", n);
        Ok(n)
    }
}

fn sample_features() -> Vec<NewFeature> {
    let sample = |name: &str,
                  feature_type: &str,
                  version: &str,
                  created_by: &str,
                  created_at: &str,
                  status: &str,
                  description: &str,
                  lineage: &str| NewFeature {
        name: name.to_string(),
        feature_type: feature_type.to_string(),
        version: version.to_string(),
        created_by: created_by.to_string(),
        created_at: created_at.to_string(),
        status: status.to_string(),
        description: Some(description.to_string()),
        lineage: Some(lineage.to_string()),
    };
    vec![
        sample(
            "动量因子", "数值", "v1.0", "Alice", "2024-01-01", "active",
            "近20日收益率", "price->return->momentum",
        ),
        sample(
            "市盈率", "数值", "v1.1", "Bob", "2024-01-10", "active",
            "市值/净利润", "market_cap->net_income->pe",
        ),
        sample(
            "行业哑变量", "分类", "v1.0", "Carol", "2024-01-15", "inactive",
            "行业one-hot", "industry->onehot",
        ),
    ]
}
