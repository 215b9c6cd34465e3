use crate::storage::entity::kv_entry::{self, ActiveModel as KvActiveModel, Entity as KvEntry};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

const TOKEN_KEY: &str = "token";

/// 登录 token 的本地持久化
pub struct TokenRepository;

impl TokenRepository {
    pub async fn load(db: &DatabaseConnection) -> Result<Option<String>, sea_orm::DbErr> {
        let row = KvEntry::find_by_id(TOKEN_KEY.to_string()).one(db).await?;
        Ok(row.map(|r| r.value).filter(|v| !v.is_empty()))
    }

    pub async fn save(db: &DatabaseConnection, token: &str) -> Result<(), sea_orm::DbErr> {
        let model = KvActiveModel {
            key: Set(TOKEN_KEY.to_string()),
            value: Set(token.to_string()),
            updated_at: Set(Utc::now().timestamp()),
        };
        KvEntry::insert(model)
            .on_conflict(
                OnConflict::column(kv_entry::Column::Key)
                    .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn clear(db: &DatabaseConnection) -> Result<(), sea_orm::DbErr> {
        KvEntry::delete_by_id(TOKEN_KEY.to_string())
            .exec(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::establish_connection;

    #[tokio::test]
    async fn save_overwrites_and_clear_removes() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        assert_eq!(TokenRepository::load(&db).await.unwrap(), None);

        TokenRepository::save(&db, "first").await.unwrap();
        TokenRepository::save(&db, "second").await.unwrap();
        assert_eq!(
            TokenRepository::load(&db).await.unwrap().as_deref(),
            Some("second")
        );

        TokenRepository::clear(&db).await.unwrap();
        assert_eq!(TokenRepository::load(&db).await.unwrap(), None);
    }
}
