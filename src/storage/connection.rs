use crate::storage::entity::{feature, kv_entry};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    // 内存库每个连接都是独立的数据库，只能保留一个连接
    let in_memory = db_url.contains(":memory:");
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.max_connections(if in_memory { 1 } else { 5 })
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    let db = Database::connect(opt).await?;

    if !in_memory {
        // 启用 WAL 模式
        db.execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            "PRAGMA journal_mode=WAL;".to_string(),
        ))
        .await?;
    }

    // 创建表（如果不存在）
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmt = builder.build(
        schema
            .create_table_from_entity(kv_entry::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(feature::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    info!("Database connection established [{}]", db_url);

    Ok(db)
}
