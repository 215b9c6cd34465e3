use sea_orm::DbErr;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("record {0} not found")]
    NotFound(i32),
}
