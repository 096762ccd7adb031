use sea_orm::DbErr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Cannot attach {id} under {parent_id}: {reason}")]
    InvalidParent {
        id: Uuid,
        parent_id: Uuid,
        reason: &'static str,
    },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;
