use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid specifier: {0}")]
    InvalidSpecifier(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to add affected package {package}/{vulnerability}")]
    AffectedPackage {
        package: String,
        vulnerability: String,
        #[source]
        source: Box<Error>,
    },
}
