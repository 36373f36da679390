use sea_orm::TransactionTrait;
use sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use vulndb_common::db::{Database, DbConn, Txn};

pub mod affected_package;
pub mod blob;
pub mod error;
pub mod operating_system;
pub mod package;
pub mod vulnerability;

pub use affected_package::*;
pub use error::Error;
pub use operating_system::{OperatingSystemInformation, OsCriteria, OsSpecifier};
pub use package::{normalize_ecosystem, PackageInformation};
pub use vulnerability::{ProviderInformation, VulnerabilityInformation, VulnerabilitySpecifier};

/// Case-insensitive column equality that does not lean on the database's
/// collation.
pub(crate) fn lower_eq<C: IntoColumnRef>(col: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).eq(value.to_lowercase())
}

/// Entry point to the affected-package store.
///
/// Every catalog runs against the same database handle, so cloning a `Store`
/// is cheap and all clones see the same data.
#[derive(Debug, Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open a transaction for a multi-step write.
    ///
    /// Nothing persists until [`Txn::commit`]; dropping the value undoes the
    /// work so far, which is what batch ingest relies on for rollback.
    pub async fn transaction(&self) -> Result<Txn, Error> {
        Ok(Txn::Open(self.db.begin().await?))
    }

    /// The connection a catalog operation runs its statements on.
    pub fn connection<'db>(&'db self, tx: &'db impl AsRef<Txn>) -> DbConn<'db> {
        self.db.connection(tx)
    }

    /// Consume the store and close the underlying pool.
    pub async fn close(self) -> anyhow::Result<()> {
        self.db.close().await
    }

    /// Reachability check against the underlying database.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db.ping().await
    }
}
