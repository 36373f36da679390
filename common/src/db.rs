use anyhow::Context;
use sea_orm::{
    prelude::async_trait, ConnectOptions, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, ExecResult, QueryResult, RuntimeErr, Statement,
};
use sqlx::error::ErrorKind;
use std::ops::Deref;
use tracing::instrument;
use vulndb_migration::{Migrator, MigratorTrait};

/// A transaction in progress, or nothing at all.
///
/// Catalog operations take `impl AsRef<Txn>`, so a caller without a
/// transaction passes `()` and every statement runs directly on the shared
/// connection.
pub enum Txn {
    None,
    Open(DatabaseTransaction),
}

impl Txn {
    /// Commit, if there is anything to commit.
    ///
    /// An `Open` transaction that is dropped instead of committed rolls its
    /// work back.
    pub async fn commit(self) -> Result<(), DbErr> {
        if let Txn::Open(inner) = self {
            inner.commit().await?;
        }
        Ok(())
    }
}

impl AsRef<Txn> for Txn {
    fn as_ref(&self) -> &Txn {
        self
    }
}

/// The no-transaction case.
impl AsRef<Txn> for () {
    fn as_ref(&self) -> &Txn {
        &Txn::None
    }
}

/// What a statement actually runs on: the pooled connection, or a caller's
/// open transaction.
///
/// sea-orm's query APIs want a concrete `ConnectionTrait` value rather than
/// a trait object, which is why this is an enum with per-method dispatch.
pub enum DbConn<'db> {
    Pool(&'db DatabaseConnection),
    Txn(&'db DatabaseTransaction),
}

#[async_trait::async_trait]
impl ConnectionTrait for DbConn<'_> {
    fn get_database_backend(&self) -> DbBackend {
        // the store only ever sits on SQLite
        DbBackend::Sqlite
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        match self {
            DbConn::Pool(db) => db.execute(stmt).await,
            DbConn::Txn(tx) => tx.execute(stmt).await,
        }
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        match self {
            DbConn::Pool(db) => db.execute_unprepared(sql).await,
            DbConn::Txn(tx) => tx.execute_unprepared(sql).await,
        }
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        match self {
            DbConn::Pool(db) => db.query_one(stmt).await,
            DbConn::Txn(tx) => tx.query_one(stmt).await,
        }
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        match self {
            DbConn::Pool(db) => db.query_all(stmt).await,
            DbConn::Txn(tx) => tx.query_all(stmt).await,
        }
    }
}

/// The scanner's local database: one SQLite file, or an in-memory database
/// for tests, behind a small connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    db: DatabaseConnection,
    path: String,
}

impl Database {
    pub async fn new(database: &crate::config::Database) -> Result<Self, anyhow::Error> {
        let url = if database.path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", database.path)
        };
        log::debug!("connect to {}", url);

        // every pooled connection to an in-memory database is a distinct
        // database, so those must be limited to a single connection
        let max_conn = if database.path == ":memory:" {
            1
        } else {
            database.max_conn
        };

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(max_conn);
        // keep at least one connection alive; an in-memory database dies with
        // its last connection
        opt.min_connections(1);
        opt.sqlx_logging_level(log::LevelFilter::Trace);

        let db = sea_orm::Database::connect(opt).await?;
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Ok(Self {
            db,
            path: database.path.to_string(),
        })
    }

    /// Route to `tx` when it holds an open transaction, and to the shared
    /// connection otherwise.
    pub fn connection<'db>(&'db self, tx: &'db impl AsRef<Txn>) -> DbConn<'db> {
        match tx.as_ref() {
            Txn::Open(tx) => DbConn::Txn(tx),
            Txn::None => DbConn::Pool(&self.db),
        }
    }

    /// Bring the schema up to date.
    #[instrument]
    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        log::debug!("running schema migrations");
        Migrator::up(&self.db, None).await?;

        Ok(())
    }

    /// Drop everything and migrate from scratch.
    #[instrument]
    pub async fn refresh(&self) -> Result<(), anyhow::Error> {
        log::warn!("rebuilding the database schema, all data is discarded");
        Migrator::refresh(&self.db).await?;

        Ok(())
    }

    /// Connect and migrate in one step.
    #[instrument]
    pub async fn bootstrap(database: &crate::config::Database) -> Result<Self, anyhow::Error> {
        let db = Self::new(database).await?;
        db.migrate().await?;

        Ok(db)
    }

    pub async fn close(self) -> anyhow::Result<()> {
        Ok(self.db.close().await?)
    }

    /// Reachability check, for health probes.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db
            .ping()
            .await
            .context("failed to ping the database")?;
        Ok(())
    }

    /// The path of the backing database file.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Deref for Database {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Whether a database error is a unique-constraint violation.
pub fn is_duplicate(err: &DbErr) -> bool {
    matches!(
        err,
        DbErr::Query(RuntimeErr::SqlxError(sqlx::error::Error::Database(inner)))
            if inner.kind() == ErrorKind::UniqueViolation
    )
}
