use test_context::AsyncTestContext;
use vulndb_common::{config, db::Database};
use vulndb_module_store::store::Store;

/// A fresh, fully migrated in-memory database plus a store on top of it.
///
/// Every test gets its own database; there is nothing to tear down.
pub struct StoreContext {
    pub db: Database,
    pub store: Store,
}

impl AsyncTestContext for StoreContext {
    #[allow(clippy::expect_used)]
    async fn setup() -> StoreContext {
        let db = Database::new(&config::Database::in_memory())
            .await
            .expect("connecting to the in-memory database");
        db.migrate().await.expect("applying migrations");

        let store = Store::new(db.clone());

        StoreContext { db, store }
    }
}
