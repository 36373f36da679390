use sea_orm::EntityTrait;
use serde_json::json;
use test_context::test_context;
use test_log::test;
use vulndb_entity::blob;
use vulndb_test_context::StoreContext;

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn writes_are_idempotent(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let payload = json!({"cves": ["CVE-2023-1234"]});

    let id1 = ctx.store.get_or_create_blob(&payload, ()).await?;
    let id2 = ctx.store.get_or_create_blob(&payload, ()).await?;
    assert_eq!(id1, id2);

    let rows = blob::Entity::find().all(&*ctx.db).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, payload);

    let other = ctx
        .store
        .get_or_create_blob(&json!({"cves": ["CVE-2023-5678"]}), ())
        .await?;
    assert_ne!(id1, other);

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn fetch_by_id(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let payload = json!({"description": "stack overflow in the parser"});
    let id = ctx.store.get_or_create_blob(&payload, ()).await?;

    let found = ctx.store.get_blob(id, ()).await?;
    assert_eq!(found.map(|blob| blob.value), Some(payload));
    assert!(ctx.store.get_blob(id.wrapping_add(1), ()).await?.is_none());

    Ok(())
}
