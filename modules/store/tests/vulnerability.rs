use sea_orm::EntityTrait;
use test_context::test_context;
use test_log::test;
use time::macros::datetime;
use vulndb_entity::{
    provider,
    vulnerability_handle::{self, VulnerabilityStatus},
};
use vulndb_module_store::store::{Error, ProviderInformation, VulnerabilityInformation};
use vulndb_test_context::StoreContext;

fn cve(name: &str, provider: &str) -> VulnerabilityInformation {
    VulnerabilityInformation {
        name: name.into(),
        provider: ProviderInformation {
            id: provider.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn identity_is_name_and_provider(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let id1 = ctx
        .store
        .resolve_vulnerability(&cve("CVE-2023-1234", "ubuntu"), ())
        .await?;
    let id2 = ctx
        .store
        .resolve_vulnerability(&cve("cve-2023-1234", "ubuntu"), ())
        .await?;
    let id3 = ctx
        .store
        .resolve_vulnerability(&cve("CVE-2023-1234", "wolfi"), ())
        .await?;

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);

    assert_eq!(
        vulnerability_handle::Entity::find().all(&*ctx.db).await?.len(),
        2
    );
    assert_eq!(provider::Entity::find().all(&*ctx.db).await?.len(), 2);

    // both providers' records surface under the one name
    let found = ctx.store.get_vulnerabilities("cve-2023-1234", ()).await?;
    assert_eq!(found.len(), 2);

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn metadata_is_not_overwritten(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let original = VulnerabilityInformation {
        status: VulnerabilityStatus::Rejected,
        published_date: Some(datetime!(2023-01-01 03:04:05 UTC)),
        ..cve("CVE-2023-1234", "ubuntu")
    };
    let id1 = ctx.store.resolve_vulnerability(&original, ()).await?;

    let id2 = ctx
        .store
        .resolve_vulnerability(
            &VulnerabilityInformation {
                status: VulnerabilityStatus::Active,
                published_date: Some(datetime!(2024-06-01 00:00:00 UTC)),
                ..cve("CVE-2023-1234", "ubuntu")
            },
            (),
        )
        .await?;
    assert_eq!(id1, id2);

    let model = vulnerability_handle::Entity::find_by_id(id1)
        .one(&*ctx.db)
        .await?
        .expect("row must exist");
    assert_eq!(model.status, VulnerabilityStatus::Rejected.to_string());
    assert_eq!(model.published_date, Some(datetime!(2023-01-01 03:04:05 UTC)));

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn provider_is_deduplicated(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    ctx.store
        .resolve_vulnerability(&cve("CVE-2023-1234", "Ubuntu"), ())
        .await?;
    ctx.store
        .resolve_vulnerability(&cve("CVE-2023-5678", "ubuntu"), ())
        .await?;

    let providers = provider::Entity::find().all(&*ctx.db).await?;
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].id, "Ubuntu");

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn empty_provider_is_rejected(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let result = ctx
        .store
        .resolve_vulnerability(&cve("CVE-2023-1234", ""), ())
        .await;

    assert!(matches!(
        result,
        Err(Error::InvalidSpecifier(message)) if message.contains("provider")
    ));

    Ok(())
}
