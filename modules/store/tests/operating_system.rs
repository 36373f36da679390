use test_context::test_context;
use test_log::test;
use vulndb_module_store::store::{Error, OperatingSystemInformation, OsCriteria};
use vulndb_test_context::StoreContext;

fn ubuntu_focal() -> OperatingSystemInformation {
    OperatingSystemInformation {
        name: "ubuntu".into(),
        major_version: "20".into(),
        minor_version: "04".into(),
        codename: "focal".into(),
        ..Default::default()
    }
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn strict_resolution(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let id1 = ctx.store.resolve_operating_system(&ubuntu_focal(), ()).await?;

    // case variance folds onto the same row
    let id2 = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                name: "Ubuntu".into(),
                codename: "Focal".into(),
                ..ubuntu_focal()
            },
            (),
        )
        .await?;
    assert_eq!(id1, id2);

    // a leading zero is part of the strict identity
    let id3 = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                minor_version: "4".into(),
                ..ubuntu_focal()
            },
            (),
        )
        .await?;
    assert_ne!(id1, id3);

    // empty fields only match empty fields
    let id4 = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                codename: String::new(),
                ..ubuntu_focal()
            },
            (),
        )
        .await?;
    assert_ne!(id1, id4);

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn search_by_name_release_and_label(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let focal = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                release_id: "zubuntu".into(),
                ..ubuntu_focal()
            },
            (),
        )
        .await?;
    let groovy = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                name: "ubuntu".into(),
                major_version: "20".into(),
                minor_version: "10".into(),
                label_version: "groovy".into(),
                ..Default::default()
            },
            (),
        )
        .await?;

    let by_name = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                name: "uBUNtu".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert_eq!(
        by_name.iter().map(|os| os.id).collect::<Vec<_>>(),
        vec![focal, groovy]
    );

    let by_release = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                name: "zUBuntu".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert_eq!(by_release.iter().map(|os| os.id).collect::<Vec<_>>(), vec![focal]);

    // a label criteria matches the stored codename and vice versa
    let by_label = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                label_version: "fOCAL".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert_eq!(by_label.iter().map(|os| os.id).collect::<Vec<_>>(), vec![focal]);

    let by_codename = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                codename: "groovy".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert_eq!(
        by_codename.iter().map(|os| os.id).collect::<Vec<_>>(),
        vec![groovy]
    );

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn search_by_version(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let focal = ctx.store.resolve_operating_system(&ubuntu_focal(), ()).await?;

    for minor in ["4", "04"] {
        let found = ctx
            .store
            .search_operating_systems(
                &OsCriteria {
                    name: "ubuntu".into(),
                    major_version: "20".into(),
                    minor_version: minor.into(),
                    ..Default::default()
                },
                (),
            )
            .await?;
        assert_eq!(
            found.iter().map(|os| os.id).collect::<Vec<_>>(),
            vec![focal],
            "minor {minor:?}"
        );
    }

    let miss = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                name: "ubuntu".into(),
                major_version: "20".into(),
                minor_version: "10".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert!(miss.is_empty());

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn search_by_alias(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let amazon = ctx
        .store
        .resolve_operating_system(
            &OperatingSystemInformation {
                name: "amazonlinux".into(),
                release_id: "amzn".into(),
                major_version: "2023".into(),
                ..Default::default()
            },
            (),
        )
        .await?;

    let found = ctx
        .store
        .search_operating_systems(
            &OsCriteria {
                name: "amazon".into(),
                ..Default::default()
            },
            (),
        )
        .await?;
    assert_eq!(found.iter().map(|os| os.id).collect::<Vec<_>>(), vec![amazon]);

    Ok(())
}

#[test_context(StoreContext)]
#[test(tokio::test)]
async fn empty_criteria_is_rejected(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
    let result = ctx
        .store
        .search_operating_systems(&OsCriteria::default(), ())
        .await;

    assert!(matches!(result, Err(Error::InvalidSpecifier(_))));

    Ok(())
}
