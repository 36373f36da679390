use crate::store::{Error, Store};
use once_cell::sync::Lazy;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_query::OnConflict;
use std::collections::HashMap;
use tracing::instrument;
use vulndb_common::{
    cpe::CpeAttributes,
    db::{is_duplicate, Txn},
};
use vulndb_entity::{cpe, package, package_cpe};

/// Ecosystems that feeds spell differently than the package catalog does.
static ECOSYSTEM_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("cocoapods", "pod"),
        ("pub", "dart-pub"),
        ("otp", "erlang-otp"),
        ("github", "github-action"),
        ("golang", "go-module"),
        ("maven", "java-archive"),
        ("composer", "php-composer"),
        ("pecl", "php-pecl"),
        ("pypi", "python"),
        ("cran", "R-package"),
        ("luarocks", "lua-rocks"),
        ("cargo", "rust-crate"),
    ])
});

/// Map an ecosystem through the alias table, case-insensitively.
///
/// Ecosystems containing `/`, empty ones, and anything not in the table pass
/// through unchanged. Idempotent: alias targets are not themselves aliased.
pub fn normalize_ecosystem(ecosystem: &str) -> String {
    match ECOSYSTEM_ALIASES.get(ecosystem.to_lowercase().as_str()) {
        Some(normalized) => (*normalized).to_string(),
        None => ecosystem.to_string(),
    }
}

/// A package to resolve, together with the CPEs to attach to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageInformation {
    pub name: String,
    pub ecosystem: String,
    pub cpes: Vec<CpeAttributes>,
}

impl Store {
    pub async fn get_package<TX: AsRef<Txn>>(
        &self,
        name: &str,
        ecosystem: &str,
        tx: TX,
    ) -> Result<Option<package::Model>, Error> {
        Ok(package::Entity::find()
            .filter(package::Column::Name.eq(name.to_lowercase()))
            .filter(package::Column::Ecosystem.eq(normalize_ecosystem(ecosystem).to_lowercase()))
            .one(&self.connection(&tx))
            .await?)
    }

    /// Find or create the package row for the normalized `(name, ecosystem)`
    /// identity, and attach the given CPEs to it.
    ///
    /// The package's CPE set only ever grows: resolving an existing package
    /// with additional CPEs links the new ones as well.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn resolve_package<TX: AsRef<Txn>>(
        &self,
        package: &PackageInformation,
        tx: TX,
    ) -> Result<i64, Error> {
        if package.name.is_empty() {
            return Err(Error::InvalidSpecifier("package name is required".into()));
        }

        let name = package.name.to_lowercase();
        let ecosystem = normalize_ecosystem(&package.ecosystem).to_lowercase();

        let found = package::Entity::find()
            .filter(package::Column::Name.eq(&name))
            .filter(package::Column::Ecosystem.eq(&ecosystem))
            .one(&self.connection(&tx))
            .await?;

        let package_id = match found {
            Some(model) => model.id,
            None => {
                let entity = package::ActiveModel {
                    id: Default::default(),
                    name: Set(name.clone()),
                    ecosystem: Set(ecosystem.clone()),
                };
                match entity.insert(&self.connection(&tx)).await {
                    Ok(model) => model.id,
                    // lost a race against another writer, the row exists now
                    Err(err) if is_duplicate(&err) => package::Entity::find()
                        .filter(package::Column::Name.eq(&name))
                        .filter(package::Column::Ecosystem.eq(&ecosystem))
                        .one(&self.connection(&tx))
                        .await?
                        .ok_or_else(|| Error::NotFound(format!("package {name}/{ecosystem}")))?
                        .id,
                    Err(err) => return Err(err.into()),
                }
            }
        };

        for attributes in &package.cpes {
            let cpe_id = self.resolve_cpe(attributes, &tx).await?;

            package_cpe::Entity::insert(package_cpe::ActiveModel {
                package_id: Set(package_id),
                cpe_id: Set(cpe_id),
            })
            .on_conflict(
                OnConflict::columns([package_cpe::Column::PackageId, package_cpe::Column::CpeId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.connection(&tx))
            .await?;
        }

        Ok(package_id)
    }

    /// Find or create the row for a CPE attribute tuple.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn resolve_cpe<TX: AsRef<Txn>>(
        &self,
        attributes: &CpeAttributes,
        tx: TX,
    ) -> Result<i64, Error> {
        let attributes = attributes.normalize();

        let found = cpe::Entity::find()
            .filter(cpe::Column::Part.eq(&attributes.part))
            .filter(cpe::Column::Vendor.eq(&attributes.vendor))
            .filter(cpe::Column::Product.eq(&attributes.product))
            .filter(cpe::Column::Edition.eq(&attributes.edition))
            .filter(cpe::Column::Language.eq(&attributes.language))
            .filter(cpe::Column::SoftwareEdition.eq(&attributes.software_edition))
            .filter(cpe::Column::TargetHardware.eq(&attributes.target_hardware))
            .filter(cpe::Column::TargetSoftware.eq(&attributes.target_software))
            .filter(cpe::Column::Other.eq(&attributes.other))
            .one(&self.connection(&tx))
            .await?;

        if let Some(model) = found {
            return Ok(model.id);
        }

        let entity: cpe::ActiveModel = (&attributes).into();
        Ok(entity.insert(&self.connection(&tx)).await?.id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_context::test_context;
    use test_log::test;
    use vulndb_test_context::StoreContext;

    #[test]
    fn ecosystem_aliases() {
        for (input, expected) in [
            ("cocoapods", "pod"),
            ("pub", "dart-pub"),
            ("otp", "erlang-otp"),
            ("github", "github-action"),
            ("golang", "go-module"),
            ("maven", "java-archive"),
            ("composer", "php-composer"),
            ("pecl", "php-pecl"),
            ("pypi", "python"),
            ("cran", "R-package"),
            ("luarocks", "lua-rocks"),
            ("cargo", "rust-crate"),
            // pass-through cases
            ("generic/linux-kernel", "generic/linux-kernel"),
            ("", ""),
            ("python", "python"),
        ] {
            assert_eq!(normalize_ecosystem(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ECOSYSTEM_ALIASES.keys() {
            let once = normalize_ecosystem(input);
            assert_eq!(normalize_ecosystem(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn aliasing_ignores_case() {
        assert_eq!(normalize_ecosystem("GoLang"), "go-module");
        assert_eq!(normalize_ecosystem("MAVEN"), "java-archive");
    }

    #[test_context(StoreContext)]
    #[test(tokio::test)]
    async fn resolve_deduplicates(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
        let id1 = ctx
            .store
            .resolve_package(
                &PackageInformation {
                    name: "Pkg1".into(),
                    ecosystem: "Type1".into(),
                    ..Default::default()
                },
                (),
            )
            .await?;
        let id2 = ctx
            .store
            .resolve_package(
                &PackageInformation {
                    name: "pkg1".into(),
                    ecosystem: "type1".into(),
                    ..Default::default()
                },
                (),
            )
            .await?;

        assert_eq!(id1, id2);

        let packages = package::Entity::find().all(&*ctx.db).await?;
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "pkg1");
        assert_eq!(packages[0].ecosystem, "type1");

        let found = ctx.store.get_package("PKG1", "Type1", ()).await?;
        assert_eq!(found.map(|package| package.id), Some(id1));

        Ok(())
    }

    #[test_context(StoreContext)]
    #[test(tokio::test)]
    async fn resolve_applies_ecosystem_alias(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
        let id1 = ctx
            .store
            .resolve_package(
                &PackageInformation {
                    name: "requests".into(),
                    ecosystem: "pypi".into(),
                    ..Default::default()
                },
                (),
            )
            .await?;
        let id2 = ctx
            .store
            .resolve_package(
                &PackageInformation {
                    name: "requests".into(),
                    ecosystem: "python".into(),
                    ..Default::default()
                },
                (),
            )
            .await?;

        assert_eq!(id1, id2);

        Ok(())
    }

    #[test_context(StoreContext)]
    #[test(tokio::test)]
    async fn empty_name_is_rejected(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
        let result = ctx
            .store
            .resolve_package(&PackageInformation::default(), ())
            .await;

        assert!(matches!(result, Err(Error::InvalidSpecifier(_))));

        Ok(())
    }

    #[test_context(StoreContext)]
    #[test(tokio::test)]
    async fn duplicate_cpes_collapse(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
        let attributes = CpeAttributes {
            part: "a".into(),
            vendor: "vendor1".into(),
            product: "product1".into(),
            ..Default::default()
        };

        ctx.store
            .resolve_package(
                &PackageInformation {
                    name: "pkg1".into(),
                    ecosystem: "type1".into(),
                    cpes: vec![attributes.clone(), attributes.clone()],
                },
                (),
            )
            .await?;

        assert_eq!(cpe::Entity::find().all(&*ctx.db).await?.len(), 1);
        assert_eq!(package_cpe::Entity::find().all(&*ctx.db).await?.len(), 1);

        Ok(())
    }

    #[test_context(StoreContext)]
    #[test(tokio::test)]
    async fn cpes_are_shared_across_packages(ctx: &mut StoreContext) -> Result<(), anyhow::Error> {
        let shared = CpeAttributes {
            part: "a".into(),
            vendor: "vendor1".into(),
            product: "product1".into(),
            ..Default::default()
        };
        let extra = CpeAttributes {
            part: "a".into(),
            vendor: "vendor2".into(),
            product: "product2".into(),
            ..Default::default()
        };

        ctx.store
            .resolve_package(
                &PackageInformation {
                    name: "pkg1".into(),
                    ecosystem: "type1".into(),
                    cpes: vec![shared.clone()],
                },
                (),
            )
            .await?;
        ctx.store
            .resolve_package(
                &PackageInformation {
                    name: "pkg2".into(),
                    ecosystem: "type1".into(),
                    cpes: vec![shared.clone(), extra.clone()],
                },
                (),
            )
            .await?;

        // one row per distinct tuple, one link per attachment
        assert_eq!(cpe::Entity::find().all(&*ctx.db).await?.len(), 2);
        assert_eq!(package_cpe::Entity::find().all(&*ctx.db).await?.len(), 3);

        Ok(())
    }
}
