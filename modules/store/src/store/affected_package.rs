use crate::{
    model::AffectedPackageBlob,
    store::{
        lower_eq, normalize_ecosystem, Error, OperatingSystemInformation, OsSpecifier,
        PackageInformation, Store, VulnerabilityInformation, VulnerabilitySpecifier,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};
use sea_query::{Condition, Expr, Func, NullOrdering, Order, SimpleExpr};
use std::collections::{BTreeSet, HashMap};
use tracing::instrument;
use vulndb_common::{cpe::CpeAttributes, db::Txn};
use vulndb_entity::{
    affected_package_handle, blob, cpe, operating_system, package, package_cpe, provider,
    vulnerability_handle,
};

/// One "vulnerability affects package" fact to ingest: the entities it names
/// are resolved or created, then the handle row links them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffectedPackageEntry {
    pub vulnerability: VulnerabilityInformation,
    pub package: PackageInformation,
    pub operating_system: Option<OperatingSystemInformation>,
    pub blob: AffectedPackageBlob,
}

/// Package-side filtering for [`Store::get_affected_packages`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageSpecifier {
    pub name: Option<String>,
    pub ecosystem: Option<String>,
    pub cpe: Option<CpeAttributes>,
}

#[derive(Clone, Debug, Default)]
pub struct GetAffectedPackageOptions {
    pub preload_os: bool,
    pub preload_package: bool,
    pub preload_package_cpes: bool,
    pub preload_blob: bool,
    pub preload_vulnerability: bool,

    /// OR-combined; an [`OsSpecifier::Any`] disables OS filtering entirely.
    pub oss: Vec<OsSpecifier>,

    /// OR-combined.
    pub vulnerabilities: Vec<VulnerabilitySpecifier>,

    /// Let a wildcard attribute on the stored side satisfy a concrete
    /// specifier attribute. Off by default to suppress false positives.
    pub allow_broad_cpe_matching: bool,

    pub limit: Option<u64>,
}

/// A handle row with the associations the caller asked to have loaded.
///
/// An association is `Some` only when its preload flag was set, so "not
/// loaded" and "loaded but absent" stay distinguishable.
#[derive(Clone, Debug, PartialEq)]
pub struct AffectedPackage {
    pub handle: affected_package_handle::Model,
    pub package: Option<PackageRecord>,
    pub operating_system: Option<operating_system::Model>,
    pub vulnerability: Option<VulnerabilityRecord>,
    pub blob: Option<AffectedPackageBlob>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PackageRecord {
    pub package: package::Model,
    /// Ordered by CPE id; `None` unless CPEs were preloaded.
    pub cpes: Option<Vec<cpe::Model>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VulnerabilityRecord {
    pub vulnerability: vulnerability_handle::Model,
    pub provider: Option<provider::Model>,
}

impl Store {
    /// Rewrite the specifier's ecosystem through the alias table. Unknown
    /// ecosystems pass through unchanged.
    pub fn apply_package_alias(&self, specifier: &mut PackageSpecifier) {
        if let Some(ecosystem) = &specifier.ecosystem {
            specifier.ecosystem = Some(normalize_ecosystem(ecosystem));
        }
    }

    /// Ingest a batch of affected-package facts in a single transaction.
    ///
    /// All-or-nothing: the first entry that fails to resolve rolls back the
    /// whole batch, and the error names the offending package and
    /// vulnerability. Returns the inserted handle rows in input order.
    #[instrument(skip(self, entries), fields(num = entries.len()), err)]
    pub async fn add_affected_packages(
        &self,
        entries: Vec<AffectedPackageEntry>,
    ) -> Result<Vec<affected_package_handle::Model>, Error> {
        let tx = self.transaction().await?;

        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let package = entry.package.name.clone();
            let vulnerability = entry.vulnerability.name.clone();

            match self.add_affected_package(entry, &tx).await {
                Ok(handle) => handles.push(handle),
                // dropping the transaction rolls the batch back
                Err(err) => {
                    return Err(Error::AffectedPackage {
                        package,
                        vulnerability,
                        source: Box::new(err),
                    })
                }
            }
        }

        tx.commit().await?;

        Ok(handles)
    }

    async fn add_affected_package(
        &self,
        entry: AffectedPackageEntry,
        tx: &Txn,
    ) -> Result<affected_package_handle::Model, Error> {
        let vulnerability_id = self.resolve_vulnerability(&entry.vulnerability, tx).await?;
        let package_id = self.resolve_package(&entry.package, tx).await?;

        let operating_system_id = match &entry.operating_system {
            Some(os) => Some(self.resolve_operating_system(os, tx).await?),
            None => None,
        };

        let blob_id = self.get_or_create_blob(&entry.blob, tx).await?;

        // ingest is idempotent down to the handle: an identical
        // (package, os, vulnerability, blob) quadruple yields the existing row
        let mut existing = affected_package_handle::Entity::find()
            .filter(affected_package_handle::Column::PackageId.eq(package_id))
            .filter(affected_package_handle::Column::VulnerabilityId.eq(vulnerability_id))
            .filter(affected_package_handle::Column::BlobId.eq(blob_id));
        existing = match operating_system_id {
            Some(id) => {
                existing.filter(affected_package_handle::Column::OperatingSystemId.eq(id))
            }
            None => existing.filter(affected_package_handle::Column::OperatingSystemId.is_null()),
        };
        if let Some(model) = existing.one(&self.connection(tx)).await? {
            return Ok(model);
        }

        let entity = affected_package_handle::ActiveModel {
            id: Default::default(),
            package_id: Set(package_id),
            operating_system_id: Set(operating_system_id),
            vulnerability_id: Set(vulnerability_id),
            blob_id: Set(blob_id),
        };

        Ok(entity.insert(&self.connection(tx)).await?)
    }

    /// Query affected-package handles by package identity, CPE attributes,
    /// operating system, and vulnerability metadata, with caller-selected
    /// eager loading.
    ///
    /// Results come back in a stable order: ascending vulnerability name,
    /// then operating system id with OS-less rows first, then package id,
    /// then handle id.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn get_affected_packages<TX: AsRef<Txn>>(
        &self,
        package: Option<&PackageSpecifier>,
        options: &GetAffectedPackageOptions,
        tx: TX,
    ) -> Result<Vec<AffectedPackage>, Error> {
        let package = package.cloned().map(|mut specifier| {
            self.apply_package_alias(&mut specifier);
            specifier
        });

        // the vulnerability join carries both the specifier filters and the
        // result ordering
        let mut query = affected_package_handle::Entity::find().join(
            JoinType::InnerJoin,
            affected_package_handle::Relation::Vulnerability.def(),
        );

        if let Some(specifier) = &package {
            if specifier.name.is_some() || specifier.ecosystem.is_some() {
                query = query.join(
                    JoinType::InnerJoin,
                    affected_package_handle::Relation::Package.def(),
                );
            }
            if let Some(name) = &specifier.name {
                query = query.filter(lower_eq((package::Entity, package::Column::Name), name));
            }
            if let Some(ecosystem) = &specifier.ecosystem {
                query = query.filter(lower_eq(
                    (package::Entity, package::Column::Ecosystem),
                    ecosystem,
                ));
            }
            if let Some(attributes) = &specifier.cpe {
                let package_ids = self
                    .packages_matching_cpe(attributes, options.allow_broad_cpe_matching, &tx)
                    .await?;
                if package_ids.is_empty() {
                    return Ok(Vec::new());
                }
                query =
                    query.filter(affected_package_handle::Column::PackageId.is_in(package_ids));
            }
        }

        let any_os = options.oss.iter().any(|os| matches!(os, OsSpecifier::Any));
        if !options.oss.is_empty() && !any_os {
            let mut condition = Condition::any();
            let mut satisfiable = false;

            for specifier in &options.oss {
                match specifier {
                    OsSpecifier::Any => {}
                    OsSpecifier::None => {
                        condition = condition
                            .add(affected_package_handle::Column::OperatingSystemId.is_null());
                        satisfiable = true;
                    }
                    OsSpecifier::Criteria(criteria) => {
                        let ids: Vec<i64> = self
                            .search_operating_systems(criteria, &tx)
                            .await?
                            .into_iter()
                            .map(|os| os.id)
                            .collect();
                        if !ids.is_empty() {
                            condition = condition.add(
                                affected_package_handle::Column::OperatingSystemId.is_in(ids),
                            );
                            satisfiable = true;
                        }
                    }
                }
            }

            // none of the specifiers can match any row
            if !satisfiable {
                return Ok(Vec::new());
            }
            query = query.filter(condition);
        }

        if !options.vulnerabilities.is_empty() {
            let mut condition = Condition::any();
            for specifier in &options.vulnerabilities {
                condition = condition.add(specifier.condition());
            }
            query = query.filter(condition);
        }

        query = query
            .order_by(
                SimpleExpr::FunctionCall(Func::lower(Expr::col((
                    vulnerability_handle::Entity,
                    vulnerability_handle::Column::Name,
                )))),
                Order::Asc,
            )
            .order_by_with_nulls(
                affected_package_handle::Column::OperatingSystemId,
                Order::Asc,
                NullOrdering::First,
            )
            .order_by_asc(affected_package_handle::Column::PackageId)
            .order_by_asc(affected_package_handle::Column::Id);

        query = query.limit(options.limit);

        let handles = query.all(&self.connection(&tx)).await?;

        self.load_associations(handles, options, &tx).await
    }

    /// The ids of all packages owning a CPE that satisfies the specifier.
    ///
    /// The per-attribute wildcard rules are evaluated in Rust over the CPE
    /// catalog rather than in SQL, keeping the asymmetric broad-matching
    /// semantics in one place.
    async fn packages_matching_cpe<TX: AsRef<Txn>>(
        &self,
        specifier: &CpeAttributes,
        allow_broad: bool,
        tx: &TX,
    ) -> Result<Vec<i64>, Error> {
        let specifier = specifier.normalize();

        let cpe_ids: Vec<i64> = cpe::Entity::find()
            .all(&self.connection(tx))
            .await?
            .iter()
            .filter(|model| CpeAttributes::from(*model).matches(&specifier, allow_broad))
            .map(|model| model.id)
            .collect();

        if cpe_ids.is_empty() {
            return Ok(Vec::new());
        }

        let package_ids: BTreeSet<i64> = package_cpe::Entity::find()
            .filter(package_cpe::Column::CpeId.is_in(cpe_ids))
            .all(&self.connection(tx))
            .await?
            .into_iter()
            .map(|link| link.package_id)
            .collect();

        Ok(package_ids.into_iter().collect())
    }

    async fn load_associations<TX: AsRef<Txn>>(
        &self,
        handles: Vec<affected_package_handle::Model>,
        options: &GetAffectedPackageOptions,
        tx: &TX,
    ) -> Result<Vec<AffectedPackage>, Error> {
        let packages = if options.preload_package {
            self.load_packages(&handles, options.preload_package_cpes, tx)
                .await?
        } else {
            HashMap::new()
        };
        let operating_systems = if options.preload_os {
            self.load_operating_systems(&handles, tx).await?
        } else {
            HashMap::new()
        };
        let vulnerabilities = if options.preload_vulnerability {
            self.load_vulnerabilities(&handles, tx).await?
        } else {
            HashMap::new()
        };
        let blobs = if options.preload_blob {
            self.load_blobs(&handles, tx).await?
        } else {
            HashMap::new()
        };

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let package = if options.preload_package {
                Some(packages.get(&handle.package_id).cloned().ok_or_else(|| {
                    Error::NotFound(format!("package {}", handle.package_id))
                })?)
            } else {
                None
            };
            let operating_system = handle
                .operating_system_id
                .and_then(|id| operating_systems.get(&id).cloned());
            let vulnerability = if options.preload_vulnerability {
                Some(
                    vulnerabilities
                        .get(&handle.vulnerability_id)
                        .cloned()
                        .ok_or_else(|| {
                            Error::NotFound(format!("vulnerability {}", handle.vulnerability_id))
                        })?,
                )
            } else {
                None
            };
            let blob = if options.preload_blob {
                Some(blobs.get(&handle.blob_id).cloned().ok_or_else(|| {
                    Error::NotFound(format!("blob {}", handle.blob_id))
                })?)
            } else {
                None
            };

            results.push(AffectedPackage {
                handle,
                package,
                operating_system,
                vulnerability,
                blob,
            });
        }

        Ok(results)
    }

    async fn load_packages<TX: AsRef<Txn>>(
        &self,
        handles: &[affected_package_handle::Model],
        with_cpes: bool,
        tx: &TX,
    ) -> Result<HashMap<i64, PackageRecord>, Error> {
        let ids: BTreeSet<i64> = handles.iter().map(|handle| handle.package_id).collect();
        let models = package::Entity::find()
            .filter(package::Column::Id.is_in(ids))
            .all(&self.connection(tx))
            .await?;

        let mut cpes_by_package: HashMap<i64, Vec<cpe::Model>> = HashMap::new();
        if with_cpes {
            let package_ids: Vec<i64> = models.iter().map(|model| model.id).collect();
            let links = package_cpe::Entity::find()
                .filter(package_cpe::Column::PackageId.is_in(package_ids))
                .all(&self.connection(tx))
                .await?;

            let cpe_ids: BTreeSet<i64> = links.iter().map(|link| link.cpe_id).collect();
            let cpes: HashMap<i64, cpe::Model> = cpe::Entity::find()
                .filter(cpe::Column::Id.is_in(cpe_ids))
                .all(&self.connection(tx))
                .await?
                .into_iter()
                .map(|model| (model.id, model))
                .collect();

            for link in links {
                if let Some(model) = cpes.get(&link.cpe_id) {
                    cpes_by_package
                        .entry(link.package_id)
                        .or_default()
                        .push(model.clone());
                }
            }
            for list in cpes_by_package.values_mut() {
                list.sort_by_key(|model| model.id);
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let cpes =
                    with_cpes.then(|| cpes_by_package.remove(&model.id).unwrap_or_default());
                (
                    model.id,
                    PackageRecord {
                        package: model,
                        cpes,
                    },
                )
            })
            .collect())
    }

    async fn load_operating_systems<TX: AsRef<Txn>>(
        &self,
        handles: &[affected_package_handle::Model],
        tx: &TX,
    ) -> Result<HashMap<i64, operating_system::Model>, Error> {
        let ids: BTreeSet<i64> = handles
            .iter()
            .filter_map(|handle| handle.operating_system_id)
            .collect();

        Ok(operating_system::Entity::find()
            .filter(operating_system::Column::Id.is_in(ids))
            .all(&self.connection(tx))
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect())
    }

    async fn load_vulnerabilities<TX: AsRef<Txn>>(
        &self,
        handles: &[affected_package_handle::Model],
        tx: &TX,
    ) -> Result<HashMap<i64, VulnerabilityRecord>, Error> {
        let ids: BTreeSet<i64> = handles.iter().map(|handle| handle.vulnerability_id).collect();
        let models = vulnerability_handle::Entity::find()
            .filter(vulnerability_handle::Column::Id.is_in(ids))
            .all(&self.connection(tx))
            .await?;

        let provider_ids: BTreeSet<String> = models
            .iter()
            .map(|model| model.provider_id.clone())
            .collect();
        let providers: HashMap<String, provider::Model> = provider::Entity::find()
            .filter(provider::Column::Id.is_in(provider_ids))
            .all(&self.connection(tx))
            .await?
            .into_iter()
            .map(|model| (model.id.clone(), model))
            .collect();

        Ok(models
            .into_iter()
            .map(|model| {
                let provider = providers.get(&model.provider_id).cloned();
                (
                    model.id,
                    VulnerabilityRecord {
                        vulnerability: model,
                        provider,
                    },
                )
            })
            .collect())
    }

    async fn load_blobs<TX: AsRef<Txn>>(
        &self,
        handles: &[affected_package_handle::Model],
        tx: &TX,
    ) -> Result<HashMap<i64, AffectedPackageBlob>, Error> {
        let ids: BTreeSet<i64> = handles.iter().map(|handle| handle.blob_id).collect();

        blob::Entity::find()
            .filter(blob::Column::Id.is_in(ids))
            .all(&self.connection(tx))
            .await?
            .into_iter()
            .map(|model| Ok((model.id, serde_json::from_value(model.value)?)))
            .collect()
    }
}
