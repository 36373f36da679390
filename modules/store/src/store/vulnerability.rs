use crate::{
    model::VulnerabilityBlob,
    store::{lower_eq, Error, Store},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_query::{Condition, Expr};
use time::OffsetDateTime;
use tracing::instrument;
use vulndb_common::db::Txn;
use vulndb_entity::{
    provider,
    vulnerability_handle::{self, VulnerabilityStatus},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderInformation {
    pub id: String,
    pub version: Option<String>,
    pub processor: Option<String>,
    pub date_captured: Option<OffsetDateTime>,
    pub input_digest: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VulnerabilityInformation {
    pub name: String,
    pub status: VulnerabilityStatus,
    pub published_date: Option<OffsetDateTime>,
    pub modified_date: Option<OffsetDateTime>,
    pub provider: ProviderInformation,
    /// The detailed vulnerability document, stored through the blob sub-store.
    pub blob: Option<VulnerabilityBlob>,
}

/// One OR-branch of a vulnerability filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VulnerabilitySpecifier {
    pub name: Option<String>,
    pub status: Option<VulnerabilityStatus>,
    pub published_after: Option<OffsetDateTime>,
    pub modified_after: Option<OffsetDateTime>,
}

impl VulnerabilitySpecifier {
    /// The condition over `vulnerability_handles` columns this specifier
    /// stands for. Date filters are strict `>`; a row without the date can
    /// never satisfy them.
    pub(crate) fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(name) = &self.name {
            condition = condition.add(lower_eq(
                (vulnerability_handle::Entity, vulnerability_handle::Column::Name),
                name,
            ));
        }
        if let Some(status) = self.status {
            condition = condition.add(
                Expr::col((
                    vulnerability_handle::Entity,
                    vulnerability_handle::Column::Status,
                ))
                .eq(status.to_string()),
            );
        }
        if let Some(after) = self.published_after {
            condition = condition.add(
                Expr::col((
                    vulnerability_handle::Entity,
                    vulnerability_handle::Column::PublishedDate,
                ))
                .gt(after),
            );
        }
        if let Some(after) = self.modified_after {
            condition = condition.add(
                Expr::col((
                    vulnerability_handle::Entity,
                    vulnerability_handle::Column::ModifiedDate,
                ))
                .gt(after),
            );
        }

        condition
    }
}

impl Store {
    /// Find or create the provider row. Lookup is case-insensitive; the
    /// first-seen spelling of the id wins.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn resolve_provider<TX: AsRef<Txn>>(
        &self,
        provider: &ProviderInformation,
        tx: TX,
    ) -> Result<String, Error> {
        if provider.id.is_empty() {
            return Err(Error::InvalidSpecifier("provider id is required".into()));
        }

        let found = provider::Entity::find()
            .filter(lower_eq(provider::Column::Id, &provider.id))
            .one(&self.connection(&tx))
            .await?;

        if let Some(model) = found {
            return Ok(model.id);
        }

        let entity = provider::ActiveModel {
            id: Set(provider.id.clone()),
            version: Set(provider.version.clone()),
            processor: Set(provider.processor.clone()),
            date_captured: Set(provider.date_captured),
            input_digest: Set(provider.input_digest.clone()),
        };

        Ok(entity.insert(&self.connection(&tx)).await?.id)
    }

    /// Find or create a vulnerability row, identified by the lowercased name
    /// and its provider.
    ///
    /// An existing row keeps its status and dates: later ingests never
    /// overwrite metadata.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn resolve_vulnerability<TX: AsRef<Txn>>(
        &self,
        vulnerability: &VulnerabilityInformation,
        tx: TX,
    ) -> Result<i64, Error> {
        if vulnerability.name.is_empty() {
            return Err(Error::InvalidSpecifier(
                "vulnerability name is required".into(),
            ));
        }

        let provider_id = self.resolve_provider(&vulnerability.provider, &tx).await?;

        let found = vulnerability_handle::Entity::find()
            .filter(lower_eq(vulnerability_handle::Column::Name, &vulnerability.name))
            .filter(vulnerability_handle::Column::ProviderId.eq(&provider_id))
            .one(&self.connection(&tx))
            .await?;

        if let Some(model) = found {
            return Ok(model.id);
        }

        let blob_id = match &vulnerability.blob {
            Some(document) => Some(self.get_or_create_blob(document, &tx).await?),
            None => None,
        };

        let entity = vulnerability_handle::ActiveModel {
            id: Default::default(),
            name: Set(vulnerability.name.clone()),
            status: Set(vulnerability.status.to_string()),
            published_date: Set(vulnerability.published_date),
            modified_date: Set(vulnerability.modified_date),
            provider_id: Set(provider_id),
            blob_id: Set(blob_id),
        };

        Ok(entity.insert(&self.connection(&tx)).await?.id)
    }

    /// All vulnerability rows with the given name, across providers.
    pub async fn get_vulnerabilities<TX: AsRef<Txn>>(
        &self,
        name: &str,
        tx: TX,
    ) -> Result<Vec<vulnerability_handle::Model>, Error> {
        Ok(vulnerability_handle::Entity::find()
            .filter(lower_eq(vulnerability_handle::Column::Name, name))
            .all(&self.connection(&tx))
            .await?)
    }
}
