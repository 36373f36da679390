use crate::store::{Error, Store};
use sea_orm::{EntityTrait, Set};
use sea_query::OnConflict;
use serde::Serialize;
use tracing::instrument;
use vulndb_common::{db::Txn, hashing::Digests};
use vulndb_entity::blob;

/// Derive the blob id from a digest: the big-endian first eight bytes of the
/// SHA-256 of the canonical serialization. Collisions are treated as
/// impossible.
fn blob_id(digests: &Digests) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digests.sha256.as_ref()[..8]);
    i64::from_be_bytes(bytes)
}

impl Store {
    /// Store a payload, returning its content-derived id.
    ///
    /// The payload is serialized canonically (object keys sorted), so two
    /// payloads with equal canonical forms share one row. Writes are
    /// idempotent.
    #[instrument(skip(self, value, tx), err(level=tracing::Level::INFO))]
    pub async fn get_or_create_blob<T, TX>(&self, value: &T, tx: TX) -> Result<i64, Error>
    where
        T: Serialize + ?Sized,
        TX: AsRef<Txn>,
    {
        let value = serde_json::to_value(value)?;
        let id = blob_id(&Digests::digest(value.to_string()));

        let entity = blob::ActiveModel {
            id: Set(id),
            value: Set(value),
        };

        blob::Entity::insert(entity)
            .on_conflict(OnConflict::column(blob::Column::Id).do_nothing().to_owned())
            .do_nothing()
            .exec(&self.connection(&tx))
            .await?;

        Ok(id)
    }

    pub async fn get_blob<TX: AsRef<Txn>>(
        &self,
        id: i64,
        tx: TX,
    ) -> Result<Option<blob::Model>, Error> {
        Ok(blob::Entity::find_by_id(id)
            .one(&self.connection(&tx))
            .await?)
    }
}
