use crate::store::{lower_eq, Error, Store};
use once_cell::sync::Lazy;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryFilter, Set};
use sea_query::{Condition, Expr, Func};
use std::collections::HashMap;
use tracing::instrument;
use vulndb_common::db::Txn;
use vulndb_entity::operating_system;

/// Distribution names that appear under more than one spelling in the wild.
static OS_NAME_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("amzn", "amazonlinux"),
        ("amazon", "amazonlinux"),
        ("arch", "archlinux"),
        ("oracle", "ol"),
        ("oraclelinux", "ol"),
        ("rocky", "rockylinux"),
    ])
});

/// An operating system release to resolve at ingest time. Empty fields are
/// persisted as empty strings and only ever match empty fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatingSystemInformation {
    pub name: String,
    pub release_id: String,
    pub major_version: String,
    pub minor_version: String,
    pub label_version: String,
    pub codename: String,
}

/// Query-side operating system selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OsSpecifier {
    /// No filtering on the operating system at all.
    Any,
    /// Only rows that are not tied to any operating system.
    None,
    /// Rows whose operating system satisfies the criteria.
    Criteria(OsCriteria),
}

/// Loose matching criteria for an operating system. Empty fields are
/// unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OsCriteria {
    /// Matched against the stored name, the release id, or a known alias of
    /// either.
    pub name: String,
    pub major_version: String,
    pub minor_version: String,
    /// Matched against the stored label version or codename.
    pub label_version: String,
    /// Matched against the stored codename or label version.
    pub codename: String,
}

impl OsCriteria {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.major_version.is_empty()
            && self.minor_version.is_empty()
            && self.label_version.is_empty()
            && self.codename.is_empty()
    }

    fn matches(&self, os: &operating_system::Model) -> bool {
        if !self.name.is_empty() && !name_matches(&self.name, os) {
            return false;
        }

        if !self.label_version.is_empty() && !release_label_matches(&self.label_version, os) {
            return false;
        }

        if !self.codename.is_empty() && !release_label_matches(&self.codename, os) {
            return false;
        }

        if !self.major_version.is_empty() && !versions_equal(&self.major_version, &os.major_version)
        {
            return false;
        }

        // an unset minor version matches any stored minor
        if !self.minor_version.is_empty() && !versions_equal(&self.minor_version, &os.minor_version)
        {
            return false;
        }

        true
    }
}

fn name_matches(name: &str, os: &operating_system::Model) -> bool {
    let name = name.to_lowercase();
    let alias = OS_NAME_ALIASES.get(name.as_str()).copied();

    let matches = [Some(name.as_str()), alias].into_iter().flatten().any(|n| {
        os.name.eq_ignore_ascii_case(n) || os.release_id.eq_ignore_ascii_case(n)
    });
    matches
}

fn release_label_matches(label: &str, os: &operating_system::Model) -> bool {
    (!os.label_version.is_empty() && os.label_version.eq_ignore_ascii_case(label))
        || (!os.codename.is_empty() && os.codename.eq_ignore_ascii_case(label))
}

/// Version component equality: numeric when both sides parse as integers,
/// otherwise case-insensitive string equality after stripping a single
/// leading zero from each side.
fn versions_equal(a: &str, b: &str) -> bool {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => strip_leading_zero(a).eq_ignore_ascii_case(strip_leading_zero(b)),
    }
}

fn strip_leading_zero(version: &str) -> &str {
    version.strip_prefix('0').unwrap_or(version)
}

impl Store {
    /// Find or create an operating system row.
    ///
    /// Strict resolution: every field must equal the stored one
    /// case-insensitively, with empty fields matching only empty fields. The
    /// loose version comparison is a query-time behavior, so `"4"` and `"04"`
    /// resolve to distinct rows.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn resolve_operating_system<TX: AsRef<Txn>>(
        &self,
        os: &OperatingSystemInformation,
        tx: TX,
    ) -> Result<i64, Error> {
        if os.name.is_empty() && os.release_id.is_empty() {
            return Err(Error::InvalidSpecifier(
                "operating system requires a name or release id".into(),
            ));
        }

        let found = operating_system::Entity::find()
            .filter(lower_eq(operating_system::Column::Name, &os.name))
            .filter(lower_eq(operating_system::Column::ReleaseId, &os.release_id))
            .filter(lower_eq(operating_system::Column::MajorVersion, &os.major_version))
            .filter(lower_eq(operating_system::Column::MinorVersion, &os.minor_version))
            .filter(lower_eq(operating_system::Column::LabelVersion, &os.label_version))
            .filter(lower_eq(operating_system::Column::Codename, &os.codename))
            .one(&self.connection(&tx))
            .await?;

        if let Some(model) = found {
            return Ok(model.id);
        }

        let entity = operating_system::ActiveModel {
            id: Default::default(),
            name: Set(os.name.clone()),
            release_id: Set(os.release_id.clone()),
            major_version: Set(os.major_version.clone()),
            minor_version: Set(os.minor_version.clone()),
            label_version: Set(os.label_version.clone()),
            codename: Set(os.codename.clone()),
        };

        Ok(entity.insert(&self.connection(&tx)).await?.id)
    }

    /// All operating system rows satisfying the criteria.
    ///
    /// Candidates are narrowed by name/release id in the database; the
    /// label/codename and version rules are evaluated per row, since the
    /// leading-zero and numeric comparisons don't translate to column
    /// equality.
    #[instrument(skip(self, tx), err(level=tracing::Level::INFO))]
    pub async fn search_operating_systems<TX: AsRef<Txn>>(
        &self,
        criteria: &OsCriteria,
        tx: TX,
    ) -> Result<Vec<operating_system::Model>, Error> {
        if criteria.is_empty() {
            return Err(Error::InvalidSpecifier(
                "operating system specifier requires a name, version, or codename".into(),
            ));
        }

        let mut query = operating_system::Entity::find();

        if !criteria.name.is_empty() {
            let name = criteria.name.to_lowercase();
            let mut names = vec![name.clone()];
            if let Some(alias) = OS_NAME_ALIASES.get(name.as_str()) {
                names.push((*alias).to_string());
            }

            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(operating_system::Column::Name)))
                            .is_in(names.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(operating_system::Column::ReleaseId)))
                            .is_in(names),
                    ),
            );
        }

        let candidates = query.all(&self.connection(&tx)).await?;

        Ok(candidates
            .into_iter()
            .filter(|os| criteria.matches(os))
            .collect())
    }
}
