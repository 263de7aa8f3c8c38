//! Name/id reconciliation for foreign references
//!
//! A record may reference a teacher or a class by display name, by id, or by
//! both. [`resolve_reference`] fills in the missing half from the lookup
//! table, or checks that both halves agree.
//!
//! The check is not isolated from concurrent writers: a pair validated here
//! can go stale before the caller inserts. The schema's foreign keys turn a
//! vanished id into a conflict at insert time; a rename in between is
//! harmless because names are always read back through joins.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{entity} with name '{name}' not found")]
    NotFoundByName { entity: String, name: String },

    #[error("{entity} with id '{id}' not found")]
    NotFoundById { entity: String, id: String },

    #[error("{entity} name '{given}' does not match id '{id}' (expected '{expected}')")]
    Mismatch {
        entity: String,
        id: String,
        given: String,
        expected: String,
    },

    #[error("Failed to look up {entity}: {source}")]
    Lookup {
        entity: String,
        #[source]
        source: sqlx::Error,
    },
}

/// A table keyed by id with a unique display column.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Entity label used in error messages.
    fn label(&self) -> &str;

    /// ASCII case-insensitive match on the trimmed display value. Returns the
    /// id and the stored display value.
    async fn find_by_name(&self, name: &str) -> Result<Option<(String, String)>, sqlx::Error>;

    async fn find_name_by_id(&self, id: &str) -> Result<Option<String>, sqlx::Error>;
}

/// ASCII-only case folding, the same rule as SQLite's `LOWER`, so the
/// cross-check agrees with [`ReferenceLookup::find_by_name`] and the unique
/// name indexes.
fn names_match(stored: &str, given: &str) -> bool {
    stored.trim().eq_ignore_ascii_case(given.trim())
}

/// Reconcile a `(id, name)` pair against `lookup`.
///
/// On success both fields hold the stored id and display value, or both are
/// empty when neither was supplied. On failure nothing is modified.
pub async fn resolve_reference<L>(
    lookup: &L,
    id: &mut String,
    name: &mut String,
) -> Result<(), ResolveError>
where
    L: ReferenceLookup + ?Sized,
{
    let given_id = id.trim().to_string();
    let given_name = name.trim().to_string();
    let entity = lookup.label().to_string();
    let lookup_err = |source| ResolveError::Lookup {
        entity: lookup.label().to_string(),
        source,
    };

    match (given_id.is_empty(), given_name.is_empty()) {
        (true, true) => {
            id.clear();
            name.clear();
        }
        (true, false) => {
            let (found_id, found_name) = lookup
                .find_by_name(&given_name)
                .await
                .map_err(lookup_err)?
                .ok_or_else(|| ResolveError::NotFoundByName {
                    entity,
                    name: given_name.clone(),
                })?;
            debug!("Resolved {} '{}' to id {}", lookup.label(), given_name, found_id);
            *id = found_id;
            *name = found_name;
        }
        (false, true) => {
            let found_name = lookup
                .find_name_by_id(&given_id)
                .await
                .map_err(lookup_err)?
                .ok_or_else(|| ResolveError::NotFoundById {
                    entity,
                    id: given_id.clone(),
                })?;
            *id = given_id;
            *name = found_name;
        }
        (false, false) => {
            let expected = lookup
                .find_name_by_id(&given_id)
                .await
                .map_err(lookup_err)?
                .ok_or_else(|| ResolveError::NotFoundById {
                    entity: entity.clone(),
                    id: given_id.clone(),
                })?;

            if !names_match(&expected, &given_name) {
                return Err(ResolveError::Mismatch {
                    entity,
                    id: given_id,
                    given: given_name,
                    expected,
                });
            }
            *id = given_id;
            *name = expected;
        }
    }

    Ok(())
}

/// [`ReferenceLookup`] over a SQL table. Soft-deleted rows are invisible.
#[derive(Clone)]
pub struct SqlReferenceTable {
    pool: SqlitePool,
    table: &'static str,
    name_column: &'static str,
    label: &'static str,
}

impl SqlReferenceTable {
    pub fn guru(pool: SqlitePool) -> Self {
        Self {
            pool,
            table: "guru",
            name_column: "nama",
            label: "guru",
        }
    }

    pub fn kelas(pool: SqlitePool) -> Self {
        Self {
            pool,
            table: "kelas",
            name_column: "kelas",
            label: "kelas",
        }
    }
}

#[async_trait]
impl ReferenceLookup for SqlReferenceTable {
    fn label(&self) -> &str {
        self.label
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<(String, String)>, sqlx::Error> {
        let sql = format!(
            "SELECT id, {col} AS name FROM {table} \
             WHERE LOWER(TRIM({col})) = LOWER(TRIM(?)) AND deleted_at IS NULL LIMIT 1",
            col = self.name_column,
            table = self.table
        );

        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        row.map(|r| -> Result<(String, String), sqlx::Error> {
            Ok((r.try_get("id")?, r.try_get("name")?))
        })
        .transpose()
    }

    async fn find_name_by_id(&self, id: &str) -> Result<Option<String>, sqlx::Error> {
        let sql = format!(
            "SELECT {col} AS name FROM {table} WHERE id = ? AND deleted_at IS NULL",
            col = self.name_column,
            table = self.table
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| r.try_get::<String, _>("name")).transpose()
    }
}
