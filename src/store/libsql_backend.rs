//! libSQL backend: async `ProfileSink` implementation.
//!
//! Supports local file, in-memory, and remote (hosted libSQL) databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::field::{FieldKind, FieldName};
use crate::intake::model::ProfileRecord;
use crate::store::migrations;
use crate::store::traits::{ProfileSink, RecordId};

const PROFILE_TABLE: &str = "candidate_profiles";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests and dry runs).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    /// Connect to a hosted libSQL database.
    pub async fn new_remote(url: &str, auth_token: &SecretString) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.to_string(), auth_token.expose_secret().to_string())
            .build()
            .await
            .map_err(|e| DatabaseError::Unavailable(format!("Failed to reach {url}: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(url = url, "Remote database connected");
        Ok(backend)
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Number of stored profiles.
    pub async fn count_profiles(&self) -> Result<usize, DatabaseError> {
        let mut rows = self
            .conn()
            .query(&format!("SELECT COUNT(*) FROM {PROFILE_TABLE}"), ())
            .await
            .map_err(|e| DatabaseError::Query(format!("count_profiles: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
                Ok(count as usize)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_profiles: {e}"))),
        }
    }

    /// Load a stored profile's fields by id, keyed like the inserted record.
    pub async fn get_profile(
        &self,
        id: &RecordId,
    ) -> Result<Option<Map<String, Value>>, DatabaseError> {
        let columns = FieldName::ALL
            .iter()
            .map(|f| format!("\"{}\"", f.key()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT variant, {columns} FROM {PROFILE_TABLE} WHERE id = ?1"),
                params![id.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        let row = match rows.next().await {
            Ok(Some(row)) => row,
            Ok(None) => return Ok(None),
            Err(e) => return Err(DatabaseError::Query(format!("get_profile: {e}"))),
        };

        let variant: String = row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
        let variant: crate::intake::model::ProfileVariant =
            variant.parse().map_err(DatabaseError::Serialization)?;

        let mut fields = Map::new();
        for (idx, field) in FieldName::ALL.iter().enumerate() {
            if !field.in_variant(variant) {
                continue;
            }
            let raw = row
                .get_value(idx as i32 + 1)
                .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
            fields.insert(field.key().to_string(), from_column(*field, raw)?);
        }
        Ok(Some(fields))
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Convert a record value to the column representation.
fn to_column(value: &Value) -> Result<libsql::Value, DatabaseError> {
    Ok(match value {
        Value::Null => libsql::Value::Null,
        Value::String(s) => libsql::Value::Text(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => libsql::Value::Integer(i),
            None => libsql::Value::Real(n.as_f64().unwrap_or_default()),
        },
        Value::Bool(b) => libsql::Value::Text(if *b { "yes" } else { "no" }.to_string()),
        Value::Array(_) | Value::Object(_) => libsql::Value::Text(
            serde_json::to_string(value)
                .map_err(|e| DatabaseError::Serialization(format!("{e}")))?,
        ),
    })
}

/// Convert a column back into the record value for `field`.
fn from_column(field: FieldName, raw: libsql::Value) -> Result<Value, DatabaseError> {
    Ok(match raw {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::from(i),
        libsql::Value::Real(f) => Value::from(f),
        libsql::Value::Text(s) => match field.kind() {
            FieldKind::StringList | FieldKind::Structured => serde_json::from_str(&s)
                .map_err(|e| DatabaseError::Serialization(format!("{field}: {e}")))?,
            _ => Value::String(s),
        },
        libsql::Value::Blob(_) => {
            return Err(DatabaseError::Serialization(format!(
                "{field}: unexpected blob column"
            )));
        }
    })
}

/// Map an insert failure, separating constraint violations.
fn insert_error(e: libsql::Error) -> DatabaseError {
    let msg = e.to_string();
    if msg.contains("constraint failed") {
        DatabaseError::Constraint(msg)
    } else {
        DatabaseError::Query(format!("insert_profile: {msg}"))
    }
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl ProfileSink for LibSqlBackend {
    async fn insert(&self, record: &ProfileRecord) -> Result<RecordId, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let mut columns = vec![
            "id".to_string(),
            "variant".to_string(),
            "created_at".to_string(),
        ];
        let mut values = vec![
            libsql::Value::Text(id.clone()),
            libsql::Value::Text(record.variant.to_string()),
            libsql::Value::Text(Utc::now().to_rfc3339()),
        ];

        for field in FieldName::for_variant(record.variant) {
            let value = record.get(field).unwrap_or(&Value::Null);
            columns.push(format!("\"{}\"", field.key()));
            values.push(to_column(value)?);
        }

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {PROFILE_TABLE} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );

        self.conn()
            .execute(&sql, libsql::params::Params::Positional(values))
            .await
            .map_err(insert_error)?;

        debug!(id = %id, variant = %record.variant, "Profile inserted into DB");
        Ok(RecordId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::model::ProfileVariant;
    use serde_json::json;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn basic_record(email: &str) -> ProfileRecord {
        let mut fields = Map::new();
        for (key, value) in [
            ("resume_full_name", json!("Ava Chen")),
            ("resume_email", json!(email)),
            ("target_role", json!("Data Analyst")),
            ("target_industry", json!("Fintech")),
            ("target_company_type", json!("Startup")),
            ("target_location", json!("Remote")),
            ("current_role", json!("BI Analyst")),
            ("preferred_hours_per_week", json!(40)),
            ("min_salary_fulltime", json!(0)),
            ("min_salary_partime", json!(null)),
        ] {
            fields.insert(key.to_string(), value);
        }
        ProfileRecord {
            variant: ProfileVariant::Basic,
            fields,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back() {
        let db = test_db().await;
        let record = basic_record("ava@x.com");
        let id = db.insert(&record).await.unwrap();

        let stored = db.get_profile(&id).await.unwrap().unwrap();
        assert_eq!(stored, record.fields);
        assert_eq!(db.count_profiles().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn get_profile_not_found() {
        let db = test_db().await;
        let missing = db.get_profile(&RecordId("nope".into())).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation() {
        let db = test_db().await;
        db.insert(&basic_record("ava@x.com")).await.unwrap();
        let err = db.insert(&basic_record("ava@x.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)), "got {err:?}");
        assert_eq!(db.count_profiles().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn extended_structures_round_trip_as_json() {
        let db = test_db().await;
        let mut record = basic_record("sam@x.com");
        record.variant = ProfileVariant::Extended;
        record
            .fields
            .insert("resume_skills".into(), json!(["SQL", "Python"]));
        record.fields.insert(
            "resume_education".into(),
            json!([{"degree": "BSc", "school": "UBC"}]),
        );
        record
            .fields
            .insert("career_growth_priority".into(), json!("Very important"));

        let id = db.insert(&record).await.unwrap();
        let stored = db.get_profile(&id).await.unwrap().unwrap();
        assert_eq!(stored["resume_skills"], json!(["SQL", "Python"]));
        assert_eq!(stored["resume_education"][0]["school"], "UBC");
        assert_eq!(stored["career_growth_priority"], "Very important");
        assert_eq!(stored["tech_stack_priority"], Value::Null);
        assert_eq!(stored.len(), 27);
    }

    #[tokio::test]
    async fn local_database_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("intake.db");

        let id = {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert(&basic_record("ava@x.com")).await.unwrap()
        };

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        assert!(db.get_profile(&id).await.unwrap().is_some());
    }
}
