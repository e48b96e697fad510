//! Version-tracked database migrations for the libSQL backend.
//!
//! Each migration has a version number and SQL. `run_migrations()` checks
//! the current version and applies only the new ones sequentially.

use libsql::Connection;

use crate::error::DatabaseError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "candidate_profiles",
        sql: r#"
            CREATE TABLE IF NOT EXISTS candidate_profiles (
                id TEXT PRIMARY KEY,
                variant TEXT NOT NULL,
                resume_full_name TEXT NOT NULL,
                resume_email TEXT NOT NULL UNIQUE,
                target_role TEXT NOT NULL,
                target_industry TEXT NOT NULL,
                target_company_type TEXT NOT NULL,
                target_location TEXT NOT NULL,
                current_role TEXT NOT NULL,
                preferred_hours_per_week INTEGER NOT NULL,
                min_salary_fulltime INTEGER,
                min_salary_partime INTEGER,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_candidate_profiles_created
                ON candidate_profiles(created_at);
        "#,
    },
    Migration {
        version: 2,
        name: "extended_profile_columns",
        sql: r#"
            ALTER TABLE candidate_profiles ADD COLUMN availability_to_start TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN visa_sponsorship_required TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN working_language_pref TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN work_life_balance_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN career_growth_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN tech_stack_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN diversity_inclusion_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN purpose_culture_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN location_flexibility_priority TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN communication_style TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN teamwork_leadership TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN adaptability_creativity TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN personality_type TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN resume_education TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN resume_work_experience TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN resume_skills TEXT;
            ALTER TABLE candidate_profiles ADD COLUMN resume_certifications TEXT;
        "#,
    },
];

/// Run all pending migrations.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to create _migrations table: {e}")))?;

    let current_version = get_current_version(conn).await?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            conn.execute_batch(migration.sql).await.map_err(|e| {
                DatabaseError::Migration(format!(
                    "Migration V{} ({}) failed: {e}",
                    migration.version, migration.name
                ))
            })?;
            seed_version(conn, migration.version, migration.name).await?;
        }
    }

    tracing::info!(
        version = get_current_version(conn).await?,
        "Database migrations complete"
    );
    Ok(())
}

/// Get the highest applied migration version, or 0 if none.
async fn get_current_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to query migration version: {e}")))?;

    let row = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read migration version: {e}")))?;

    match row {
        Some(row) => {
            let version: i64 = row.get(0).map_err(|e| {
                DatabaseError::Migration(format!("Failed to parse migration version: {e}"))
            })?;
            Ok(version)
        }
        None => Ok(0),
    }
}

/// Insert a version record into `_migrations`.
async fn seed_version(conn: &Connection, version: i64, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
        libsql::params![version, name],
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to record migration V{version}: {e}")))?;
    Ok(())
}
