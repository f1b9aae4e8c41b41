use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_wearables_table(conn)?;
    create_unparsed_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the wearables table, one row per user
fn create_wearables_table(conn: &Connection) -> Result<(), String> {
    info!("Creating wearables table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wearables (
            user_id TEXT PRIMARY KEY,
            last_event TEXT,
            last_updated TEXT,
            updated_at TEXT,
            steps REAL,
            heart_rate REAL,
            sleep_hours REAL,
            blood_pressure_systolic REAL,
            blood_pressure_diastolic REAL,
            glucose REAL,
            body_temperature REAL,
            calories REAL,
            stress_level REAL,
            workout_duration REAL,
            basal_body_temperature REAL,
            body_mass_index REAL
        )",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the table holding raw payloads of categories without a mapping
fn create_unparsed_table(conn: &Connection) -> Result<(), String> {
    info!("Creating wearable_unparsed table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wearable_unparsed (
            user_id TEXT NOT NULL REFERENCES wearables(user_id),
            category TEXT NOT NULL,
            payload TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, category)
        )",
        [],
    )
    .map_err(|e| format!("Failed to create wearable_unparsed table: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('wearables', 'wearable_unparsed')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }
}
