//! Database connection pool

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
}

/// Split a migration script into statements, keeping semicolons inside
/// $$-quoted blocks (DO blocks, PL/pgSQL bodies) together.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_dollar_block = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if c == '$' && chars.peek() == Some(&'$') {
            current.push(chars.next().unwrap());
            in_dollar_block = !in_dollar_block;
        } else if c == ';' && !in_dollar_block {
            if has_sql_content(&current) {
                statements.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if has_sql_content(&current) {
        statements.push(current);
    }

    statements
}

/// True when the fragment holds something other than whitespace and
/// `--` comments.
fn has_sql_content(s: &str) -> bool {
    s.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with("--")
    })
}

/// Apply the embedded schema. Statements are idempotent (IF NOT EXISTS /
/// exception-guarded), so re-running on startup is safe.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migration_sql = include_str!("migrations/001_initial.sql");

    for statement in split_sql_statements(migration_sql) {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Migration statement may have failed (possibly already applied): {}",
                    e
                );
                e
            })
            .ok();
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_statements() {
        let stmts = split_sql_statements("CREATE TABLE a (id int);\nCREATE TABLE b (id int);");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn keeps_dollar_blocks_together() {
        let sql = "DO $$ BEGIN CREATE TYPE t AS ENUM ('a'); EXCEPTION WHEN duplicate_object THEN null; END $$;\nSELECT 1;";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("duplicate_object"));
    }

    #[test]
    fn drops_comment_only_fragments() {
        let stmts = split_sql_statements("-- header comment\n;\nSELECT 1;");
        assert_eq!(stmts.len(), 1);
    }
}
