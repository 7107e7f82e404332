//! User snapshot queries.

use rusqlite::params;

use crate::{
    error::{PersistenceResultExt, Result},
    models::User,
};

use super::utils::{mark_snapshot, timestamp_at};

const USERS: &str = "users";

const SELECT_USERS_SQL: &str =
    "SELECT id, username, display_name, created_at, active_goal_id FROM users ORDER BY rowid";
const DELETE_USERS_SQL: &str = "DELETE FROM users";
const INSERT_USER_SQL: &str = "INSERT INTO users (id, username, display_name, created_at, active_goal_id) VALUES (?1, ?2, ?3, ?4, ?5)";

impl super::Database {
    /// Loads every user, or `None` if the users snapshot was never written.
    pub fn load_users(&self) -> Result<Option<Vec<User>>> {
        if !self.has_snapshot(USERS)? {
            return Ok(None);
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_USERS_SQL)
            .persist_context("Failed to prepare query")?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                    created_at: timestamp_at(row, 3)?,
                    active_goal_id: row.get(4)?,
                })
            })
            .persist_context("Failed to query users")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .persist_context("Failed to decode users")?;

        Ok(Some(users))
    }

    /// Replaces the users table with `users` in one transaction.
    pub fn replace_users(&mut self, users: &[User]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .persist_context("Failed to begin transaction")?;

        tx.execute(DELETE_USERS_SQL, [])
            .persist_context("Failed to clear users")?;
        {
            let mut insert = tx
                .prepare_cached(INSERT_USER_SQL)
                .persist_context("Failed to prepare user insert")?;
            for user in users {
                insert
                    .execute(params![
                        user.id,
                        user.username,
                        user.display_name,
                        user.created_at.to_string(),
                        user.active_goal_id,
                    ])
                    .persist_context("Failed to insert user")?;
            }
        }
        mark_snapshot(&tx, USERS)?;

        tx.commit().persist_context("Failed to commit transaction")
    }
}
