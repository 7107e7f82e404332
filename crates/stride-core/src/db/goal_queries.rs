//! Goal snapshot queries.

use rusqlite::{params, types::Type};

use crate::{
    error::{PersistenceResultExt, Result},
    models::{Goal, GoalContext, GoalStatus},
};

use super::utils::{mark_snapshot, optional_timestamp_at, timestamp_at};

const GOALS: &str = "goals";

const SELECT_GOALS_SQL: &str = "SELECT id, user_id, title, description, status, created_at, updated_at, completed_at, clarifications, notes FROM goals ORDER BY rowid";
const DELETE_GOALS_SQL: &str = "DELETE FROM goals";
const INSERT_GOAL_SQL: &str = "INSERT INTO goals (id, user_id, title, description, status, created_at, updated_at, completed_at, clarifications, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

impl super::Database {
    /// Helper function to construct a Goal from a database row
    fn build_goal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
        let status_str: String = row.get(4)?;
        let status = status_str.parse::<GoalStatus>().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("Invalid status: {status_str}").into(),
            )
        })?;

        let clarifications_json: String = row.get(8)?;
        let clarifications: Vec<String> = serde_json::from_str(&clarifications_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

        Ok(Goal {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status,
            created_at: timestamp_at(row, 5)?,
            updated_at: timestamp_at(row, 6)?,
            completed_at: optional_timestamp_at(row, 7)?,
            context: GoalContext {
                clarifications,
                notes: row.get(9)?,
            },
        })
    }

    /// Loads every goal, or `None` if the goals snapshot was never written.
    pub fn load_goals(&self) -> Result<Option<Vec<Goal>>> {
        if !self.has_snapshot(GOALS)? {
            return Ok(None);
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_GOALS_SQL)
            .persist_context("Failed to prepare query")?;

        let goals = stmt
            .query_map([], Self::build_goal_from_row)
            .persist_context("Failed to query goals")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .persist_context("Failed to decode goals")?;

        Ok(Some(goals))
    }

    /// Replaces the goals table with `goals` in one transaction.
    pub fn replace_goals(&mut self, goals: &[Goal]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .persist_context("Failed to begin transaction")?;

        tx.execute(DELETE_GOALS_SQL, [])
            .persist_context("Failed to clear goals")?;
        {
            let mut insert = tx
                .prepare_cached(INSERT_GOAL_SQL)
                .persist_context("Failed to prepare goal insert")?;
            for goal in goals {
                let clarifications = serde_json::to_string(&goal.context.clarifications)?;
                insert
                    .execute(params![
                        goal.id,
                        goal.user_id,
                        goal.title,
                        goal.description,
                        goal.status.as_str(),
                        goal.created_at.to_string(),
                        goal.updated_at.to_string(),
                        goal.completed_at.map(|t| t.to_string()),
                        clarifications,
                        goal.context.notes,
                    ])
                    .persist_context("Failed to insert goal")?;
            }
        }
        mark_snapshot(&tx, GOALS)?;

        tx.commit().persist_context("Failed to commit transaction")
    }
}
