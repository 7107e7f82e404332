//! Step snapshot queries.

use rusqlite::params;

use crate::{
    error::{PersistenceResultExt, Result},
    models::Step,
};

use super::utils::{mark_snapshot, optional_timestamp_at, timestamp_at};

const STEPS: &str = "steps";

const SELECT_STEPS_SQL: &str = "SELECT id, goal_id, text, created_at, completed_at, rephrased, user_comment FROM steps ORDER BY rowid";
const DELETE_STEPS_SQL: &str = "DELETE FROM steps";
const INSERT_STEP_SQL: &str = "INSERT INTO steps (id, goal_id, text, created_at, completed_at, rephrased, user_comment) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

impl super::Database {
    /// Loads every step, or `None` if the steps snapshot was never written.
    pub fn load_steps(&self) -> Result<Option<Vec<Step>>> {
        if !self.has_snapshot(STEPS)? {
            return Ok(None);
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_STEPS_SQL)
            .persist_context("Failed to prepare query")?;

        let steps = stmt
            .query_map([], |row| {
                Ok(Step {
                    id: row.get(0)?,
                    goal_id: row.get(1)?,
                    text: row.get(2)?,
                    created_at: timestamp_at(row, 3)?,
                    completed_at: optional_timestamp_at(row, 4)?,
                    rephrased: row.get(5)?,
                    user_comment: row.get(6)?,
                })
            })
            .persist_context("Failed to query steps")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .persist_context("Failed to decode steps")?;

        Ok(Some(steps))
    }

    /// Replaces the steps table with `steps` in one transaction.
    pub fn replace_steps(&mut self, steps: &[Step]) -> Result<()> {
        let tx = self
            .connection
            .transaction()
            .persist_context("Failed to begin transaction")?;

        tx.execute(DELETE_STEPS_SQL, [])
            .persist_context("Failed to clear steps")?;
        {
            let mut insert = tx
                .prepare_cached(INSERT_STEP_SQL)
                .persist_context("Failed to prepare step insert")?;
            for step in steps {
                insert
                    .execute(params![
                        step.id,
                        step.goal_id,
                        step.text,
                        step.created_at.to_string(),
                        step.completed_at.map(|t| t.to_string()),
                        step.rephrased,
                        step.user_comment,
                    ])
                    .persist_context("Failed to insert step")?;
            }
        }
        mark_snapshot(&tx, STEPS)?;

        tx.commit().persist_context("Failed to commit transaction")
    }
}
