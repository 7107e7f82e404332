//! Display implementations for domain models.

use std::fmt;

use super::datetime::LocalDate;
use crate::models::{Goal, GoalStatus, Step};

impl GoalStatus {
    /// Marker shown next to a goal in lists.
    pub fn icon(&self, is_active: bool) -> &'static str {
        match self {
            GoalStatus::Completed => "✅",
            _ if is_active => "🎯",
            _ => "⏳",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**{}**", self.title)?;
        if !self.description.is_empty() {
            writeln!(f, "{}", self.description)?;
        }
        write!(f, "Started {}", LocalDate(&self.created_at))?;
        if let Some(completed_at) = &self.completed_at {
            write!(f, ", completed {}", LocalDate(completed_at))?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_completed() { "x" } else { " " };
        write!(f, "- [{marker}] {}", self.text)
    }
}
