//! Wrappers for displaying groups of domain objects.

use std::fmt;

use crate::models::{Goal, Step};

/// Numbered goal list with status markers.
///
/// Numbers start at 1 and are the ones `/switch` and `/delete` accept.
pub struct GoalList<'a> {
    pub goals: &'a [Goal],
    pub active_goal_id: Option<&'a str>,
}

impl<'a> GoalList<'a> {
    pub fn new(goals: &'a [Goal], active_goal_id: Option<&'a str>) -> Self {
        Self {
            goals,
            active_goal_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

impl fmt::Display for GoalList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, goal) in self.goals.iter().enumerate() {
            let active = self.active_goal_id == Some(goal.id.as_str());
            writeln!(
                f,
                "{} **{}. {}**",
                goal.status.icon(active),
                i + 1,
                goal.title
            )?;
            if !goal.description.is_empty() {
                writeln!(f, "   {}", goal.description)?;
            }
        }
        Ok(())
    }
}

/// Goal status with a step count and checklist.
pub struct GoalProgress<'a> {
    pub goal: &'a Goal,
    pub steps: &'a [Step],
}

impl<'a> GoalProgress<'a> {
    pub fn new(goal: &'a Goal, steps: &'a [Step]) -> Self {
        Self { goal, steps }
    }

    pub fn completed(&self) -> usize {
        self.steps.iter().filter(|s| s.is_completed()).count()
    }
}

impl fmt::Display for GoalProgress<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🎯 **Active goal:** {}", self.goal.title)?;
        writeln!(f)?;
        if !self.goal.description.is_empty() {
            writeln!(f, "📝 {}", self.goal.description)?;
            writeln!(f)?;
        }
        writeln!(
            f,
            "📊 **Progress:** {}/{} steps completed",
            self.completed(),
            self.steps.len()
        )?;
        writeln!(f)?;
        if !self.steps.is_empty() {
            writeln!(f, "{}", StepChecklist(self.steps))?;
        }
        write!(f, "Use /step to see the current step")
    }
}

/// What has been learned about the user for one goal.
pub struct ContextSummary<'a>(pub &'a Goal);

impl fmt::Display for ContextSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let goal = self.0;
        writeln!(f, "📋 **Context for goal:** {}", goal.title)?;
        writeln!(f)?;
        if goal.context.is_empty() && goal.context.notes.is_none() {
            return write!(f, "Nothing gathered yet. Use /next and I will ask what I need.");
        }
        for (i, entry) in goal.context.clarifications.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, entry)?;
        }
        if let Some(notes) = &goal.context.notes {
            writeln!(f)?;
            write!(f, "📝 {notes}")?;
        }
        Ok(())
    }
}

/// Every step of a goal, oldest first, as a checklist.
pub struct StepChecklist<'a>(pub &'a [Step]);

impl fmt::Display for StepChecklist<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.0 {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_list_markers_and_numbers() {
        let active = Goal::new("u1", "Swim", "Swim 50 meters");
        let mut done = Goal::new("u1", "Read", "");
        done.complete();
        let idle = Goal::new("u1", "Cook", "Cook dinner");
        let goals = vec![active.clone(), done, idle];

        let text = GoalList::new(&goals, Some(&active.id)).to_string();
        assert!(text.contains("🎯 **1. Swim**"));
        assert!(text.contains("   Swim 50 meters"));
        assert!(text.contains("✅ **2. Read**"));
        assert!(text.contains("⏳ **3. Cook**"));
    }

    #[test]
    fn test_progress_counts_completed_steps() {
        let goal = Goal::new("u1", "Swim", "");
        let mut first = Step::new(&goal.id, "a");
        first.complete();
        let steps = vec![first, Step::new(&goal.id, "b"), Step::new(&goal.id, "c")];

        let text = GoalProgress::new(&goal, &steps).to_string();
        assert!(text.contains("1/3 steps completed"));
        assert!(text.contains("- [x] a\n- [ ] b"));
        assert!(!text.contains("📝"));
    }

    #[test]
    fn test_context_summary() {
        let mut goal = Goal::new("u1", "Swim", "");
        assert!(ContextSummary(&goal).to_string().contains("Nothing gathered yet"));

        goal.add_clarification("Level?", "Beginner");
        goal.context.notes = Some("Beginner with pool access".to_string());
        let text = ContextSummary(&goal).to_string();
        assert!(text.contains("1. Q: Level? | A: Beginner"));
        assert!(text.contains("📝 Beginner with pool access"));
    }

    #[test]
    fn test_step_checklist() {
        let mut done = Step::new("g1", "Buy goggles");
        done.complete();
        let steps = vec![done, Step::new("g1", "Swim a length")];
        assert_eq!(
            StepChecklist(&steps).to_string(),
            "- [x] Buy goggles\n- [ ] Swim a length\n"
        );
    }
}
