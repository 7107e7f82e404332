//! Step operations for the Coach: the next-step policy, completion,
//! rephrasing and context gathering.

use log::{debug, info};

use super::Coach;
use crate::{
    error::{CoachError, Result},
    gateway::{ContextOutcome, StepOutcome, SIMPLIFY_INSTRUCTION},
    models::{current_step, Goal, Step},
};

/// What asking for the next step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    /// The goal is completed; no steps can be requested against it
    GoalAlreadyCompleted,
    /// An incomplete step exists and must be finished first
    Unfinished(Step),
    /// More must be known about the user before the first step
    NeedContext { goal_id: String, question: String },
    /// The service asked a question instead of suggesting a step
    NeedClarification(String),
    /// A new step was stored
    Issued {
        step: Step,
        /// No step of the goal had been completed before this one
        first: bool,
        /// The service expects this to be the last step
        near_completion: bool,
    },
    /// The service judged the goal reached; it is now completed
    GoalCompleted { goal: Goal, reason: String },
}

impl Coach {
    /// Applies the next-step policy to `goal_id`.
    ///
    /// 1. A completed goal is rejected.
    /// 2. An incomplete step is returned as unfinished.
    /// 3. With no completed steps and no gathered context, context is
    ///    gathered first and may stop with a question.
    /// 4. Otherwise a step is generated from the completed steps.
    pub async fn next_step(&self, user_id: &str, goal_id: &str) -> Result<NextStep> {
        let (goal, steps) = self.goal_progress(goal_id).await?;
        if goal.is_completed() {
            return Ok(NextStep::GoalAlreadyCompleted);
        }
        if let Some(step) = current_step(&steps) {
            return Ok(NextStep::Unfinished(step.clone()));
        }

        let completed: Vec<Step> = steps.into_iter().filter(Step::is_completed).collect();
        if completed.is_empty() && goal.context.is_empty() {
            debug!("Goal {goal_id} has no context yet, gathering it first");
            match self.gateway.gather_context(&goal).await? {
                ContextOutcome::NeedContext(question) => {
                    return Ok(NextStep::NeedContext {
                        goal_id: goal.id,
                        question,
                    });
                }
                ContextOutcome::Ready { summary } => {
                    let goal = self.store_context_notes(goal, summary).await?;
                    return self.generate_step(user_id, goal, completed).await;
                }
            }
        }

        self.generate_step(user_id, goal, completed).await
    }

    /// Records the answer to a context question and gathers context again.
    ///
    /// The answer is stored before the service is asked, so it survives a
    /// failed call. A completed goal is left untouched. When the service is
    /// satisfied, the first step is generated right away.
    pub async fn answer_context(
        &self,
        user_id: &str,
        goal_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<NextStep> {
        let goal_id = goal_id.to_string();
        let question = question.to_string();
        let answer = answer.to_string();

        let goal = self
            .with_store(move |store| {
                let mut goal = store.get_goal(&goal_id)?;
                if goal.is_completed() {
                    return Ok(goal);
                }
                goal.add_clarification(&question, &answer);
                store.update_goal(goal)
            })
            .await?;

        if goal.is_completed() {
            return Ok(NextStep::GoalAlreadyCompleted);
        }

        match self.gateway.gather_context(&goal).await? {
            ContextOutcome::NeedContext(question) => Ok(NextStep::NeedContext {
                goal_id: goal.id,
                question,
            }),
            ContextOutcome::Ready { summary } => {
                let goal = self.store_context_notes(goal, summary).await?;
                self.generate_step(user_id, goal, Vec::new()).await
            }
        }
    }

    /// The oldest incomplete step of `goal_id`.
    pub async fn current_step(&self, goal_id: &str) -> Result<Step> {
        let goal_id = goal_id.to_string();
        self.with_store(move |store| store.current_step(&goal_id)).await
    }

    /// Marks the current step of `goal_id` complete.
    pub async fn complete_step(&self, goal_id: &str) -> Result<Step> {
        let goal_id = goal_id.to_string();
        let step = self
            .with_store(move |store| store.complete_current_step(&goal_id))
            .await?;
        info!("Completed step {} of goal {}", step.id, step.goal_id);
        Ok(step)
    }

    /// Rewords the current step of `goal_id` according to `comment`.
    pub async fn rephrase_step(&self, goal_id: &str, comment: &str) -> Result<Step> {
        let (goal, steps) = self.goal_progress(goal_id).await?;
        let mut step = current_step(&steps)
            .cloned()
            .ok_or_else(|| CoachError::NoCurrentStep {
                goal_id: goal.id.clone(),
            })?;

        let text = self.gateway.rephrase_step(&goal, &step, comment).await?;
        step.rephrase(text, comment);

        let stored = step.clone();
        self.with_store(move |store| store.update_step(stored)).await?;
        info!("Rephrased step {} of goal {}", step.id, goal.id);
        Ok(step)
    }

    /// Rephrases the current step into the simplest possible task.
    pub async fn simplify_step(&self, goal_id: &str) -> Result<Step> {
        self.rephrase_step(goal_id, SIMPLIFY_INSTRUCTION).await
    }

    async fn generate_step(
        &self,
        user_id: &str,
        goal: Goal,
        completed: Vec<Step>,
    ) -> Result<NextStep> {
        let outcome = self.gateway.generate_step(&goal, &completed).await?;
        let (text, near_completion) = match outcome {
            StepOutcome::NeedClarification(question) => {
                return Ok(NextStep::NeedClarification(question));
            }
            StepOutcome::GoalCompleted(reason) => {
                let goal = self.complete_goal(user_id, &goal.id).await?;
                return Ok(NextStep::GoalCompleted { goal, reason });
            }
            StepOutcome::Step(text) => (text, false),
            StepOutcome::NearCompletion(text) => (text, true),
        };

        let step = Step::new(&goal.id, text);
        let stored = step.clone();
        self.with_store(move |store| store.create_step(stored)).await?;
        info!("Issued step {} for goal {}", step.id, goal.id);

        Ok(NextStep::Issued {
            step,
            first: completed.is_empty(),
            near_completion,
        })
    }

    /// Keeps the service's context summary on the goal, when it gave one.
    async fn store_context_notes(&self, goal: Goal, summary: Option<String>) -> Result<Goal> {
        let Some(summary) = summary else {
            return Ok(goal);
        };
        self.with_store(move |store| {
            let mut goal = goal;
            goal.context.notes = Some(summary);
            store.update_goal(goal)
        })
        .await
    }
}
