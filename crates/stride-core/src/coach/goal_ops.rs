//! User registration and goal lifecycle operations for the Coach.

use log::info;

use super::Coach;
use crate::{
    error::{CoachError, Result},
    models::{Goal, Step, User},
};

impl Coach {
    /// Returns the user, registering them on first contact.
    pub async fn ensure_user(
        &self,
        user_id: &str,
        display_name: &str,
        username: Option<&str>,
    ) -> Result<User> {
        let user_id = user_id.to_string();
        let display_name = display_name.to_string();
        let username = username.map(str::to_string);

        self.with_store(move |store| match store.get_user(&user_id) {
            Ok(user) => Ok(user),
            Err(CoachError::NotFound { .. }) => {
                let user = User::new(user_id, display_name).with_username(username);
                store.create_user(user.clone())?;
                info!("Registered user {}", user.id);
                Ok(user)
            }
            Err(e) => Err(e),
        })
        .await
    }

    /// Creates a goal from a free-text description and makes it active.
    ///
    /// The title comes from the generation service. Nothing is stored when
    /// that call fails.
    pub async fn create_goal(&self, user_id: &str, description: &str) -> Result<Goal> {
        let description = description.trim();
        if description.is_empty() {
            return Err(CoachError::invalid_input("description")
                .with_reason("Goal description cannot be empty"));
        }

        let title = self.gateway.derive_title(description).await?;
        let goal = Goal::new(user_id, title, description);
        let user_id = user_id.to_string();

        self.with_store(move |store| {
            let mut user = store.get_user(&user_id)?;
            store.create_goal(goal.clone())?;
            user.active_goal_id = Some(goal.id.clone());
            store.update_user(user)?;
            info!("Created goal {} ({}) for user {user_id}", goal.id, goal.title);
            Ok(goal)
        })
        .await
    }

    /// Goals of the user in creation order.
    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let user_id = user_id.to_string();
        self.with_store(move |store| Ok(store.list_goals_for_user(&user_id)))
            .await
    }

    /// The user's active goal, if any.
    ///
    /// An active goal reference that no longer resolves is treated as none.
    pub async fn active_goal(&self, user_id: &str) -> Result<Option<Goal>> {
        let user_id = user_id.to_string();
        self.with_store(move |store| {
            let user = store.get_user(&user_id)?;
            let Some(goal_id) = user.active_goal_id else {
                return Ok(None);
            };
            match store.get_goal(&goal_id) {
                Ok(goal) => Ok(Some(goal)),
                Err(CoachError::NotFound { .. }) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// A goal together with all of its steps, oldest first.
    pub async fn goal_progress(&self, goal_id: &str) -> Result<(Goal, Vec<Step>)> {
        let goal_id = goal_id.to_string();
        self.with_store(move |store| {
            let goal = store.get_goal(&goal_id)?;
            let steps = store.list_steps_for_goal(&goal_id);
            Ok((goal, steps))
        })
        .await
    }

    /// Makes `goal_id` the user's active goal.
    ///
    /// # Errors
    ///
    /// `NotFound` when the goal does not exist or belongs to someone else,
    /// `InvalidInput` when it is already completed.
    pub async fn switch_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let user_id = user_id.to_string();
        let goal_id = goal_id.to_string();

        self.with_store(move |store| {
            let goal = owned_goal(store.get_goal(&goal_id)?, &user_id)?;
            if goal.is_completed() {
                return Err(CoachError::invalid_input("goal")
                    .with_reason("A completed goal cannot be made active"));
            }
            let mut user = store.get_user(&user_id)?;
            user.active_goal_id = Some(goal.id.clone());
            store.update_user(user)?;
            Ok(goal)
        })
        .await
    }

    /// Completes a goal and clears it as the user's active goal.
    ///
    /// Used both for manual completion and when the generation service
    /// reports the goal as reached. Completing an already completed goal
    /// keeps its original completion time.
    pub async fn complete_goal(&self, user_id: &str, goal_id: &str) -> Result<Goal> {
        let user_id = user_id.to_string();
        let goal_id = goal_id.to_string();

        self.with_store(move |store| {
            let mut goal = owned_goal(store.get_goal(&goal_id)?, &user_id)?;
            if !goal.is_completed() {
                goal.complete();
                goal = store.update_goal(goal)?;
                info!("Completed goal {} for user {user_id}", goal.id);
            }

            let mut user = store.get_user(&user_id)?;
            if user.is_active_goal(&goal.id) {
                user.active_goal_id = None;
                store.update_user(user)?;
            }
            Ok(goal)
        })
        .await
    }

    /// Deletes a goal with all of its steps.
    ///
    /// Returns the deleted goal and how many steps went with it. Clears the
    /// user's active goal if it pointed at the deleted one.
    pub async fn delete_goal(&self, user_id: &str, goal_id: &str) -> Result<(Goal, usize)> {
        let user_id = user_id.to_string();
        let goal_id = goal_id.to_string();

        self.with_store(move |store| {
            owned_goal(store.get_goal(&goal_id)?, &user_id)?;
            let (goal, removed) = store.delete_goal(&goal_id)?;

            let mut user = store.get_user(&user_id)?;
            if user.is_active_goal(&goal.id) {
                user.active_goal_id = None;
                store.update_user(user)?;
            }
            Ok((goal, removed))
        })
        .await
    }
}

/// Goals of other users are reported as missing.
fn owned_goal(goal: Goal, user_id: &str) -> Result<Goal> {
    if goal.user_id == user_id {
        Ok(goal)
    } else {
        Err(CoachError::goal_not_found(goal.id))
    }
}
