#[cfg(test)]
mod model_tests {
    use jiff::{SignedDuration, Timestamp};

    use crate::models::{current_step, Goal, GoalStatus, Step, User};

    fn create_test_step(goal_id: &str, text: &str, created_second: i64) -> Step {
        let mut step = Step::new(goal_id, text);
        step.created_at = Timestamp::from_second(created_second).unwrap();
        step
    }

    #[test]
    fn test_new_goal_is_active_with_empty_context() {
        let goal = Goal::new("u1", "Learn to swim", "Swim 50 meters");
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(goal.completed_at.is_none());
        assert!(goal.context.is_empty());
        assert_eq!(goal.created_at, goal.updated_at);
        assert!(!goal.id.is_empty());
    }

    #[test]
    fn test_goal_ids_are_unique() {
        let a = Goal::new("u1", "A", "a");
        let b = Goal::new("u1", "B", "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_complete_sets_status_and_timestamps_together() {
        let mut goal = Goal::new("u1", "Read a book", "Finish one novel");
        goal.complete();
        assert_eq!(goal.status, GoalStatus::Completed);
        assert_eq!(goal.completed_at, Some(goal.updated_at));
        assert!(goal.is_completed());
    }

    #[test]
    fn test_add_clarification_appends_in_order() {
        let mut goal = Goal::new("u1", "Run 5k", "Run 5k in under 30 minutes");
        let before = goal.updated_at;
        goal.add_clarification("How often do you run?", " Twice a week ");
        goal.add_clarification("Any injuries?", "No");

        assert_eq!(goal.context.len(), 2);
        assert_eq!(
            goal.context.clarifications[0],
            "Q: How often do you run? | A: Twice a week"
        );
        assert_eq!(goal.context.clarifications[1], "Q: Any injuries? | A: No");
        assert!(goal.updated_at >= before);
    }

    #[test]
    fn test_step_complete_and_rephrase() {
        let mut step = Step::new("g1", "Buy running shoes");
        assert!(!step.is_completed());
        assert!(!step.rephrased);

        step.rephrase("Look up running shoe shops", "Too expensive");
        assert!(step.rephrased);
        assert_eq!(step.text, "Look up running shoe shops");
        assert_eq!(step.user_comment.as_deref(), Some("Too expensive"));

        step.complete();
        assert!(step.is_completed());
    }

    #[test]
    fn test_current_step_is_oldest_incomplete() {
        let mut first = create_test_step("g1", "first", 1_640_995_200);
        let second = create_test_step("g1", "second", 1_640_995_300);
        let third = create_test_step("g1", "third", 1_640_995_400);
        first.complete();

        // Order of the input slice must not matter.
        let steps = vec![third.clone(), first, second.clone()];
        let current = current_step(&steps).expect("current step exists");
        assert_eq!(current.id, second.id);
    }

    #[test]
    fn test_current_step_none_when_all_done_or_empty() {
        let mut only = Step::new("g1", "only");
        only.complete();
        assert!(current_step(&[only]).is_none());
        assert!(current_step(&Vec::<Step>::new()).is_none());
    }

    #[test]
    fn test_current_step_tie_breaks_by_id() {
        let created = Timestamp::from_second(1_640_995_200).unwrap();
        let mut a = Step::new("g1", "a");
        let mut b = Step::new("g1", "b");
        a.created_at = created;
        b.created_at = created;
        let expected = if a.id < b.id { a.id.clone() } else { b.id.clone() };

        let steps = [a, b];
        assert_eq!(current_step(&steps).unwrap().id, expected);
    }

    #[test]
    fn test_user_active_goal_and_username() {
        let mut user = User::new("42", "Ann").with_username(Some(String::new()));
        assert!(user.username.is_none());
        assert!(!user.is_active_goal("g1"));
        user.active_goal_id = Some("g1".to_string());
        assert!(user.is_active_goal("g1"));
    }

    #[test]
    fn test_goal_serde_round_trip_keeps_every_field() {
        let mut goal = Goal::new("u1", "Learn Rust", "Write a CLI");
        goal.add_clarification("Experience?", "Some Python");
        goal.context.notes = Some("prefers evenings".to_string());
        goal.complete();
        goal.updated_at = goal
            .updated_at
            .checked_add(SignedDuration::from_secs(5))
            .unwrap();

        let json = serde_json::to_string(&goal).unwrap();
        assert!(json.contains("\"status\":\"completed\""));
        let back: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, goal);
    }

    #[test]
    fn test_goal_status_from_str() {
        assert_eq!("Active".parse::<GoalStatus>(), Ok(GoalStatus::Active));
        assert_eq!("completed".parse::<GoalStatus>(), Ok(GoalStatus::Completed));
        assert_eq!("abandoned".parse::<GoalStatus>(), Ok(GoalStatus::Abandoned));
        assert!("inactive".parse::<GoalStatus>().is_err());
        assert_eq!(GoalStatus::Completed.as_str(), "completed");
    }
}
