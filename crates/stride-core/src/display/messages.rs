//! Reply texts.
//!
//! Every user-visible sentence the coach produces is defined here so wording
//! stays consistent across flows.

use crate::models::Goal;

pub const HELP: &str = "🤖 **Goal coach**

I help you reach goals one small step at a time.

**Commands:**
/newgoal - create a new goal
/goals - list your goals
/status - progress on the active goal
/step - show the current step
/done - mark the current step as done
/next - get the next step
/rephrase - reword the current step
/simpler - make the current step simpler
/complete - mark the active goal as achieved
/context - show what I know about you for this goal
/switch [n] - list goals, or make goal n active
/delete n - delete goal n and all its steps
/help - show this message";

pub const NO_GOALS: &str = "📝 You have no goals yet.

Create your first goal with /newgoal";
pub const NO_ACTIVE_GOAL: &str = "📝 You have no active goal.

Pick one with /switch or create a new one with /newgoal";
pub const GOAL_ALREADY_COMPLETED: &str = "✅ This goal is already completed!

Create a new goal with /newgoal or pick another one with /switch";
pub const ALL_STEPS_DONE: &str = "✅ Well done! You have finished every step so far.

Use /next to get the next step";
pub const STEP_COMPLETED: &str = "✅ Great! Step done.

Use /next to get the next step";
pub const NEW_GOAL_PROMPT: &str = "🎯 Great! Let's create a new goal.

Describe your goal in detail: what exactly do you want to achieve? I will come up with a title.";
pub const REPHRASE_PROMPT: &str = "🔄 What exactly doesn't work for you in the current step?

For example: \"Too hard\", \"Not clear what to do\", \"I need something simpler\"";
pub const USE_COMMANDS_HINT: &str = "💡 Use commands to talk to me. Send /help for the list";
pub const NO_GOALS_TO_PICK: &str = "📝 You have no goals to pick from.\n\nCreate one with /newgoal";
pub const SWITCH_PROMPT: &str = "🔄 Pick a goal with /switch followed by its number:";
pub const DELETE_PROMPT: &str = "🗑 Delete a goal with /delete followed by its number:";
pub const EMPTY_GOAL_DESCRIPTION: &str = "📝 Please describe your goal in a few words.";
pub const EMPTY_COMMENT: &str = "🔄 Please tell me what doesn't work for you in the current step.";
pub const EMPTY_ANSWER: &str = "🔍 Please answer the question so I can suggest a fitting step.";

pub fn welcome(name: &str) -> String {
    format!("🎯 Hi, {name}!\n\nI will help you reach your goals through simple steps.\n\nWhat would you like to do?")
}

pub fn goal_created(goal: &Goal) -> String {
    format!(
        "🎯 Goal created!\n\n**Title:** {}\n**Description:** {}\n\nUse /next to get the first step",
        goal.title, goal.description
    )
}

pub fn goal_completed(goal: &Goal, reason: &str) -> String {
    let reason = if reason.is_empty() {
        "Every part of the goal is done."
    } else {
        reason
    };
    format!(
        "🎉 **Congratulations! Goal achieved!**\n\n**{}**\n\n{reason}\n\nCreate a new goal with /newgoal",
        goal.title
    )
}

pub fn goal_completed_manually(goal: &Goal) -> String {
    format!(
        "🎉 **Congratulations! Goal achieved!**\n\n**{}**\n\nCreate a new goal with /newgoal",
        goal.title
    )
}

pub fn goal_switched(goal: &Goal) -> String {
    format!("🎯 Active goal is now:\n\n{goal}\n\nUse /step or /next to continue")
}

pub fn goal_deleted(goal: &Goal, steps_removed: usize) -> String {
    let steps = if steps_removed == 1 { "step" } else { "steps" };
    format!(
        "🗑 Deleted **{}** and its {steps_removed} {steps}",
        goal.title
    )
}

pub fn goal_number_out_of_range(count: usize) -> String {
    format!("❌ There is no goal with that number. Pick a number from 1 to {count}.")
}

pub fn current_step(text: &str) -> String {
    format!("📝 **Current step:**\n\n{text}")
}

pub fn unfinished_step(text: &str) -> String {
    format!("⏳ You have an unfinished step:\n\n**{text}**\n\nFinish it with /done first, then ask for the next one.")
}

pub fn first_step(text: &str) -> String {
    format!("📝 **First step:**\n\n{text}")
}

pub fn new_step(text: &str) -> String {
    format!("📝 **New step:**\n\n{text}")
}

pub fn near_completion(text: &str) -> String {
    format!("🎯 **Almost there! Just a little left:**\n\n{text}\n\n💡 After this step the goal may be achieved!")
}

pub fn clarification(question: &str) -> String {
    format!("❓ {question}")
}

pub fn context_question(question: &str) -> String {
    format!("🔍 To help you better I need to know a bit more about you:\n\n**{question}**\n\nAnswer this question and I will suggest fitting steps.")
}

pub fn context_followup(question: &str) -> String {
    format!("🔍 Thanks! One more question:\n\n**{question}**")
}

pub fn step_rephrased(text: &str) -> String {
    format!("🔄 Step reworded:\n\n{text}")
}

pub fn step_simplified(text: &str) -> String {
    format!("🔄 Step simplified:\n\n**{text}**\n\n💡 This step should be much easier now!")
}
