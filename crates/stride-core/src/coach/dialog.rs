//! Interactions in, replies out.
//!
//! [`Coach::handle`] is the conversation state machine. A command is always
//! processed as a command, whatever mode the user is in; free text is
//! interpreted according to the mode. Every error is turned into a short
//! user-facing message here and the conversation state is only changed after
//! an interaction succeeded.

use std::str::FromStr;

use log::{debug, warn};

use super::{Coach, NextStep};
use crate::{
    conversation::{ConversationState, Mode, SCRATCH_GOAL_ID, SCRATCH_QUESTION},
    display::{messages, ContextSummary, GoalList, GoalProgress},
    error::{CoachError, Result},
    models::{Goal, User},
};

/// Commands understood by the coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Goals,
    NewGoal,
    Status,
    Step,
    Done,
    Next,
    Rephrase,
    Simpler,
    Complete,
    Context,
    /// Without a number, lists the goals to pick from
    Switch(Option<usize>),
    /// Without a number, lists the goals to pick from
    Delete(Option<usize>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Goals => "goals",
            Command::NewGoal => "newgoal",
            Command::Status => "status",
            Command::Step => "step",
            Command::Done => "done",
            Command::Next => "next",
            Command::Rephrase => "rephrase",
            Command::Simpler => "simpler",
            Command::Complete => "complete",
            Command::Context => "context",
            Command::Switch(_) => "switch",
            Command::Delete(_) => "delete",
        }
    }
}

impl FromStr for Command {
    type Err = CoachError;

    /// Parses `/name [argument]`. A `@handle` suffix on the name is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let body = s.strip_prefix('/').unwrap_or(s);
        let (name, argument) = match body.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (body, ""),
        };
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        let command = match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "goals" => Command::Goals,
            "newgoal" => Command::NewGoal,
            "status" => Command::Status,
            "step" => Command::Step,
            "done" => Command::Done,
            "next" => Command::Next,
            "rephrase" => Command::Rephrase,
            "simpler" => Command::Simpler,
            "complete" => Command::Complete,
            "context" => Command::Context,
            "switch" => Command::Switch(goal_number(argument)?),
            "delete" => Command::Delete(goal_number(argument)?),
            _ => {
                return Err(CoachError::invalid_input("command")
                    .with_reason(format!("Unknown command: /{name}")))
            }
        };
        Ok(command)
    }
}

fn goal_number(argument: &str) -> Result<Option<usize>> {
    if argument.is_empty() {
        return Ok(None);
    }
    argument.parse::<usize>().map(Some).map_err(|_| {
        CoachError::invalid_input("goal number")
            .with_reason(format!("'{argument}' is not a goal number"))
    })
}

/// Fixed set of quick replies offered under a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickReply {
    Done,
    Rephrase,
    Simpler,
    CompleteGoal,
    MyGoals,
    NewGoal,
}

impl QuickReply {
    const ALL: [QuickReply; 6] = [
        QuickReply::Done,
        QuickReply::Rephrase,
        QuickReply::Simpler,
        QuickReply::CompleteGoal,
        QuickReply::MyGoals,
        QuickReply::NewGoal,
    ];

    /// Quick replies offered with a step.
    pub const STEP: &'static [QuickReply] = &[
        QuickReply::Done,
        QuickReply::Rephrase,
        QuickReply::Simpler,
        QuickReply::CompleteGoal,
    ];

    /// Quick replies offered when there is nothing to work on.
    pub const START: &'static [QuickReply] = &[QuickReply::MyGoals, QuickReply::NewGoal];

    pub fn label(&self) -> &'static str {
        match self {
            QuickReply::Done => "✅ Done",
            QuickReply::Rephrase => "🔄 Rephrase",
            QuickReply::Simpler => "🪶 Simpler",
            QuickReply::CompleteGoal => "🏁 Complete goal",
            QuickReply::MyGoals => "📋 My goals",
            QuickReply::NewGoal => "🎯 New goal",
        }
    }

    /// The command sent when the quick reply is chosen.
    pub fn command(&self) -> Command {
        match self {
            QuickReply::Done => Command::Done,
            QuickReply::Rephrase => Command::Rephrase,
            QuickReply::Simpler => Command::Simpler,
            QuickReply::CompleteGoal => Command::Complete,
            QuickReply::MyGoals => Command::Goals,
            QuickReply::NewGoal => Command::NewGoal,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|quick| quick.label() == label)
    }
}

/// A command or a piece of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Text(String),
}

impl Input {
    /// Text starting with `/` is a command; a quick reply label stands for
    /// its command; everything else is free text.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for unknown commands and malformed goal numbers.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.starts_with('/') {
            return text.parse().map(Input::Command);
        }
        if let Some(quick) = QuickReply::from_label(text) {
            return Ok(Input::Command(quick.command()));
        }
        Ok(Input::Text(text.to_string()))
    }
}

/// One normalized inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub user_id: String,
    pub display_name: String,
    pub username: Option<String>,
    pub input: Input,
}

impl Interaction {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, input: Input) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            username: None,
            input,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }
}

/// Markdown text plus the quick replies to offer with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_quick_replies(mut self, quick_replies: &[QuickReply]) -> Self {
        self.quick_replies = quick_replies.to_vec();
        self
    }
}

impl Coach {
    /// Handles one interaction and returns the reply to show.
    ///
    /// Never fails: errors are logged and answered with a short message,
    /// leaving the user's conversation state untouched.
    pub async fn handle(&self, interaction: Interaction) -> Reply {
        let user_id = interaction.user_id.clone();
        match self.dispatch(interaction).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Interaction from user {user_id} failed: {e}");
                Reply::text(e.user_message())
            }
        }
    }

    async fn dispatch(&self, interaction: Interaction) -> Result<Reply> {
        let Interaction {
            user_id,
            display_name,
            username,
            input,
        } = interaction;

        let user = self
            .ensure_user(&user_id, &display_name, username.as_deref())
            .await?;

        match input {
            Input::Command(command) => {
                debug!("User {user_id} sent /{}", command.name());
                self.run_command(&user, command).await
            }
            Input::Text(text) => {
                let state = self.conversations.get(&user_id);
                debug!("User {user_id} sent text in mode {}", state.mode.as_str());
                self.handle_text(&user, state, &text).await
            }
        }
    }

    async fn run_command(&self, user: &User, command: Command) -> Result<Reply> {
        let user_id = user.id.as_str();
        match command {
            Command::Start => {
                self.conversations.reset(user_id);
                Ok(Reply::text(messages::welcome(&user.display_name))
                    .with_quick_replies(QuickReply::START))
            }
            Command::Help => Ok(Reply::text(messages::HELP)),
            Command::Goals => self.goals_reply(user, None).await,
            Command::NewGoal => {
                self.conversations
                    .set(user_id, ConversationState::in_mode(Mode::AwaitingGoalDescription));
                Ok(Reply::text(messages::NEW_GOAL_PROMPT))
            }
            Command::Status => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                let (goal, steps) = self.goal_progress(&goal.id).await?;
                Ok(Reply::text(GoalProgress::new(&goal, &steps).to_string()))
            }
            Command::Step => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                if goal.is_completed() {
                    return Ok(goal_already_completed());
                }
                match self.current_step(&goal.id).await {
                    Ok(step) => Ok(Reply::text(messages::current_step(&step.text))
                        .with_quick_replies(QuickReply::STEP)),
                    Err(CoachError::NoCurrentStep { .. }) => {
                        Ok(Reply::text(messages::ALL_STEPS_DONE))
                    }
                    Err(e) => Err(e),
                }
            }
            Command::Done => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                match self.complete_step(&goal.id).await {
                    Ok(_) => Ok(Reply::text(messages::STEP_COMPLETED)),
                    Err(CoachError::NoCurrentStep { .. }) => {
                        Ok(Reply::text(messages::ALL_STEPS_DONE))
                    }
                    Err(e) => Err(e),
                }
            }
            Command::Next => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                let next = self.next_step(user_id, &goal.id).await?;
                Ok(self.next_step_reply(user_id, next, false))
            }
            Command::Rephrase => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                if goal.is_completed() {
                    return Ok(goal_already_completed());
                }
                self.current_step(&goal.id).await?;

                let mut state = ConversationState::in_mode(Mode::AwaitingRephraseComment);
                state
                    .scratch
                    .insert(SCRATCH_GOAL_ID.to_string(), goal.id.clone());
                self.conversations.set(user_id, state);
                Ok(Reply::text(messages::REPHRASE_PROMPT))
            }
            Command::Simpler => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                if goal.is_completed() {
                    return Ok(goal_already_completed());
                }
                let step = self.simplify_step(&goal.id).await?;
                Ok(Reply::text(messages::step_simplified(&step.text))
                    .with_quick_replies(QuickReply::STEP))
            }
            Command::Complete => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                let goal = self.complete_goal(user_id, &goal.id).await?;
                Ok(Reply::text(messages::goal_completed_manually(&goal))
                    .with_quick_replies(QuickReply::START))
            }
            Command::Context => {
                let Some(goal) = self.active_goal(user_id).await? else {
                    return Ok(no_active_goal());
                };
                Ok(Reply::text(ContextSummary(&goal).to_string()))
            }
            Command::Switch(None) => self.goals_reply(user, Some(messages::SWITCH_PROMPT)).await,
            Command::Switch(Some(number)) => {
                let goals = self.list_goals(user_id).await?;
                let Some(goal) = pick(&goals, number) else {
                    return Ok(Reply::text(messages::goal_number_out_of_range(goals.len())));
                };
                if goal.is_completed() {
                    return Ok(goal_already_completed());
                }
                let goal = self.switch_goal(user_id, &goal.id).await?;
                Ok(Reply::text(messages::goal_switched(&goal)))
            }
            Command::Delete(None) => self.goals_reply(user, Some(messages::DELETE_PROMPT)).await,
            Command::Delete(Some(number)) => {
                let goals = self.list_goals(user_id).await?;
                let Some(goal) = pick(&goals, number) else {
                    return Ok(Reply::text(messages::goal_number_out_of_range(goals.len())));
                };
                let (goal, removed) = self.delete_goal(user_id, &goal.id).await?;
                Ok(Reply::text(messages::goal_deleted(&goal, removed)))
            }
        }
    }

    async fn handle_text(
        &self,
        user: &User,
        state: ConversationState,
        text: &str,
    ) -> Result<Reply> {
        let user_id = user.id.as_str();
        match state.mode {
            Mode::Idle => Ok(Reply::text(messages::USE_COMMANDS_HINT)),
            Mode::AwaitingGoalDescription => {
                if text.is_empty() {
                    return Ok(Reply::text(messages::EMPTY_GOAL_DESCRIPTION));
                }
                let goal = self.create_goal(user_id, text).await?;
                self.conversations.reset(user_id);
                Ok(Reply::text(messages::goal_created(&goal)))
            }
            Mode::AwaitingRephraseComment => {
                if text.is_empty() {
                    return Ok(Reply::text(messages::EMPTY_COMMENT));
                }
                let goal_id = match state.scratch(SCRATCH_GOAL_ID) {
                    Some(goal_id) => goal_id.to_string(),
                    None => match self.active_goal(user_id).await? {
                        Some(goal) => goal.id,
                        None => {
                            self.conversations.reset(user_id);
                            return Ok(no_active_goal());
                        }
                    },
                };
                let step = self.rephrase_step(&goal_id, text).await?;
                self.conversations.reset(user_id);
                Ok(Reply::text(messages::step_rephrased(&step.text))
                    .with_quick_replies(QuickReply::STEP))
            }
            Mode::AwaitingContextAnswer => {
                if text.is_empty() {
                    return Ok(Reply::text(messages::EMPTY_ANSWER));
                }
                let (Some(goal_id), Some(question)) =
                    (state.scratch(SCRATCH_GOAL_ID), state.scratch(SCRATCH_QUESTION))
                else {
                    self.conversations.reset(user_id);
                    return Ok(Reply::text(messages::USE_COMMANDS_HINT));
                };
                let next = self.answer_context(user_id, goal_id, question, text).await?;
                Ok(self.next_step_reply(user_id, next, true))
            }
        }
    }

    /// Renders a next-step result and moves the conversation on.
    ///
    /// A context question puts the user into awaiting-context-answer; any
    /// other result ends the context sub-flow.
    fn next_step_reply(&self, user_id: &str, next: NextStep, followup: bool) -> Reply {
        if let NextStep::NeedContext { goal_id, question } = &next {
            self.conversations
                .set(user_id, ConversationState::awaiting_context(goal_id, question));
            let text = if followup {
                messages::context_followup(question)
            } else {
                messages::context_question(question)
            };
            return Reply::text(text);
        }

        if followup {
            self.conversations.reset(user_id);
        }

        match next {
            NextStep::GoalAlreadyCompleted => goal_already_completed(),
            NextStep::Unfinished(step) => Reply::text(messages::unfinished_step(&step.text))
                .with_quick_replies(QuickReply::STEP),
            NextStep::NeedClarification(question) => {
                Reply::text(messages::clarification(&question))
            }
            NextStep::Issued {
                step,
                first,
                near_completion,
            } => {
                let text = if near_completion {
                    messages::near_completion(&step.text)
                } else if first {
                    messages::first_step(&step.text)
                } else {
                    messages::new_step(&step.text)
                };
                Reply::text(text).with_quick_replies(QuickReply::STEP)
            }
            NextStep::GoalCompleted { goal, reason } => {
                Reply::text(messages::goal_completed(&goal, &reason))
                    .with_quick_replies(QuickReply::START)
            }
            NextStep::NeedContext { .. } => Reply::default(),
        }
    }

    async fn goals_reply(&self, user: &User, prompt: Option<&str>) -> Result<Reply> {
        let goals = self.list_goals(&user.id).await?;
        if goals.is_empty() {
            let text = if prompt.is_some() {
                messages::NO_GOALS_TO_PICK
            } else {
                messages::NO_GOALS
            };
            return Ok(Reply::text(text).with_quick_replies(&[QuickReply::NewGoal]));
        }

        let list = GoalList::new(&goals, user.active_goal_id.as_deref());
        let text = match prompt {
            Some(prompt) => format!("{prompt}\n\n{list}"),
            None => format!("📋 **Your goals:**\n\n{list}"),
        };
        Ok(Reply::text(text.trim_end()))
    }
}

/// Goal number `number`, counting from 1.
fn pick(goals: &[Goal], number: usize) -> Option<&Goal> {
    number.checked_sub(1).and_then(|index| goals.get(index))
}

fn no_active_goal() -> Reply {
    Reply::text(messages::NO_ACTIVE_GOAL).with_quick_replies(QuickReply::START)
}

fn goal_already_completed() -> Reply {
    Reply::text(messages::GOAL_ALREADY_COMPLETED).with_quick_replies(QuickReply::START)
}
