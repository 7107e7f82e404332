//! Prompt templates with `{{{placeholder}}}` substitution.
//!
//! Built-in templates ship with the crate. A prompts directory may override
//! any of them with a file named after the template (`step_generation.md`,
//! `step_rephrase.md`, `context_gathering.md`, `title_generation.md`). A
//! leading `#` heading line is stripped from every template.

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::{LazyLock, Mutex, PoisonError},
};

use log::debug;
use regex::{Captures, Regex};

use super::transport::RequestKind;
use crate::{
    error::{CoachError, Result},
    models::{Goal, Step},
};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\{(\w+)\}\}\}").expect("valid placeholder regex"));

pub const GOAL_TITLE: &str = "goal_title";
pub const GOAL_DESCRIPTION: &str = "goal_description";
pub const USER_CONTEXT: &str = "user_context";
pub const COMPLETED_STEPS: &str = "completed_steps";
pub const CURRENT_STEP: &str = "current_step";
pub const USER_COMMENT: &str = "user_comment";
pub const DESCRIPTION: &str = "description";
pub const EXISTING_CONTEXT: &str = "existing_context";

const NOTHING_YET: &str = "Nothing yet.";

fn builtin(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::StepGeneration => include_str!("../../assets/prompts/step_generation.md"),
        RequestKind::StepRephrase => include_str!("../../assets/prompts/step_rephrase.md"),
        RequestKind::ContextGathering => include_str!("../../assets/prompts/context_gathering.md"),
        RequestKind::TitleGeneration => include_str!("../../assets/prompts/title_generation.md"),
    }
}

/// Drops a leading markdown heading line and surrounding whitespace.
fn strip_heading(content: &str) -> String {
    let content = content.trim_start_matches('\u{feff}');
    let body = match content.split_once('\n') {
        Some((first, rest)) if first.trim_start().starts_with('#') => rest,
        None if content.trim_start().starts_with('#') => "",
        _ => content,
    };
    body.trim().to_string()
}

/// Replaces every `{{{key}}}` in `template`. Unknown keys become empty.
pub fn fill(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Loads, caches and renders prompt templates.
#[derive(Debug, Default)]
pub struct PromptTemplates {
    override_dir: Option<PathBuf>,
    cache: Mutex<HashMap<RequestKind, String>>,
}

impl PromptTemplates {
    /// Built-in templates only.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-in templates, overridden by files in `dir` where present.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
            cache: Mutex::default(),
        }
    }

    /// Template text for `kind`, loaded once per process.
    fn template(&self, kind: RequestKind) -> Result<String> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(&kind) {
            return Ok(cached.clone());
        }

        let raw = match &self.override_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.md", kind.template_name()));
                match fs::read_to_string(&path) {
                    Ok(content) => {
                        debug!("Loaded prompt override {}", path.display());
                        content
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => builtin(kind).to_string(),
                    Err(source) => return Err(CoachError::FileSystem { path, source }),
                }
            }
            None => builtin(kind).to_string(),
        };

        let template = strip_heading(&raw);
        cache.insert(kind, template.clone());
        Ok(template)
    }

    pub fn render(&self, kind: RequestKind, values: &HashMap<&str, String>) -> Result<String> {
        Ok(fill(&self.template(kind)?, values))
    }

    pub fn step_generation(&self, goal: &Goal, completed: &[Step]) -> Result<String> {
        let values = HashMap::from([
            (GOAL_TITLE, goal.title.clone()),
            (GOAL_DESCRIPTION, description_line(&goal.description)),
            (USER_CONTEXT, numbered(goal.context.clarifications.iter())),
            (COMPLETED_STEPS, numbered(completed.iter().map(|s| &s.text))),
        ]);
        self.render(RequestKind::StepGeneration, &values)
    }

    pub fn step_rephrase(&self, goal: &Goal, step: &Step, comment: &str) -> Result<String> {
        let values = HashMap::from([
            (GOAL_TITLE, goal.title.clone()),
            (CURRENT_STEP, step.text.clone()),
            (USER_COMMENT, comment.to_string()),
        ]);
        self.render(RequestKind::StepRephrase, &values)
    }

    pub fn context_gathering(&self, goal: &Goal) -> Result<String> {
        let values = HashMap::from([
            (GOAL_TITLE, goal.title.clone()),
            (GOAL_DESCRIPTION, description_line(&goal.description)),
            (EXISTING_CONTEXT, numbered(goal.context.clarifications.iter())),
        ]);
        self.render(RequestKind::ContextGathering, &values)
    }

    pub fn title_generation(&self, description: &str) -> Result<String> {
        let values = HashMap::from([(DESCRIPTION, description.to_string())]);
        self.render(RequestKind::TitleGeneration, &values)
    }
}

fn description_line(description: &str) -> String {
    if description.is_empty() {
        String::new()
    } else {
        format!("Description: {description}")
    }
}

/// `1. first\n2. second\n`, or a fixed marker for an empty list.
fn numbered<I, S>(items: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let lines: String = items
        .enumerate()
        .map(|(i, item)| format!("{}. {}\n", i + 1, item.as_ref()))
        .collect();
    if lines.is_empty() {
        NOTHING_YET.to_string()
    } else {
        lines
    }
}
