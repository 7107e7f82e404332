//! Terminal rendering module for rich markdown output
//!
//! This module provides terminal rendering capabilities using termimad
//! for rich markdown display with optional fallback to plain text.

use std::io::{self, Write};

use anyhow::{Context, Result};
use stride_core::Reply;
use termimad::{crossterm::style::Color, MadSkin};

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    /// Create a new terminal renderer
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();

        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to terminal
    pub fn render(&self, markdown: &str) -> Result<()> {
        if self.rich_enabled {
            for line in markdown.lines() {
                self.skin.print_inline(line);
                println!();
            }
        } else {
            println!("{markdown}");
        }
        Ok(())
    }

    /// Render a coach reply with its quick replies underneath
    pub fn render_reply(&self, reply: &Reply) -> Result<()> {
        self.render(&reply.text)?;
        if !reply.quick_replies.is_empty() {
            println!();
            let line = quick_reply_line(reply);
            if self.rich_enabled {
                self.skin.print_inline(&format!("*{line}*"));
                println!();
            } else {
                println!("{line}");
            }
        }
        println!();
        io::stdout().flush().context("Failed to flush stdout")
    }

    /// Show the input prompt
    pub fn prompt(&self) -> Result<()> {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// `[✅ Done]  [🔄 Rephrase]`; typing a label sends its command.
fn quick_reply_line(reply: &Reply) -> String {
    reply
        .quick_replies
        .iter()
        .map(|quick| format!("[{}]", quick.label()))
        .collect::<Vec<_>>()
        .join("  ")
}
