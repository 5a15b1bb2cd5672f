//! User interaction primitives.
//!
//! Exactly three prompt shapes exist: yes/no confirmation, pick-one-of-a-list
//! and free text. [ConsolePrompter] talks to a human over stdin/stdout;
//! [ScriptedPrompter] replays pre-seeded answers keyed by the exact prompt
//! message, which keeps orchestrator tests deterministic.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

use crate::error::{ReleaserError, Result};

/// Abstract prompt surface. Every call blocks until an answer is available;
/// there is no timeout.
pub trait Prompter {
    /// Yes/no question. `false` is the conservative default.
    fn confirm(&mut self, message: &str) -> Result<bool>;

    /// Pick exactly one of `choices`; returns the chosen string.
    fn choose_one(&mut self, message: &str, choices: &[&str]) -> Result<String>;

    /// Free-text question with an optional default.
    fn ask(&mut self, message: &str, default: Option<&str>) -> Result<String>;
}

/// Interactive prompter over stdin/stdout.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    pub fn new() -> Self {
        ConsolePrompter
    }

    fn read_line(&self) -> Result<String> {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        print!("\n{} (y/N): ", message);
        io::stdout().flush()?;

        let response = self.read_line()?.to_lowercase();
        Ok(response == "y" || response == "yes")
    }

    fn choose_one(&mut self, message: &str, choices: &[&str]) -> Result<String> {
        println!("\n{}", message);
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}. {}", i + 1, choice);
        }

        print!("Select an option (1-{}): ", choices.len());
        io::stdout().flush()?;

        let selection = self.read_line()?.parse::<usize>().unwrap_or(0);
        if selection > 0 && selection <= choices.len() {
            Ok(choices[selection - 1].to_string())
        } else {
            Err(ReleaserError::config("Invalid selection"))
        }
    }

    fn ask(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(d) => print!("\n{} [{}]: ", message, d),
            None => print!("\n{}: ", message),
        }
        io::stdout().flush()?;

        let response = self.read_line()?;
        if response.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(response)
        }
    }
}

/// Replayable prompter for tests.
///
/// Responses are keyed by the exact prompt message and consumed exactly
/// once, in seeding order per message. [ScriptedPrompter::finish] asserts
/// nothing was left unconsumed, which surfaces dead or unreachable prompts.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    responses: HashMap<String, VecDeque<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        ScriptedPrompter::default()
    }

    /// Queue a response for the given prompt message.
    pub fn on(mut self, message: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .entry(message.into())
            .or_default()
            .push_back(response.into());
        self
    }

    fn take(&mut self, message: &str) -> Result<String> {
        let response = self
            .responses
            .get_mut(message)
            .and_then(|queue| queue.pop_front());

        match response {
            Some(r) => Ok(r),
            None => Err(ReleaserError::config(format!(
                "no scripted response for prompt: {}",
                message
            ))),
        }
    }

    /// Panics if any seeded response was never consumed.
    pub fn finish(self) {
        let leftover: Vec<&String> = self
            .responses
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(message, _)| message)
            .collect();
        assert!(
            leftover.is_empty(),
            "unconsumed scripted prompts: {:?}",
            leftover
        );
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let response = self.take(message)?.to_lowercase();
        Ok(response == "y" || response == "yes" || response == "true")
    }

    fn choose_one(&mut self, message: &str, choices: &[&str]) -> Result<String> {
        let response = self.take(message)?;
        if !choices.contains(&response.as_str()) {
            return Err(ReleaserError::config(format!(
                "scripted response '{}' is not one of {:?}",
                response, choices
            )));
        }
        Ok(response)
    }

    fn ask(&mut self, message: &str, _default: Option<&str>) -> Result<String> {
        self.take(message)
    }
}
