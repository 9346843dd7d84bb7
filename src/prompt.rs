//! User decisions behind one narrow interface.
//!
//! Every interactive choice the conversion needs goes through [`Prompter`]:
//! yes/no confirmations, a free-text line, a comma-separated index selection
//! and a numbered menu. [`ConsolePrompter`] asks on the terminal with
//! `inquire`; [`ScriptedPrompter`] replays canned answers so the conversion
//! can run without a console.

use anyhow::{Result, bail};
use colored::*;
use std::collections::VecDeque;

pub trait Prompter {
    fn confirm(&mut self, message: &str) -> Result<bool>;

    fn text(&mut self, message: &str) -> Result<String>;

    /// Indices into a list of `count` items the caller has already shown.
    fn select_indices(&mut self, message: &str, count: usize) -> Result<Vec<usize>>;

    /// Index of the chosen option.
    fn menu(&mut self, message: &str, options: &[&str]) -> Result<usize>;
}

/// Parses `0,2,5`, `NONE` or `ALL` against a list of `count` items.
///
/// Duplicates collapse to their first occurrence; anything else that is not
/// an in-range index is rejected so the caller can ask again.
pub fn parse_index_list(input: &str, count: usize) -> Result<Vec<usize>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("NONE") {
        return Ok(Vec::new());
    }
    if input.eq_ignore_ascii_case("ALL") {
        return Ok((0..count).collect());
    }
    if input.is_empty() {
        return Err("enter numbers separated by commas, NONE or ALL".to_string());
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        let index: usize = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        if index >= count {
            return Err(format!(
                "{} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ));
        }
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(inquire::Confirm::new(message).prompt()?)
    }

    fn text(&mut self, message: &str) -> Result<String> {
        Ok(inquire::Text::new(message).prompt()?.trim().to_string())
    }

    fn select_indices(&mut self, message: &str, count: usize) -> Result<Vec<usize>> {
        loop {
            let answer = inquire::Text::new(message)
                .with_help_message("e.g. 0,1,3 - NONE for nothing, ALL for everything")
                .prompt()?;
            match parse_index_list(&answer, count) {
                Ok(indices) => return Ok(indices),
                Err(msg) => println!("{} {}", "!".yellow(), msg),
            }
        }
    }

    fn menu(&mut self, message: &str, options: &[&str]) -> Result<usize> {
        let choice = inquire::Select::new(message, options.to_vec()).raw_prompt()?;
        Ok(choice.index)
    }
}

/// Replays answers in order. Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
}

impl ScriptedPrompter {
    pub fn new<S: Into<String>>(answers: impl IntoIterator<Item = S>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<String> {
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("no scripted answer left for prompt: {}", message),
        }
    }
}

impl Prompter for ScriptedPrompter {
    /// `y`/`yes` (any case) is yes, `n`/`no` is no; other answers are
    /// skipped the way a console re-prompts.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        loop {
            let answer = self.next(message)?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }

    fn text(&mut self, message: &str) -> Result<String> {
        Ok(self.next(message)?.trim().to_string())
    }

    fn select_indices(&mut self, message: &str, count: usize) -> Result<Vec<usize>> {
        loop {
            let answer = self.next(message)?;
            if let Ok(indices) = parse_index_list(&answer, count) {
                return Ok(indices);
            }
        }
    }

    fn menu(&mut self, message: &str, options: &[&str]) -> Result<usize> {
        loop {
            let answer = self.next(message)?;
            if let Ok(index) = answer.trim().parse::<usize>()
                && index < options.len()
            {
                return Ok(index);
            }
        }
    }
}
