//! Test doubles shared by the loader and controller tests.

use std::collections::VecDeque;

use crate::data::interactive::Interactive;

/// A canned answer to the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Choose(usize),
    Integer(i64),
    Cancel,
}

/// [`Interactive`] that replays scripted answers and records the questions.
///
/// Once the script runs out every question is cancelled.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    answers: VecDeque<Answer>,
    prompts: Vec<(String, Vec<String>)>,
    bounds: Vec<(i64, i64)>,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every question.
    pub fn cancelling() -> Self {
        Self::default()
    }

    pub fn choose(mut self, idx: usize) -> Self {
        self.answers.push_back(Answer::Choose(idx));
        self
    }

    pub fn integer(mut self, value: i64) -> Self {
        self.answers.push_back(Answer::Integer(value));
        self
    }

    pub fn cancel(mut self) -> Self {
        self.answers.push_back(Answer::Cancel);
        self
    }

    /// Choice prompts seen so far, with their options.
    pub fn prompts(&self) -> &[(String, Vec<String>)] {
        &self.prompts
    }

    /// Bounds offered by integer prompts so far.
    pub fn integer_bounds(&self) -> Vec<(i64, i64)> {
        self.bounds.clone()
    }

    /// Whether every scripted answer was consumed.
    pub fn exhausted(&self) -> bool {
        self.answers.is_empty()
    }
}

impl Interactive for ScriptedUi {
    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        self.prompts.push((prompt.to_string(), options.to_vec()));
        match self.answers.pop_front() {
            Some(Answer::Choose(idx)) => Some(idx),
            None | Some(Answer::Cancel) => None,
            Some(other) => panic!("choice prompt '{}' got scripted {:?}", prompt, other),
        }
    }

    fn enter_integer(&mut self, prompt: &str, min: i64, max: i64) -> Option<i64> {
        self.bounds.push((min, max));
        match self.answers.pop_front() {
            Some(Answer::Integer(value)) => Some(value),
            None | Some(Answer::Cancel) => None,
            Some(other) => panic!("integer prompt '{}' got scripted {:?}", prompt, other),
        }
    }
}
