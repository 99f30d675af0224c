//! Human decision points.
//!
//! The pipeline never renders prompts itself. Where detection cannot decide,
//! it asks a [`ChoiceProvider`] a small typed question and takes one typed
//! answer back.

use crate::core::installer::InstallerType;
use std::collections::VecDeque;

/// Answer to "is this nested executable an installer or a portable app?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedFamilyChoice {
    Exe,
    Portable,
}

impl From<NestedFamilyChoice> for InstallerType {
    fn from(choice: NestedFamilyChoice) -> Self {
        match choice {
            NestedFamilyChoice::Exe => InstallerType::Exe,
            NestedFamilyChoice::Portable => InstallerType::Portable,
        }
    }
}

/// Source of answers for ambiguous detection steps.
pub trait ChoiceProvider {
    /// Pick the nested installers from a candidate set of archive paths.
    fn select_nested(&mut self, candidates: &[String]) -> Vec<String>;

    /// Enter one more archive-relative path; `None` stops manual entry.
    fn enter_relative_path(&mut self) -> Option<String>;

    /// Decide the family of a nested file detection could not classify.
    fn nested_family(&mut self, relative_path: &str) -> Option<NestedFamilyChoice>;

    /// Command alias for a portable nested file; `None` skips it.
    fn command_alias(&mut self, relative_path: &str) -> Option<String>;
}

/// Answers every question with "no decision".
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl ChoiceProvider for NonInteractive {
    fn select_nested(&mut self, _candidates: &[String]) -> Vec<String> {
        Vec::new()
    }

    fn enter_relative_path(&mut self) -> Option<String> {
        None
    }

    fn nested_family(&mut self, _relative_path: &str) -> Option<NestedFamilyChoice> {
        None
    }

    fn command_alias(&mut self, _relative_path: &str) -> Option<String> {
        None
    }
}

/// Replays pre-recorded answers in order; exhausted queues answer "no decision".
#[derive(Debug, Default, Clone)]
pub struct ScriptedChoices {
    selections: VecDeque<Vec<String>>,
    paths: VecDeque<String>,
    families: VecDeque<NestedFamilyChoice>,
    aliases: VecDeque<Option<String>>,
    /// Candidate sets that were offered, in order.
    pub offered: Vec<Vec<String>>,
}

impl ScriptedChoices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, paths: &[&str]) -> Self {
        self.selections
            .push_back(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.paths.push_back(path.to_string());
        self
    }

    pub fn family(mut self, choice: NestedFamilyChoice) -> Self {
        self.families.push_back(choice);
        self
    }

    pub fn alias(mut self, alias: Option<&str>) -> Self {
        self.aliases.push_back(alias.map(str::to_string));
        self
    }
}

impl ChoiceProvider for ScriptedChoices {
    fn select_nested(&mut self, candidates: &[String]) -> Vec<String> {
        self.offered.push(candidates.to_vec());
        self.selections.pop_front().unwrap_or_default()
    }

    fn enter_relative_path(&mut self) -> Option<String> {
        self.paths.pop_front()
    }

    fn nested_family(&mut self, _relative_path: &str) -> Option<NestedFamilyChoice> {
        self.families.pop_front()
    }

    fn command_alias(&mut self, _relative_path: &str) -> Option<String> {
        self.aliases.pop_front().flatten()
    }
}
