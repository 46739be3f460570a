//! Suggestion strategies
//!
//! Pluggable heuristics that propose values from the current debugger
//! state: a step size for a program, an input value for a variable, or a
//! relational watch expression. Strategies are selected by string id from a
//! [`SuggestionRegistry`]; the registry iterates ids in sorted order, so
//! listings are deterministic.
//!
//! A strategy returns `None` when it has nothing sensible to propose
//! (unknown program, no live run, no visible variables).

use crate::debugger::Debugger;
use crate::parser::ast::Type;
use std::collections::BTreeMap;

/// Proposes a step size for one program.
pub trait StepSizeSuggestion {
    fn suggest(&self, debugger: &Debugger, program_id: &str) -> Option<String>;
}

/// Proposes an input value for one variable of one program.
pub trait InputSuggestion {
    fn suggest(&self, debugger: &Debugger, program_id: &str, variable: &str) -> Option<String>;
}

/// Proposes a relational expression over the variables visible at one
/// program's cursor.
pub trait RelationalSuggestion {
    fn suggest(&self, debugger: &Debugger, program_id: &str) -> Option<String>;
}

/// Step size of roughly a tenth of the trace, at least 1. Falls back to 1
/// when no run is live.
pub struct SimpleStepSize;

impl StepSizeSuggestion for SimpleStepSize {
    fn suggest(&self, debugger: &Debugger, program_id: &str) -> Option<String> {
        let length = debugger.trace_length(program_id).unwrap_or(0);
        Some((length / 10).max(1).to_string())
    }
}

/// Neutral literal for the variable's declared type, read from the
/// snapshot at the cursor; plain `0` when the type is unknown.
pub struct SimpleInput;

impl InputSuggestion for SimpleInput {
    fn suggest(&self, debugger: &Debugger, program_id: &str, variable: &str) -> Option<String> {
        let declared = debugger
            .current_state(program_id)
            .ok()
            .flatten()
            .and_then(|state| state.snapshot().type_of(variable));

        let literal = match declared {
            Some(Type::Boolean) => "false",
            Some(Type::Char) => "'a'",
            Some(Type::Long) => "0L",
            Some(Type::Double) => "0.0",
            Some(Type::String) => "\"\"",
            Some(Type::Int) | None => "0",
        };
        Some(literal.to_string())
    }
}

/// Equality over the first visible variable and its current value, as a
/// ready-to-register conditional breakpoint string.
pub struct SimpleRelational;

impl RelationalSuggestion for SimpleRelational {
    fn suggest(&self, debugger: &Debugger, program_id: &str) -> Option<String> {
        let name = debugger
            .all_variables(program_id)
            .ok()?
            .into_iter()
            .next()?;
        let value = debugger.value_of(program_id, &name).ok()??;
        Some(format!("{}.{} == {}", program_id, name, value))
    }
}

/// Registry of suggestion strategies, keyed by string id
pub struct SuggestionRegistry {
    step_size: BTreeMap<String, Box<dyn StepSizeSuggestion>>,
    input: BTreeMap<String, Box<dyn InputSuggestion>>,
    relational: BTreeMap<String, Box<dyn RelationalSuggestion>>,
}

impl Default for SuggestionRegistry {
    /// Registry with the simple default strategies installed.
    fn default() -> Self {
        let mut registry = SuggestionRegistry {
            step_size: BTreeMap::new(),
            input: BTreeMap::new(),
            relational: BTreeMap::new(),
        };
        registry.register_step_size("simple_stepsize", Box::new(SimpleStepSize));
        registry.register_input("simple_input", Box::new(SimpleInput));
        registry.register_relational("simple_relational", Box::new(SimpleRelational));
        registry
    }
}

impl SuggestionRegistry {
    pub fn new() -> Self {
        SuggestionRegistry::default()
    }

    pub fn register_step_size(&mut self, id: impl Into<String>, strategy: Box<dyn StepSizeSuggestion>) {
        self.step_size.insert(id.into(), strategy);
    }

    pub fn register_input(&mut self, id: impl Into<String>, strategy: Box<dyn InputSuggestion>) {
        self.input.insert(id.into(), strategy);
    }

    pub fn register_relational(
        &mut self,
        id: impl Into<String>,
        strategy: Box<dyn RelationalSuggestion>,
    ) {
        self.relational.insert(id.into(), strategy);
    }

    /// Registered strategy ids, sorted.
    pub fn step_size_ids(&self) -> Vec<&str> {
        self.step_size.keys().map(String::as_str).collect()
    }

    pub fn input_ids(&self) -> Vec<&str> {
        self.input.keys().map(String::as_str).collect()
    }

    pub fn relational_ids(&self) -> Vec<&str> {
        self.relational.keys().map(String::as_str).collect()
    }

    /// `None` when the strategy id is unknown or the strategy declines.
    pub fn suggest_step_size(
        &self,
        strategy_id: &str,
        debugger: &Debugger,
        program_id: &str,
    ) -> Option<String> {
        self.step_size.get(strategy_id)?.suggest(debugger, program_id)
    }

    pub fn suggest_input(
        &self,
        strategy_id: &str,
        debugger: &Debugger,
        program_id: &str,
        variable: &str,
    ) -> Option<String> {
        self.input
            .get(strategy_id)?
            .suggest(debugger, program_id, variable)
    }

    pub fn suggest_relational(
        &self,
        strategy_id: &str,
        debugger: &Debugger,
        program_id: &str,
    ) -> Option<String> {
        self.relational.get(strategy_id)?.suggest(debugger, program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugger::ProgramInput;

    #[test]
    fn defaults_are_registered_in_sorted_order() {
        let registry = SuggestionRegistry::new();
        assert_eq!(registry.step_size_ids(), vec!["simple_stepsize"]);
        assert_eq!(registry.input_ids(), vec!["simple_input"]);
        assert_eq!(registry.relational_ids(), vec!["simple_relational"]);
    }

    #[test]
    fn unknown_strategy_id_yields_nothing() {
        let registry = SuggestionRegistry::new();
        let debugger = Debugger::new();
        assert_eq!(registry.suggest_step_size("nope", &debugger, "A"), None);
    }

    #[test]
    fn relational_suggestion_uses_a_visible_variable() {
        let mut debugger = Debugger::new();
        debugger
            .launch_run(vec![ProgramInput::new("A", "a = 7;", "")])
            .unwrap();

        let registry = SuggestionRegistry::new();
        let suggestion = registry
            .suggest_relational("simple_relational", &debugger, "A")
            .unwrap();
        assert_eq!(suggestion, "A.a == 7");
    }
}
