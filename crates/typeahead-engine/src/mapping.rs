//! Keyboard mapping rules and the dispatcher.
//!
//! A [`MappingSet`] is an ordered list of named rules. Each rule folds its
//! conditions under an [`Operator`] and, when the fold comes out true, its
//! bound behavior fires. Every rule is tested for every keystroke, so
//! disjoint rules (e.g. "select on Enter" and "query on alphanumerics") can
//! both react to the same event.
//!
//! The dispatcher is stateless and generic over the behavior type: it only
//! reports which behaviors matched, in declaration order.

use crate::error::{EngineError, Result};
use crate::keys::{KeyCondition, KeyEvent};

/// How a rule combines its conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

/// A named condition set bound to a behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingRule<B> {
    pub name: String,
    pub conditions: Vec<KeyCondition>,
    pub operator: Operator,
    pub behavior: B,
}

impl<B> MappingRule<B> {
    pub fn new(
        name: impl Into<String>,
        operator: Operator,
        conditions: Vec<KeyCondition>,
        behavior: B,
    ) -> Self {
        MappingRule {
            name: name.into(),
            conditions,
            operator,
            behavior,
        }
    }

    /// Fold every condition under the rule's operator.
    ///
    /// AND is seeded `true`, OR is seeded `false`. All conditions are
    /// evaluated; they are pure, so this is equivalent to short-circuiting.
    pub fn matches(&self, key: KeyEvent) -> bool {
        let seed = self.operator == Operator::And;
        self.conditions
            .iter()
            .fold(seed, |matched, condition| {
                let result = condition.evaluate(key.code);
                match self.operator {
                    Operator::And => matched && result,
                    Operator::Or => matched || result,
                }
            })
    }

    pub fn display(&self) -> String {
        let joiner = match self.operator {
            Operator::And => " && ",
            Operator::Or => " || ",
        };
        let conditions: Vec<String> = self.conditions.iter().map(|c| c.display()).collect();
        format!("{}: {}", self.name, conditions.join(joiner))
    }
}

/// An ordered set of uniquely named rules.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingSet<B> {
    rules: Vec<MappingRule<B>>,
}

impl<B> Default for MappingSet<B> {
    fn default() -> Self {
        MappingSet { rules: Vec::new() }
    }
}

impl<B> MappingSet<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from rules, rejecting duplicate names.
    pub fn from_rules(rules: impl IntoIterator<Item = MappingRule<B>>) -> Result<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.push(rule)?;
        }
        Ok(set)
    }

    /// Append a rule. Names are unique within a set.
    pub fn push(&mut self, rule: MappingRule<B>) -> Result<()> {
        if self.get(&rule.name).is_some() {
            return Err(EngineError::DuplicateRule(rule.name));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MappingRule<B>> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn rules(&self) -> &[MappingRule<B>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule matching `key`, in declaration order.
    pub fn dispatch(&self, key: KeyEvent) -> impl Iterator<Item = &MappingRule<B>> {
        dispatch(self, key)
    }
}

/// Route one keystroke through a mapping set.
pub fn dispatch<B>(set: &MappingSet<B>, key: KeyEvent) -> impl Iterator<Item = &MappingRule<B>> {
    set.rules.iter().filter(move |rule| rule.matches(key))
}
