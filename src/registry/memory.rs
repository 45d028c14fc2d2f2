use std::collections::HashMap;

use tracing::debug;

use super::{Registry, StoreError};
use crate::{tree, Expr, NamedRule};

/// An in-process registry. Keeps each rule's decoded tree next to it so
/// content lookups compare trees, not serialized text.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
    sequence: u64,
}

#[derive(Debug, Clone)]
struct Entry {
    rule: NamedRule,
    expr: Expr,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from previously stored rules.
    ///
    /// `sequence` is the highest identifier number handed out so far; it is
    /// raised if any restored `ruleN` id is larger.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on duplicate ids or undecodable trees.
    pub fn restore(rules: Vec<NamedRule>, sequence: u64) -> Result<Self, StoreError> {
        let mut registry = Self {
            sequence,
            ..Self::default()
        };
        for rule in rules {
            registry.insert(rule)?;
        }
        Ok(registry)
    }

    /// Highest identifier number handed out since the last clear.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

fn sequence_number(id: &str) -> Option<u64> {
    id.strip_prefix("rule")?.parse().ok()
}

impl Registry for MemoryRegistry {
    fn lookup_by_content(&self, expr: &Expr) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.expr == *expr)
            .map(|entry| entry.rule.id.clone())
    }

    fn next_identifier(&self) -> String {
        format!("rule{}", self.sequence.saturating_add(1))
    }

    fn insert(&mut self, rule: NamedRule) -> Result<(), StoreError> {
        if self.by_id.contains_key(&rule.id) {
            return Err(StoreError::DuplicateId { id: rule.id });
        }
        let expr = tree::from_json(&rule.tree).map_err(|source| StoreError::CorruptTree {
            id: rule.id.clone(),
            source,
        })?;
        if let Some(n) = sequence_number(&rule.id) {
            self.sequence = self.sequence.max(n);
        }
        debug!(rule_id = %rule.id, leaves = expr.leaf_count(), "rule stored");
        self.by_id.insert(rule.id.clone(), self.entries.len());
        self.entries.push(Entry { rule, expr });
        Ok(())
    }

    fn fetch(&self, id: &str) -> Option<NamedRule> {
        self.by_id.get(id).map(|&idx| self.entries[idx].rule.clone())
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.by_id.clear();
        self.sequence = 0;
        Ok(())
    }

    fn rules(&self) -> Vec<NamedRule> {
        self.entries.iter().map(|entry| entry.rule.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
