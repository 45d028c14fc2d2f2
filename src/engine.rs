use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::RuleCache;
use crate::parse::{parse_expression, Command};
use crate::registry::{MemoryRegistry, Registry};
use crate::{combine, evaluate, tree, Expr, NamedRule, Outcome, Record, RuleDeckError};

/// Routes command intents to the parser, evaluator and combiner, and owns
/// the registry they persist to.
///
/// Registry mutations run under a single write lock together with the
/// duplicate lookup and id allocation that precede them, so two callers
/// submitting equal trees get one new id and one [`Outcome::DuplicateOf`].
/// Cache updates happen under the same lock as the registry access they
/// mirror.
///
/// # Example
///
/// ```
/// use ruledeck::{Outcome, Record, RuleEngine};
///
/// let engine = RuleEngine::in_memory();
/// let id = match engine.create_rule("age > 30").unwrap() {
///     Outcome::Created(id) => id,
///     other => panic!("unexpected {other:?}"),
/// };
/// let record = Record::new().set("age", 35_i64);
/// assert_eq!(
///     engine.evaluate_rule(&id, &record).unwrap(),
///     Outcome::EvaluationResult(true)
/// );
/// ```
#[derive(Debug)]
pub struct RuleEngine<R> {
    registry: RwLock<R>,
    cache: RuleCache,
}

impl RuleEngine<MemoryRegistry> {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryRegistry::new())
    }
}

impl<R: Registry> RuleEngine<R> {
    pub fn new(registry: R) -> Self {
        Self::with_cache(registry, RuleCache::default())
    }

    pub fn with_cache(registry: R, cache: RuleCache) -> Self {
        Self {
            registry: RwLock::new(registry),
            cache,
        }
    }

    /// Parse `expression` and store it under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDeckError::Parse`] for malformed text and
    /// [`RuleDeckError::Store`] if the registry rejects the write.
    pub fn create_rule(&self, expression: &str) -> Result<Outcome, RuleDeckError> {
        let expr = parse_expression(expression)?;
        self.store(expr, Outcome::Created)
    }

    /// Evaluate the stored rule `rule_id` against `record`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDeckError::RuleNotFound`] for an unknown id and
    /// [`RuleDeckError::Eval`] if evaluation fails.
    pub fn evaluate_rule(&self, rule_id: &str, record: &Record) -> Result<Outcome, RuleDeckError> {
        let expr = self.resolve(rule_id)?;
        let result = evaluate(&expr, record)?;
        debug!(rule_id, result, "rule evaluated");
        Ok(Outcome::EvaluationResult(result))
    }

    /// Join the stored rules `rule_ids` under `operator` and store the result.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDeckError::RuleNotFound`] if any id is unknown and
    /// [`RuleDeckError::Combine`] for a bad operator or fewer than two ids.
    pub fn combine_rules<S: AsRef<str>>(
        &self,
        rule_ids: &[S],
        operator: &str,
    ) -> Result<Outcome, RuleDeckError> {
        let children = rule_ids
            .iter()
            .map(|id| self.resolve(id.as_ref()).map(|expr| Expr::clone(&expr)))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = combine(children, operator)?;
        self.store(combined, Outcome::CombinedInto)
    }

    /// Every stored rule, oldest first.
    pub fn list_rules(&self) -> Outcome {
        Outcome::Listed(self.registry.read().rules())
    }

    /// Remove every rule. Ids start again at `rule1`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleDeckError::Store`] if the registry cannot be cleared.
    pub fn clear_rules(&self) -> Result<Outcome, RuleDeckError> {
        let mut registry = self.registry.write();
        let removed = registry.len();
        registry.clear_all()?;
        self.cache.clear();
        info!(removed, "rules cleared");
        Ok(Outcome::Cleared)
    }

    /// Run one command intent.
    ///
    /// # Errors
    ///
    /// Whatever the matching operation returns.
    pub fn dispatch(&self, command: Command) -> Result<Outcome, RuleDeckError> {
        debug!(command = command.name(), "dispatching");
        match command {
            Command::CreateRule { expression } => self.create_rule(&expression),
            Command::EvaluateRule { rule_id, data } => self.evaluate_rule(&rule_id, &data),
            Command::CombineRules { rule_ids, operator } => {
                self.combine_rules(rule_ids.as_slice(), &operator)
            }
            Command::ListRules => Ok(self.list_rules()),
            Command::ClearRules => self.clear_rules(),
        }
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.registry.read().len()
    }

    fn store(
        &self,
        expr: Expr,
        stored: fn(String) -> Outcome,
    ) -> Result<Outcome, RuleDeckError> {
        let tree = tree::to_json(&expr)?;

        let mut registry = self.registry.write();
        if let Some(existing) = registry.lookup_by_content(&expr) {
            debug!(rule_id = %existing, "duplicate rule submitted");
            return Ok(Outcome::DuplicateOf(existing));
        }
        let id = registry.next_identifier();
        registry.insert(NamedRule::new(id.clone(), tree))?;
        self.cache.put(id.clone(), Arc::new(expr));
        drop(registry);

        info!(rule_id = %id, "rule created");
        Ok(stored(id))
    }

    fn resolve(&self, rule_id: &str) -> Result<Arc<Expr>, RuleDeckError> {
        if let Some(expr) = self.cache.get(rule_id) {
            return Ok(expr);
        }

        let registry = self.registry.read();
        let rule = registry
            .fetch(rule_id)
            .ok_or_else(|| RuleDeckError::RuleNotFound {
                id: rule_id.to_owned(),
            })?;
        let expr = Arc::new(tree::from_json(&rule.tree)?);
        self.cache.put(rule_id, Arc::clone(&expr));
        debug!(rule_id, "rule tree decoded into cache");
        Ok(expr)
    }
}
