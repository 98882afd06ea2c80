//! Administrator-managed rule collection
//!
//! [`RuleBook`] keeps rules ordered by `(priority, creation order)` as they
//! are mutated, and caches the active subset as an immutable snapshot so
//! evaluation never re-sorts. [`RuleRegistry`] shares a rule book between
//! administrators and evaluators: a reader clones the snapshot `Arc` under
//! a short read lock and evaluates without holding it, so an edit never
//! affects an evaluation already in flight.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::info;

use core_kernel::RuleId;
use crate::error::RuleError;
use crate::rule::{ApprovalRule, RuleDraft, RuleUpdate};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    rule: ApprovalRule,
}

impl Entry {
    fn key(&self) -> (u32, u64) {
        (self.rule.priority, self.seq)
    }
}

/// Rules in evaluation order
#[derive(Debug, Clone)]
pub struct RuleBook {
    entries: Vec<Entry>,
    next_seq: u64,
    active: Arc<[ApprovalRule]>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            active: Arc::from(Vec::new()),
        }
    }

    /// Builds a rule book from drafts, in order
    pub fn from_drafts(drafts: impl IntoIterator<Item = RuleDraft>) -> Result<Self, RuleError> {
        let mut book = Self::new();
        for draft in drafts {
            book.create(draft)?;
        }
        Ok(book)
    }

    /// Creates a rule
    ///
    /// # Errors
    ///
    /// Returns `RuleError::MissingName`, `RuleError::EmptyConditions` or
    /// `RuleError::InvalidAction` if the draft is incomplete.
    pub fn create(&mut self, draft: RuleDraft) -> Result<ApprovalRule, RuleError> {
        let rule = draft.into_rule(Utc::now())?;
        info!(rule_id = %rule.id, name = %rule.name, priority = rule.priority, "Rule created");

        let seq = self.next_seq;
        self.next_seq += 1;
        self.insert(Entry { seq, rule: rule.clone() });
        self.refresh();
        Ok(rule)
    }

    pub fn get(&self, id: RuleId) -> Option<&ApprovalRule> {
        self.entries.iter().map(|e| &e.rule).find(|r| r.id == id)
    }

    /// All rules, active or not, in evaluation order
    pub fn list(&self) -> impl Iterator<Item = &ApprovalRule> {
        self.entries.iter().map(|e| &e.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies a partial update
    ///
    /// # Errors
    ///
    /// Returns `RuleError::RuleNotFound` for an unknown id, or a validation
    /// error if the updated rule would be incomplete.
    pub fn update(&mut self, id: RuleId, update: RuleUpdate) -> Result<ApprovalRule, RuleError> {
        let index = self.position(id)?;
        let updated = update.apply_to(&self.entries[index].rule, Utc::now())?;

        let mut entry = self.entries.remove(index);
        entry.rule = updated.clone();
        self.insert(entry);
        self.refresh();

        info!(rule_id = %id, "Rule updated");
        Ok(updated)
    }

    /// Flips a rule's active flag, returning the new state
    pub fn toggle_active(&mut self, id: RuleId) -> Result<bool, RuleError> {
        let index = self.position(id)?;
        let rule = &mut self.entries[index].rule;
        rule.is_active = !rule.is_active;
        rule.updated_at = Utc::now();
        let is_active = rule.is_active;
        self.refresh();

        info!(rule_id = %id, is_active, "Rule toggled");
        Ok(is_active)
    }

    /// Removes a rule
    pub fn delete(&mut self, id: RuleId) -> Result<ApprovalRule, RuleError> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);
        self.refresh();

        info!(rule_id = %id, "Rule deleted");
        Ok(entry.rule)
    }

    /// Active rules in evaluation order
    pub fn snapshot(&self) -> Arc<[ApprovalRule]> {
        Arc::clone(&self.active)
    }

    fn position(&self, id: RuleId) -> Result<usize, RuleError> {
        self.entries
            .iter()
            .position(|e| e.rule.id == id)
            .ok_or(RuleError::RuleNotFound(id))
    }

    fn insert(&mut self, entry: Entry) {
        let key = entry.key();
        let at = self.entries.partition_point(|e| e.key() < key);
        self.entries.insert(at, entry);
    }

    fn refresh(&mut self) {
        self.active = self
            .entries
            .iter()
            .filter(|e| e.rule.is_active)
            .map(|e| e.rule.clone())
            .collect();
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to a rule book
#[derive(Debug, Default)]
pub struct RuleRegistry {
    book: RwLock<RuleBook>,
}

impl RuleRegistry {
    pub fn new(book: RuleBook) -> Self {
        Self {
            book: RwLock::new(book),
        }
    }

    /// Current active rules in evaluation order
    pub fn snapshot(&self) -> Result<Arc<[ApprovalRule]>, RuleError> {
        let book = self.book.read().map_err(|_| RuleError::RegistryUnavailable)?;
        Ok(book.snapshot())
    }

    pub fn create(&self, draft: RuleDraft) -> Result<ApprovalRule, RuleError> {
        self.write()?.create(draft)
    }

    pub fn get(&self, id: RuleId) -> Result<ApprovalRule, RuleError> {
        let book = self.book.read().map_err(|_| RuleError::RegistryUnavailable)?;
        book.get(id).cloned().ok_or(RuleError::RuleNotFound(id))
    }

    /// Copies every rule in evaluation order
    pub fn list(&self) -> Result<Vec<ApprovalRule>, RuleError> {
        let book = self.book.read().map_err(|_| RuleError::RegistryUnavailable)?;
        Ok(book.list().cloned().collect())
    }

    pub fn update(&self, id: RuleId, update: RuleUpdate) -> Result<ApprovalRule, RuleError> {
        self.write()?.update(id, update)
    }

    pub fn toggle_active(&self, id: RuleId) -> Result<bool, RuleError> {
        self.write()?.toggle_active(id)
    }

    pub fn delete(&self, id: RuleId) -> Result<ApprovalRule, RuleError> {
        self.write()?.delete(id)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RuleBook>, RuleError> {
        self.book.write().map_err(|_| RuleError::RegistryUnavailable)
    }
}

#[cfg(test)]
impl RuleRegistry {
    /// Panics while holding the write lock
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.book.write();
            panic!("rule writer failed");
        }));
    }
}

impl From<RuleBook> for RuleRegistry {
    fn from(book: RuleBook) -> Self {
        Self::new(book)
    }
}
