//! Open formatting scopes.
//!
//! Scopes are closed by kind rather than strictly LIFO: an image closes
//! whatever it opened even if sibling content opened and closed its own scopes
//! in between, and a heading closes several co-opened scopes at once.

use crate::entity::{Entity, EntityKind, EntityType};

/// A formatting region that has been opened but not closed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityScope {
    pub kind: EntityKind,
    pub start: u32,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<EntityScope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntityKind, start: u32) {
        self.scopes.push(EntityScope { kind, start });
    }

    /// Closes the most recent scope of `entity_type` at `end`.
    ///
    /// Returns `None` when no such scope is open or the span is empty.
    pub fn pop(&mut self, entity_type: EntityType, end: u32) -> Option<Entity> {
        let index = self
            .scopes
            .iter()
            .rposition(|scope| scope.kind.entity_type() == entity_type)?;
        let scope = self.scopes.remove(index);
        finalize(scope, end)
    }

    /// Closes the most recent scope regardless of its kind.
    pub fn pop_any(&mut self, end: u32) -> Option<Entity> {
        let scope = self.scopes.pop()?;
        finalize(scope, end)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

fn finalize(scope: EntityScope, end: u32) -> Option<Entity> {
    let length = end.saturating_sub(scope.start);
    (length > 0).then(|| Entity::new(scope.kind, scope.start, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_by_type_skips_unrelated_scopes() {
        let mut scopes = ScopeStack::new();
        scopes.push(EntityKind::Bold, 0);
        scopes.push(EntityKind::Italic, 2);

        let bold = scopes.pop(EntityType::Bold, 6).unwrap();
        assert_eq!(bold, Entity::new(EntityKind::Bold, 0, 6));
        assert_eq!(scopes.len(), 1);

        let italic = scopes.pop(EntityType::Italic, 7).unwrap();
        assert_eq!(italic, Entity::new(EntityKind::Italic, 2, 5));
        assert!(scopes.is_empty());
    }

    #[test]
    fn test_pop_picks_most_recent_of_type() {
        let mut scopes = ScopeStack::new();
        scopes.push(EntityKind::Bold, 0);
        scopes.push(EntityKind::Bold, 4);

        assert_eq!(
            scopes.pop(EntityType::Bold, 5),
            Some(Entity::new(EntityKind::Bold, 4, 1))
        );
    }

    #[test]
    fn test_pop_any_takes_top() {
        let mut scopes = ScopeStack::new();
        scopes.push(EntityKind::Bold, 0);
        scopes.push(
            EntityKind::TextLink {
                url: "https://x.y".to_string(),
            },
            1,
        );

        let link = scopes.pop_any(3).unwrap();
        assert_eq!(link.url(), Some("https://x.y"));
        assert_eq!(scopes.len(), 1);
    }

    #[test]
    fn test_zero_length_scope_is_dropped() {
        let mut scopes = ScopeStack::new();
        scopes.push(EntityKind::Italic, 3);
        assert_eq!(scopes.pop(EntityType::Italic, 3), None);
        assert!(scopes.is_empty());
    }

    #[test]
    fn test_pop_missing_type() {
        let mut scopes = ScopeStack::new();
        scopes.push(EntityKind::Bold, 0);
        assert_eq!(scopes.pop(EntityType::Spoiler, 4), None);
        assert_eq!(scopes.len(), 1);
        assert_eq!(ScopeStack::new().pop_any(1), None);
    }
}
