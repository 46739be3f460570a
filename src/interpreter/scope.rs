//! Scope arena and snapshots
//!
//! Scopes form a parent chain (block scopes chain to their enclosing scope,
//! routine-call scopes are rooted). Instead of shared pointers between
//! records, all scopes of one run live in a [`ScopeArena`] and refer to each
//! other by [`ScopeId`] handle; a child never outlives its parent because
//! the arena owns both.
//!
//! A [`ScopeSnapshot`] is a deep, flattened copy of everything visible from
//! one scope at one instant. Snapshots are what traces store; they are never
//! aliased with live records, so history stays immutable while execution
//! continues to mutate the arena.

use crate::interpreter::value::Value;
use crate::parser::ast::Type;
use rustc_hash::FxHashMap;

/// Handle of a scope record inside its arena
pub type ScopeId = usize;

/// One binding environment: declared types, current values, the
/// return-value register and the parent link.
#[derive(Debug, Default)]
struct ScopeRecord {
    types: FxHashMap<String, Type>,
    values: FxHashMap<String, Value>,
    return_value: Option<Value>,
    parent: Option<ScopeId>,
}

/// Arena owning every scope of a single run
#[derive(Debug, Default)]
pub struct ScopeArena {
    records: Vec<ScopeRecord>,
}

impl ScopeArena {
    pub fn new() -> Self {
        ScopeArena::default()
    }

    /// Allocate a fresh scope. `parent` is `None` for root and routine-call
    /// scopes, `Some` for nested block scopes.
    pub fn alloc(&mut self, parent: Option<ScopeId>) -> ScopeId {
        self.records.push(ScopeRecord {
            parent,
            ..ScopeRecord::default()
        });
        self.records.len() - 1
    }

    /// Declare `name` with `ty` directly in `scope`, shadowing any binding
    /// of the same name further up the chain.
    pub fn declare(&mut self, scope: ScopeId, name: &str, ty: Type) {
        self.records[scope].types.insert(name.to_string(), ty);
    }

    /// Declared type of `name`, searching the parent chain.
    pub fn type_of(&self, scope: ScopeId, name: &str) -> Option<Type> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(ty) = self.records[id].types.get(name) {
                return Some(*ty);
            }
            current = self.records[id].parent;
        }
        None
    }

    /// Current value of `name`, searching the parent chain.
    pub fn value_of(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(value) = self.records[id].values.get(name) {
                return Some(value);
            }
            current = self.records[id].parent;
        }
        None
    }

    /// The scope along the chain that declares `name`, if any.
    pub fn binding_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.records[id].types.contains_key(name) {
                return Some(id);
            }
            current = self.records[id].parent;
        }
        None
    }

    /// Store `value` for `name` directly in `scope` (no chain search).
    pub fn set_value(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.records[scope].values.insert(name.to_string(), value);
    }

    /// Root of the parent chain `scope` belongs to. For code running inside
    /// a routine this is the call scope; at top level, the program root.
    pub fn chain_root(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        while let Some(parent) = self.records[current].parent {
            current = parent;
        }
        current
    }

    /// Store a return value. The register lives on the chain root, so a
    /// `return` inside a nested block is still visible at the call boundary.
    pub fn set_return_value(&mut self, scope: ScopeId, value: Value) {
        let root = self.chain_root(scope);
        self.records[root].return_value = Some(value);
    }

    pub fn return_value(&self, scope: ScopeId) -> Option<&Value> {
        let root = self.chain_root(scope);
        self.records[root].return_value.as_ref()
    }

    /// Deep copy of everything visible from `scope`: bindings are flattened
    /// root-first so that inner declarations shadow outer ones.
    pub fn snapshot(&self, scope: ScopeId) -> ScopeSnapshot {
        let mut chain = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            chain.push(id);
            current = self.records[id].parent;
        }

        let mut snapshot = ScopeSnapshot::default();
        for id in chain.iter().rev() {
            let record = &self.records[*id];
            for (name, ty) in &record.types {
                snapshot.types.insert(name.clone(), *ty);
            }
            for (name, value) in &record.values {
                snapshot.values.insert(name.clone(), value.clone());
            }
        }
        let root = self.chain_root(scope);
        snapshot.return_value = self.records[root].return_value.clone();
        snapshot
    }
}

/// Immutable copy of the bindings visible at one execution point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeSnapshot {
    types: FxHashMap<String, Type>,
    values: FxHashMap<String, Value>,
    return_value: Option<Value>,
}

impl ScopeSnapshot {
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn type_of(&self, name: &str) -> Option<Type> {
        self.types.get(name).copied()
    }

    /// The return-value register captured with this snapshot.
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// All bound variable names, sorted for stable presentation.
    pub fn variables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }
}
