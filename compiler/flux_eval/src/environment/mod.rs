//! Variable scopes.
//!
//! Scopes live in an arena owned by the interpreter and are addressed by
//! [`EnvId`] handles. A closure stores the handle of its defining scope, so
//! sharing is by reference while the arena stays the only owner (no
//! `Rc` cycles between scopes and the functions stored in them).
//!
//! Block, call and loop evaluation create a scope, run, and [`release`] it.
//! Creating a function value [`capture`]s its scope and marks every ancestor.
//! An uncaptured scope is freed as soon as it is released. A captured one
//! is only detached: closures may still reach it, so it waits for
//! [`collect`], which frees detached scopes no live closure can reach.
//! Freed slots go on a free list and are reused by the next [`child`].
//!
//! [`release`]: Environment::release
//! [`capture`]: Environment::capture
//! [`collect`]: Environment::collect
//! [`child`]: Environment::child

mod collect;

use rustc_hash::FxHashMap;

use flux_ir::{Name, Token};

use crate::errors::{undefined_reassign, undefined_variable, EvalResult};
use crate::value::Heap;
use crate::Value;

/// Detached scopes tolerated before the first collection.
const MIN_COLLECT_AT: usize = 256;

/// Handle to a scope in an [`Environment`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnvId(u32);

impl EnvId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A closure's hold on the scope it was defined in.
///
/// The scope counts its outstanding pins; [`Environment::collect`] treats a
/// pin held outside the arena as a root.
#[derive(Clone, Debug)]
pub struct ScopePin {
    env: EnvId,
    /// Counted, never read.
    _hold: Heap<()>,
}

impl ScopePin {
    #[inline]
    pub fn env(&self) -> EnvId {
        self.env
    }
}

/// A single scope: local bindings plus a parent link.
#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<Name, Value>,
    parent: Option<EnvId>,
    /// Reachable from a function value, directly or through a descendant.
    captured: bool,
    /// Not yet released by the block, loop or call that opened it.
    open: bool,
    /// Shared with every closure defined directly in this scope.
    pins: Option<Heap<()>>,
}

impl Scope {
    /// Free slots are neither open nor captured.
    fn is_live(&self) -> bool {
        self.open || self.captured
    }

    /// Pins held by closures, as opposed to the scope's own handle.
    fn pin_count(&self) -> usize {
        self.pins.as_ref().map_or(0, |pins| Heap::strong_count(pins) - 1)
    }
}

/// Arena of scopes.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    free: Vec<EnvId>,
    /// Live scopes that are captured but no longer open.
    detached: usize,
    /// Value of `detached` that triggers the next collection.
    collect_at: usize,
}

impl Environment {
    /// Create an environment holding only the global scope.
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope {
                captured: true,
                open: true,
                ..Scope::default()
            }],
            free: Vec::new(),
            detached: 0,
            collect_at: MIN_COLLECT_AT,
        }
    }

    /// The top-level scope. Builtins and top-level definitions live here.
    #[inline]
    pub fn global(&self) -> EnvId {
        EnvId(0)
    }

    /// Open a new scope under `parent`.
    pub fn child(&mut self, parent: EnvId) -> EnvId {
        if let Some(id) = self.free.pop() {
            let scope = &mut self.scopes[id.index()];
            scope.parent = Some(parent);
            scope.open = true;
            return id;
        }
        let id = EnvId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(Scope {
            parent: Some(parent),
            open: true,
            ..Scope::default()
        });
        id
    }

    /// Bind `name` in `env` itself, shadowing any outer binding.
    #[inline]
    pub fn define(&mut self, env: EnvId, name: Name, value: Value) {
        self.scopes[env.index()].bindings.insert(name, value);
    }

    /// Look `name` up through the scope chain.
    pub fn lookup(&self, env: EnvId, name: Name) -> Option<&Value> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(value) = scope.bindings.get(&name) {
                return Some(value);
            }
            current = scope.parent;
        }
        None
    }

    /// Read a variable; the token names it in the error.
    pub fn get(&self, env: EnvId, name: Name, token: &Token) -> EvalResult {
        self.lookup(env, name)
            .cloned()
            .ok_or_else(|| undefined_variable(token))
    }

    /// Overwrite the nearest existing binding of `name`.
    ///
    /// Never creates a binding: an unknown name fails.
    pub fn assign(&mut self, env: EnvId, name: Name, value: Value, token: &Token) -> EvalResult {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.index()];
            if let Some(slot) = scope.bindings.get_mut(&name) {
                *slot = value.clone();
                return Ok(value);
            }
            current = scope.parent;
        }
        Err(undefined_reassign(token))
    }

    /// Pin `env` for a closure defined in it.
    ///
    /// `env` and its ancestors are marked captured, so releasing them only
    /// detaches them until [`collect`](Self::collect) proves them
    /// unreachable.
    pub fn capture(&mut self, env: EnvId) -> ScopePin {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = &mut self.scopes[id.index()];
            if scope.captured {
                // Ancestors of a captured scope are already captured.
                break;
            }
            scope.captured = true;
            current = scope.parent;
        }
        let hold = self.scopes[env.index()]
            .pins
            .get_or_insert_with(|| Heap::new(()))
            .clone();
        ScopePin { env, _hold: hold }
    }

    #[inline]
    pub fn is_captured(&self, env: EnvId) -> bool {
        self.scopes[env.index()].captured
    }

    /// Drop every binding in `env`, keeping the scope itself.
    pub fn reset(&mut self, env: EnvId) {
        self.scopes[env.index()].bindings.clear();
    }

    /// Close `env`. An uncaptured scope goes straight back to the free
    /// list; a captured one is detached and left for [`collect`](Self::collect).
    pub fn release(&mut self, env: EnvId) {
        let scope = &mut self.scopes[env.index()];
        if !scope.captured {
            self.free_scope(env);
            return;
        }
        if scope.open {
            scope.open = false;
            self.detached += 1;
        }
        if self.detached >= self.collect_at {
            self.collect();
        }
    }

    /// Close every scope but the global one.
    ///
    /// For when evaluation unwound without releasing the scopes it opened.
    pub fn close_all(&mut self) {
        for index in 1..self.scopes.len() {
            let scope = &mut self.scopes[index];
            if !scope.open {
                continue;
            }
            if scope.captured {
                scope.open = false;
                self.detached += 1;
            } else if let Ok(id) = u32::try_from(index) {
                self.free_scope(EnvId(id));
            }
        }
        self.collect();
    }

    fn free_scope(&mut self, env: EnvId) {
        let scope = &mut self.scopes[env.index()];
        scope.bindings.clear();
        scope.parent = None;
        scope.captured = false;
        scope.open = false;
        scope.pins = None;
        self.free.push(env);
    }

    /// Scopes currently allocated and not on the free list.
    pub fn live_scopes(&self) -> usize {
        self.scopes.len() - self.free.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
