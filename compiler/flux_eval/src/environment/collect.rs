//! Reclaiming detached scopes.
//!
//! Closures and the scopes they capture can refer to each other (a function
//! stored in the scope it was defined in), so counting alone never frees
//! them. Instead:
//!
//! 1. Census: walk every value bound in a live scope and count, per shared
//!    allocation, the references that come from inside the arena.
//! 2. Roots: open scopes, allocations with more strong references than the
//!    census found (held by the Rust stack, call arguments, a result on its
//!    way out), and scopes pinned by closures the census never met.
//! 3. Mark from the roots through bindings, parents, collection elements
//!    and closure scopes.
//! 4. Sweep: free detached scopes left unmarked and empty arrays left
//!    unmarked, which breaks any reference cycle running through them.

use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use super::{EnvId, Environment, Scope, MIN_COLLECT_AT};
use crate::value::{Heap, Shared};
use crate::Value;

/// Identity of a shared allocation.
type Addr = usize;

impl Environment {
    /// Free every detached scope no live closure can reach.
    ///
    /// Runs on its own once enough scopes are detached. Returns the number
    /// of scopes freed.
    pub fn collect(&mut self) -> usize {
        let census = Census::take(self);
        let marks = census.mark(self);
        let freed = census.sweep(self, &marks);

        self.detached -= freed;
        self.collect_at = MIN_COLLECT_AT.max(2 * self.detached);
        tracing::debug!(
            freed,
            detached = self.detached,
            live = self.live_scopes(),
            "collected scopes"
        );
        freed
    }

    fn live(&self) -> impl Iterator<Item = (EnvId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .filter(|(_, scope)| scope.is_live())
            .filter_map(|(index, scope)| Some((EnvId(u32::try_from(index).ok()?), scope)))
    }
}

#[derive(Default)]
struct Census {
    /// One handle per allocation met, keeping it alive until the sweep.
    objects: FxHashMap<Addr, Value>,
    /// References to each allocation from bindings and collection elements.
    inbound: FxHashMap<Addr, usize>,
    /// Distinct closures met, per defining scope.
    closures: FxHashMap<EnvId, usize>,
}

#[derive(Default)]
struct Marks {
    scopes: FxHashSet<EnvId>,
    objects: FxHashSet<Addr>,
}

impl Census {
    fn take(env: &Environment) -> Self {
        let mut census = Census::default();
        let mut pending = Vec::new();
        for (_, scope) in env.live() {
            for value in scope.bindings.values() {
                census.reference(value, &mut pending);
            }
        }
        while let Some(value) = pending.pop() {
            match &value {
                Value::Array(elements) => {
                    for element in elements.borrow().iter() {
                        census.reference(element, &mut pending);
                    }
                }
                Value::Dict(dict) => {
                    for (key, value) in dict.iter() {
                        census.reference(key, &mut pending);
                        census.reference(value, &mut pending);
                    }
                }
                Value::Function(function) => {
                    *census.closures.entry(function.closure()).or_default() += 1;
                }
                _ => {}
            }
        }
        census
    }

    fn reference(&mut self, value: &Value, pending: &mut Vec<Value>) {
        let Some(addr) = identity(value) else {
            return;
        };
        *self.inbound.entry(addr).or_default() += 1;
        if let Entry::Vacant(slot) = self.objects.entry(addr) {
            slot.insert(value.clone());
            pending.push(value.clone());
        }
    }

    /// Strong references beyond the census's own handle and the ones it
    /// counted.
    fn held_outside(&self, addr: Addr, value: &Value) -> bool {
        let inbound = self.inbound.get(&addr).copied().unwrap_or(0);
        strong_count(value) > inbound + 1
    }

    fn mark(&self, env: &Environment) -> Marks {
        let mut marks = Marks::default();
        let mut scopes: Vec<EnvId> = env
            .live()
            .filter(|(id, scope)| {
                scope.open || scope.pin_count() > self.closures.get(id).copied().unwrap_or(0)
            })
            .map(|(id, _)| id)
            .collect();
        let mut objects: Vec<Addr> = self
            .objects
            .iter()
            .filter(|(addr, value)| self.held_outside(**addr, value))
            .map(|(addr, _)| *addr)
            .collect();

        loop {
            if let Some(id) = scopes.pop() {
                if !marks.scopes.insert(id) {
                    continue;
                }
                let scope = &env.scopes[id.index()];
                scopes.extend(scope.parent);
                objects.extend(scope.bindings.values().filter_map(identity));
            } else if let Some(addr) = objects.pop() {
                if !marks.objects.insert(addr) {
                    continue;
                }
                match self.objects.get(&addr) {
                    Some(Value::Array(elements)) => {
                        objects.extend(elements.borrow().iter().filter_map(identity));
                    }
                    Some(Value::Dict(dict)) => {
                        for (key, value) in dict.iter() {
                            objects.extend(identity(key));
                            objects.extend(identity(value));
                        }
                    }
                    Some(Value::Function(function)) => scopes.push(function.closure()),
                    _ => {}
                }
            } else {
                break;
            }
        }
        marks
    }

    fn sweep(self, env: &mut Environment, marks: &Marks) -> usize {
        for (addr, value) in &self.objects {
            if let Value::Array(elements) = value {
                if !marks.objects.contains(addr) {
                    elements.borrow_mut().clear();
                }
            }
        }

        let unreachable: Vec<EnvId> = env
            .live()
            .filter(|(id, scope)| !scope.open && !marks.scopes.contains(id))
            .map(|(id, _)| id)
            .collect();
        for &id in &unreachable {
            env.free_scope(id);
        }
        unreachable.len()
    }
}

/// Address of the shared allocation behind `value`, if it has one that can
/// take part in a cycle.
fn identity(value: &Value) -> Option<Addr> {
    match value {
        Value::Array(elements) => Some(Shared::addr(elements)),
        Value::Dict(dict) => Some(Heap::addr(dict)),
        Value::Function(function) => Some(Heap::addr(function)),
        _ => None,
    }
}

fn strong_count(value: &Value) -> usize {
    match value {
        Value::Array(elements) => Shared::strong_count(elements),
        Value::Dict(dict) => Heap::strong_count(dict),
        Value::Function(function) => Heap::strong_count(function),
        _ => 0,
    }
}
