use super::Value;

/// Dict payload.
///
/// Keys are compared with [`Value::equals`], so `1` and `1.0` name the same
/// entry. Entries keep insertion order for display; re-inserting a key
/// replaces its value in place.
#[derive(Clone, Debug, Default)]
pub struct DictValue {
    entries: Vec<(Value, Value)>,
}

impl DictValue {
    pub fn new() -> Self {
        DictValue::default()
    }

    /// Insert or replace. Callers check [`Value::is_hashable`] first.
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    /// Set equality over key/value pairs; order is irrelevant. Values are
    /// compared with `same`.
    pub(super) fn equals_by(
        &self,
        other: &DictValue,
        mut same: impl FnMut(&Value, &Value) -> bool,
    ) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| same(v, w)))
    }
}
