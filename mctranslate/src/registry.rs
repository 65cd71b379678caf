//! Numeric ids bound at runtime, for blocks and biomes the rule data does not
//! know about (modded content in old worlds).

use dashmap::DashMap;

/// Two-way map between namespaced names and numeric ids.
///
/// Shared by every version of a [`TranslationManager`](crate::TranslationManager)
/// and consulted before each version's own numeric tables.
#[derive(Debug, Default)]
pub struct NumericalRegistry {
    to_name: DashMap<i32, String>,
    to_id: DashMap<String, i32>,
}

impl NumericalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` and `id` to each other. A later binding of either side
    /// replaces the earlier one in that direction only.
    pub fn register(&self, name: impl Into<String>, id: i32) {
        let name = name.into();
        log::debug!("Registered numeric id {id} for {name}");
        self.to_name.insert(id, name.clone());
        self.to_id.insert(name, id);
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.to_name.contains_key(&id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.to_id.contains_key(name)
    }

    pub fn private_to_str(&self, id: i32) -> Option<String> {
        self.to_name.get(&id).map(|name| name.value().clone())
    }

    pub fn private_to_int(&self, name: &str) -> Option<i32> {
        self.to_id.get(name).map(|id| *id.value())
    }

    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }
}
