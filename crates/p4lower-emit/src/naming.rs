use indexmap::IndexMap;
use std::collections::HashSet;

/// Hands out C identifiers that stay unique for a whole compilation run.
///
/// Names are never released: a statement that fails halfway keeps whatever it allocated, so a
/// retry cannot collide with text that may already have been emitted.
#[derive(Debug, Default)]
pub struct NameAllocator {
    counter: u64,
    used: HashSet<String>,
    memo: IndexMap<(String, String), String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<hint>_<id>` when an id is given and that name is free, otherwise `<hint>_<id>_<n>` or
    /// `<hint>_<n>`. The same `(hint, id)` pair always yields the same name.
    pub fn allocate(&mut self, hint: &str, id: Option<&str>) -> String {
        if let Some(id) = id {
            let key = (hint.to_string(), id.to_string());
            if let Some(name) = self.memo.get(&key) {
                return name.clone();
            }

            let simple = format!("{}_{}", hint, id);
            let name = if self.used.contains(&simple) {
                self.next_free(&simple)
            } else {
                simple
            };
            self.used.insert(name.clone());
            self.memo.insert(key, name.clone());
            return name;
        }

        let name = self.next_free(hint);
        self.used.insert(name.clone());
        name
    }

    pub fn fresh(&mut self, hint: &str) -> String {
        self.allocate(hint, None)
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    fn next_free(&mut self, prefix: &str) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{}_{}", prefix, self.counter);
            if !self.used.contains(&candidate) {
                return candidate;
            }
        }
    }
}
