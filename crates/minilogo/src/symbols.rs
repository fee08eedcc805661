/// A named entry in a [`SymbolStore`].
#[derive(Clone, Debug, PartialEq)]
pub struct Record<T> {
    pub name: String,
    pub payload: T,
}

/// Case-insensitive names mapped to variables or procedures.
///
/// Records are kept in insertion order, which is the order they're listed in. Stores are small
/// (a handful of locals, a few dozen procedures), so lookup is a linear scan.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolStore<T> {
    records: Vec<Record<T>>,
}

impl<T> Default for SymbolStore<T> {
    fn default() -> Self {
        SymbolStore {
            records: Vec::new(),
        }
    }
}

pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}

impl<T> SymbolStore<T> {
    /// Bind `name` to `payload`, replacing (in place) any existing binding.
    pub fn define(&mut self, name: &str, payload: T) {
        match self.lookup_mut(name) {
            Some(existing) => *existing = payload,
            None => self.records.push(Record {
                name: name.to_owned(),
                payload,
            }),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.records
            .iter()
            .find(|r| same_name(&r.name, name))
            .map(|r| &r.payload)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut T> {
        self.records
            .iter_mut()
            .find(|r| same_name(&r.name, name))
            .map(|r| &mut r.payload)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Returns `true` if there was something to remove.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.records.len();
        self.records.retain(|r| !same_name(&r.name, name));
        self.records.len() != len
    }

    pub fn list(&self) -> impl Iterator<Item = &Record<T>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<T> FromIterator<(String, T)> for SymbolStore<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut ret = SymbolStore::default();
        for (name, payload) in iter {
            ret.define(&name, payload);
        }
        ret
    }
}
