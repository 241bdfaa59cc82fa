use rustc_hash::FxHashMap;

/// An interned identifier.
///
/// Ada names are case-insensitive; two spellings of the same name intern to
/// the same id. The first spelling seen is kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(u32);

#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<String, NameId>,
    names: Vec<String>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> NameId {
        let key = name.to_lowercase();
        if let Some(&id) = self.map.get(&key) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.map.insert(key, id);
        id
    }

    #[must_use]
    pub fn get(&self, id: NameId) -> &str {
        &self.names[id.0 as usize]
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NameId> {
        self.map.get(&name.to_lowercase()).copied()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (NameId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, s)| (NameId(i as u32), s.as_str()))
    }
}

#[test]
fn test_case_insensitive() {
    let mut interner = Interner::new();
    let a = interner.intern("Put_Line");
    let b = interner.intern("PUT_LINE");
    let c = interner.intern("put_line");
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!("Put_Line", interner.get(a));
    assert_ne!(a, interner.intern("Put"));
}

#[test]
fn test_lookup() {
    let mut interner = Interner::new();
    assert_eq!(None, interner.lookup("integer"));
    let id = interner.intern("Integer");
    assert_eq!(Some(id), interner.lookup("INTEGER"));
}
