/*
[INPUT]:  Raw package names typed or picked by the user
[OUTPUT]: Deduplicated, insertion-ordered package list
[POS]:    Form state - packages pending submission
[UPDATE]: When changing how package names are normalized
*/

/// Result of adding a name to a [`PackageSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
    /// Input was empty after trimming; nothing changed
    Empty,
}

impl AddOutcome {
    /// Whether the input field should be cleared after this outcome
    pub fn clears_input(self) -> bool {
        !matches!(self, AddOutcome::Empty)
    }
}

/// Ordered set of package names, compared exactly after trimming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    names: Vec<String>,
}

impl PackageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str) -> AddOutcome {
        let name = name.trim();
        if name.is_empty() {
            return AddOutcome::Empty;
        }
        if self.contains(name) {
            return AddOutcome::Duplicate;
        }
        self.names.push(name.to_string());
        AddOutcome::Added
    }

    /// Returns `true` when the name was present
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        before != self.names.len()
    }

    /// Drop every name in `names`, keeping ones added since that snapshot
    pub fn remove_all(&mut self, names: &[String]) {
        self.names.retain(|existing| !names.contains(existing));
    }

    /// Snapshot of the current names in insertion order
    pub fn list(&self) -> Vec<String> {
        self.names.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PackageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PackageSet::new();
        for name in iter {
            set.add(name.as_ref());
        }
        set
    }
}

/// Package entry field: the text being typed plus the names committed so far
#[derive(Debug, Clone, Default)]
pub struct PackageInput {
    text: String,
    packages: PackageSet,
}

impl PackageInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Add the current text to the set.
    ///
    /// The text is cleared on `Added` and `Duplicate`, and kept on `Empty`.
    pub fn commit(&mut self) -> AddOutcome {
        let outcome = self.packages.add(&self.text);
        if outcome.clears_input() {
            self.text.clear();
        }
        outcome
    }

    /// Autocomplete pick: replace the text with `name` and commit it
    pub fn select(&mut self, name: &str) -> AddOutcome {
        self.text = name.to_string();
        self.commit()
    }

    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn packages_mut(&mut self) -> &mut PackageSet {
        &mut self.packages
    }
}
