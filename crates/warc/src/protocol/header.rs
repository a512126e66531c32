//! Header collections for WARC records and embedded HTTP messages.
//!
//! [`Headers`] keeps every parsed field in arrival order, duplicates included. [`WarcHeaders`] is the
//! record-level mapping where a repeated name overwrites the earlier value.

/// Ordered list of header fields with names as written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field without checking for existing fields of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Appends a folded continuation to the value of the last field.
    ///
    /// Returns false if there is no field to continue.
    pub(crate) fn continue_last(&mut self, text: &str) -> bool {
        match self.fields.last_mut() {
            Some((_, value)) => {
                value.push(' ');
                value.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Value of the first field with this (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    /// Values of every field with this (case-insensitive) name, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter(move |(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Header mapping of a WARC record.
///
/// Names keep the case they were written in. A field whose name exactly repeats an earlier one
/// replaces its value in place; lookups ignore case and prefer the most recently inserted match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarcHeaders {
    fields: Vec<(String, String)>,
}

impl WarcHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, overwriting the value of an existing field with the same literal name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().rev().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Headers> for WarcHeaders {
    fn from(headers: Headers) -> Self {
        let mut map = WarcHeaders::new();
        for (name, value) in headers.fields {
            map.insert(name, value);
        }
        map
    }
}
