use url::form_urlencoded;

/// An ordered multimap of form-encoded values.
///
/// Preserves the order in which keys appeared on the wire and keeps
/// repeated keys (`?tag=a&tag=b`) as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    entries: Vec<(String, String)>,
}

impl FormValues {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse `application/x-www-form-urlencoded` input (a query string
    /// without its leading `?`, or a form body).
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input).into_owned().collect()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_nth(key, 0)
    }

    /// The `n`-th value recorded for `key`, counting from zero.
    pub fn get_nth(&self, key: &str, n: usize) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .nth(n)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Read-only view over a request's form sources in lookup order: values
/// from a form-encoded body first, then query-string values.
#[derive(Debug, Clone, Copy)]
pub struct FormView<'a> {
    body: &'a FormValues,
    query: &'a FormValues,
}

impl<'a> FormView<'a> {
    pub fn new(body: &'a FormValues, query: &'a FormValues) -> Self {
        Self { body, query }
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.get_nth(key, 0)
    }

    /// The `n`-th value for `key` across body values followed by query
    /// values.
    pub fn get_nth(&self, key: &str, n: usize) -> Option<&'a str> {
        let body: &'a FormValues = self.body;
        let query: &'a FormValues = self.query;
        body.entries
            .iter()
            .chain(query.entries.iter())
            .filter(|(k, _)| k == key)
            .nth(n)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.body.len() + self.query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty() && self.query.is_empty()
    }
}
