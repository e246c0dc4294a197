//! Per-key value lookup across request sources.

use bindery_http::{FormView, PathParams, Request};

/// Looks binding keys up in path placeholders, then form values.
///
/// The first non-empty value wins; a source holding the key with an empty
/// value does not shadow a later source. Absence is the empty string.
#[derive(Debug, Clone, Copy)]
pub struct ValueResolver<'a> {
    path: &'a PathParams,
    form: FormView<'a>,
}

impl<'a> ValueResolver<'a> {
    pub fn new(path: &'a PathParams, form: FormView<'a>) -> Self {
        Self { path, form }
    }

    pub fn from_request(request: &'a Request) -> Self {
        Self::new(request.path_params(), request.form())
    }

    pub fn resolve(&self, key: &str) -> &'a str {
        self.resolve_nth(key, 0)
    }

    /// The `n`-th value for `key`.
    ///
    /// A non-empty path placeholder counts as the only occurrence of its
    /// key; otherwise occurrences are counted across form-encoded body
    /// values followed by query values.
    pub fn resolve_nth(&self, key: &str, n: usize) -> &'a str {
        let path: &'a PathParams = self.path;
        if let Some(value) = path.get(key).filter(|v| !v.is_empty()) {
            return if n == 0 { value } else { "" };
        }
        self.form
            .get_nth(key, n)
            .filter(|v| !v.is_empty())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_http::FormValues;

    fn resolver<'a>(
        path: &'a PathParams,
        body: &'a FormValues,
        query: &'a FormValues,
    ) -> ValueResolver<'a> {
        ValueResolver::new(path, FormView::new(body, query))
    }

    #[test]
    fn path_wins_over_form() {
        let path: PathParams = [("id", "42")].into_iter().collect();
        let body = FormValues::new();
        let query = FormValues::parse(b"id=7");
        assert_eq!(resolver(&path, &body, &query).resolve("id"), "42");
    }

    #[test]
    fn empty_path_value_falls_through() {
        let path: PathParams = [("id", "")].into_iter().collect();
        let body = FormValues::new();
        let query = FormValues::parse(b"id=7");
        assert_eq!(resolver(&path, &body, &query).resolve("id"), "7");
    }

    #[test]
    fn body_form_wins_over_query() {
        let path = PathParams::new();
        let body = FormValues::parse(b"name=body");
        let query = FormValues::parse(b"name=query");
        assert_eq!(resolver(&path, &body, &query).resolve("name"), "body");
    }

    #[test]
    fn absence_is_empty_string() {
        let path = PathParams::new();
        let empty = FormValues::new();
        let query = FormValues::parse(b"blank=");
        let r = resolver(&path, &empty, &query);
        assert_eq!(r.resolve("missing"), "");
        assert_eq!(r.resolve("blank"), "");
    }

    #[test]
    fn nth_counts_across_body_and_query() {
        let path = PathParams::new();
        let body = FormValues::parse(b"tag=a");
        let query = FormValues::parse(b"tag=b&tag=c");
        let r = resolver(&path, &body, &query);
        assert_eq!(r.resolve_nth("tag", 0), "a");
        assert_eq!(r.resolve_nth("tag", 1), "b");
        assert_eq!(r.resolve_nth("tag", 2), "c");
        assert_eq!(r.resolve_nth("tag", 3), "");
    }

    #[test]
    fn path_value_is_a_single_occurrence() {
        let path: PathParams = [("tag", "p")].into_iter().collect();
        let body = FormValues::new();
        let query = FormValues::parse(b"tag=q");
        let r = resolver(&path, &body, &query);
        assert_eq!(r.resolve_nth("tag", 0), "p");
        assert_eq!(r.resolve_nth("tag", 1), "");
    }
}
