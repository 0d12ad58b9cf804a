//! Reconciliation between the search box and the `search` URL parameter.
//!
//! The browser debounces typing (400 ms of quiet) and sends the raw box value
//! together with the URL of the page it is on. [`reconcile`] decides what the
//! address bar should become: the trimmed value is compared with the URL's
//! current `search` parameter, and only a difference produces a
//! [`UrlUpdate`]. An empty value removes the parameter. Every other query
//! parameter is preserved.

use url::form_urlencoded;

/// Name of the query parameter holding the search text.
pub const SEARCH_PARAM: &str = "search";

/// Change to apply to the page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlUpdate {
    /// Set `search` to the value.
    Set(String),
    /// Remove `search`.
    Remove,
}

impl UrlUpdate {
    /// Rewrite a query string, keeping every parameter except `search`.
    ///
    /// ```
    /// use tas_core::search_sync::UrlUpdate;
    ///
    /// let query = UrlUpdate::Set("drill bit".into()).apply("brand=b1&search=old");
    /// assert_eq!(query, "brand=b1&search=drill+bit");
    /// assert_eq!(UrlUpdate::Remove.apply("search=old"), "");
    /// ```
    #[must_use]
    pub fn apply(&self, query: &str) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            if key != SEARCH_PARAM {
                out.append_pair(&key, &value);
            }
        }
        if let Self::Set(value) = self {
            out.append_pair(SEARCH_PARAM, value);
        }
        out.finish()
    }

    /// Full link for `path` after applying the update to `query`.
    #[must_use]
    pub fn href(&self, path: &str, query: &str) -> String {
        let query = self.apply(query);
        if query.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{query}")
        }
    }
}

/// The `search` parameter of a query string, if present.
#[must_use]
pub fn search_value(query: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// What the URL with `query` should become for the box value `input`.
///
/// `None` means the URL already reflects the box.
///
/// ```
/// use tas_core::search_sync::{UrlUpdate, reconcile};
///
/// assert_eq!(reconcile(Some(" tap "), "brand=b1"), Some(UrlUpdate::Set("tap".into())));
/// assert_eq!(reconcile(Some("tap"), "search=tap"), None);
/// assert_eq!(reconcile(Some(""), "search=tap"), Some(UrlUpdate::Remove));
/// ```
#[must_use]
pub fn reconcile(input: Option<&str>, query: &str) -> Option<UrlUpdate> {
    let wanted = input.unwrap_or_default().trim();
    match search_value(query) {
        None if wanted.is_empty() => None,
        Some(_) if wanted.is_empty() => Some(UrlUpdate::Remove),
        Some(current) if current == wanted => None,
        _ => Some(UrlUpdate::Set(wanted.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_trimmed_and_unchanged_value_is_ignored() {
        assert_eq!(reconcile(Some("  belt "), "search=belt"), None);
        assert_eq!(reconcile(Some("belt"), "?search=belt"), None);
    }

    #[test]
    fn test_comparison_is_against_the_url_value() {
        assert_eq!(
            reconcile(Some("belts"), "search=belt"),
            Some(UrlUpdate::Set("belts".into()))
        );
        assert_eq!(
            reconcile(Some("belt"), "search=+belt+"),
            Some(UrlUpdate::Set("belt".into()))
        );
    }

    #[test]
    fn test_whitespace_only_removes_parameter() {
        assert_eq!(reconcile(Some("   "), "search=belt"), Some(UrlUpdate::Remove));
        assert_eq!(reconcile(None, "search="), Some(UrlUpdate::Remove));
    }

    #[test]
    fn test_empty_box_without_parameter_does_nothing() {
        assert_eq!(reconcile(Some(" "), "brand=b1"), None);
        assert_eq!(reconcile(None, ""), None);
    }

    #[test]
    fn test_search_value() {
        assert_eq!(search_value("brand=b1&search=m8+tap").as_deref(), Some("m8 tap"));
        assert_eq!(search_value("brand=b1"), None);
    }

    #[test]
    fn test_url_update_preserves_other_parameters() {
        let href = UrlUpdate::Set("m8 tap".into()).href("/products", "?brand=b1&category=c1");
        assert_eq!(href, "/products?brand=b1&category=c1&search=m8+tap");

        let href = UrlUpdate::Remove.href("/products", "brand=b1&search=x");
        assert_eq!(href, "/products?brand=b1");

        assert_eq!(UrlUpdate::Remove.href("/products", ""), "/products");
    }
}
