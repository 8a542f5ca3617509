use crate::constants::EXCLUDED_URL_PREFIXES;
use crate::models::TabSnapshot;

/// Decides whether a tab is worth reporting.
///
/// Tabs without a URL and internal pages (`about:`, `chrome:`,
/// `moz-extension:`, `resource:`) are never forwarded.
pub fn is_eligible(tab: Option<&TabSnapshot>) -> bool {
    let Some(url) = tab.and_then(|t| t.url.as_deref()) else {
        return false;
    };
    if url.is_empty() {
        return false;
    }
    !EXCLUDED_URL_PREFIXES
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(url: Option<&str>) -> TabSnapshot {
        TabSnapshot::new(1, 1, url, Some("title"))
    }

    #[test]
    fn test_absent_tab_is_not_eligible() {
        assert!(!is_eligible(None));
    }

    #[test]
    fn test_missing_or_empty_url_is_not_eligible() {
        assert!(!is_eligible(Some(&tab(None))));
        assert!(!is_eligible(Some(&tab(Some("")))));
    }

    #[test]
    fn test_internal_schemes_are_excluded() {
        for url in [
            "about:preferences",
            "about:blank",
            "chrome://browser/content/browser.xhtml",
            "moz-extension://1234/popup.html",
            "resource://gre/modules/foo.js",
        ] {
            assert!(!is_eligible(Some(&tab(Some(url)))), "{url} should be excluded");
        }
    }

    #[test]
    fn test_regular_pages_are_eligible() {
        for url in [
            "https://example.com",
            "http://localhost:8080/path",
            "file:///home/user/notes.html",
            "https://about.example.com/",
        ] {
            assert!(is_eligible(Some(&tab(Some(url)))), "{url} should be eligible");
        }
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        // The browser normalizes schemes to lowercase before reporting them.
        assert!(is_eligible(Some(&tab(Some("ABOUT:config")))));
    }
}
