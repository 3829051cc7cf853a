//! One-shot startup signals and the dataset viewer handoff.

use shared::domain::{DatasetCategory, LanguageCode};
use url::{form_urlencoded, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationParams {
    pub reset_size: bool,
}

impl NavigationParams {
    /// Parses a page query string such as `?resetSize=true`.
    pub fn parse(query: Option<&str>) -> Self {
        let Some(query) = query else {
            return Self::default();
        };
        let reset_size = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .any(|(key, value)| key == "resetSize" && value == "true");
        Self { reset_size }
    }
}

/// Viewer url for `category`, or `None` when the category has no viewer page.
pub fn dataset_link(
    viewer_page: &Url,
    category: DatasetCategory,
    language: &LanguageCode,
) -> Option<Url> {
    let key = category.viewer_key()?;
    let mut url = viewer_page.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("type", key)
        .append_pair("lang", language.as_str());
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_size_requires_explicit_true() {
        assert!(NavigationParams::parse(Some("?resetSize=true")).reset_size);
        assert!(NavigationParams::parse(Some("lang=nl&resetSize=true")).reset_size);
        assert!(!NavigationParams::parse(Some("resetSize=1")).reset_size);
        assert!(!NavigationParams::parse(None).reset_size);
    }

    #[test]
    fn dataset_links_carry_type_and_language() {
        let viewer = Url::parse("http://127.0.0.1:8080/database_viewer.html").expect("url");
        let url = dataset_link(&viewer, DatasetCategory::IsoDeleted, &LanguageCode::dutch())
            .expect("viewer link");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/database_viewer.html?type=iso_deleted&lang=nl"
        );
        assert!(dataset_link(&viewer, DatasetCategory::NeedMore, &LanguageCode::english()).is_none());
    }
}
