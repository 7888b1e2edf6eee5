use serde::{Deserialize, Serialize};

use crate::constants::limits;

/// One column filter pair as sent by the client grid:
/// `[{"id": "productName", "value": "chilli"}, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    pub id: String,
    pub value: String,
}

/// Pagination parameters. `page_index` is 0-based.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page_index: u64,
    pub page_size: u64,
}

impl PageParams {
    #[must_use]
    pub fn new(page_index: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page_index: page_index.unwrap_or(0),
            page_size: page_size
                .unwrap_or(limits::DEFAULT_PAGE_SIZE)
                .clamp(1, limits::MAX_PAGE_SIZE),
        }
    }
}

/// Parses the JSON-encoded `filters` argument. An absent or blank argument
/// means no filters; malformed JSON is a caller error.
pub fn parse_filters(raw: Option<&str>) -> Result<Vec<ColumnFilter>, serde_json::Error> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s),
    }
}

/// Looks up a filter value by column id, ignoring blank values.
#[must_use]
pub fn filter_value<'a>(filters: &'a [ColumnFilter], id: &str) -> Option<&'a str> {
    filters
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.value.as_str())
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters_empty() {
        assert!(parse_filters(None).unwrap().is_empty());
        assert!(parse_filters(Some("")).unwrap().is_empty());
        assert!(parse_filters(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_filters_pairs() {
        let parsed =
            parse_filters(Some(r#"[{"id":"country","value":"Thailand"}]"#)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "country");
        assert_eq!(parsed[0].value, "Thailand");
    }

    #[test]
    fn test_parse_filters_malformed() {
        assert!(parse_filters(Some("not json")).is_err());
    }

    #[test]
    fn test_page_params_clamped() {
        let page = PageParams::new(None, Some(10_000));
        assert_eq!(page.page_index, 0);
        assert_eq!(page.page_size, limits::MAX_PAGE_SIZE);

        let page = PageParams::new(Some(3), Some(0));
        assert_eq!(page.page_index, 3);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn test_filter_value_skips_blank() {
        let filters = vec![
            ColumnFilter {
                id: "permitNumber".to_string(),
                value: "  ".to_string(),
            },
            ColumnFilter {
                id: "country".to_string(),
                value: "Japan".to_string(),
            },
        ];
        assert_eq!(filter_value(&filters, "permitNumber"), None);
        assert_eq!(filter_value(&filters, "country"), Some("Japan"));
    }
}
