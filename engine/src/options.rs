use std::collections::BTreeSet;
use std::str::FromStr;

use crate::header::DEFAULT_HEADER_LOOKAHEAD;
use crate::schema::HeaderRegistry;

/// 1-based page numbers, e.g. `1-2` or `1,3-4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<usize>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: usize) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        self.contains(index + 1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn parse_page_number(value: &str, what: &str) -> Result<usize, String> {
    let page: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{value}'"))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start = parse_page_number(start, "page range start")?;
                let end = parse_page_number(end, "page range end")?;
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                pages.extend(start..=end);
            } else {
                pages.insert(parse_page_number(token, "page number")?);
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub header_lookahead: usize,
    pub registry: HeaderRegistry,
    pub delimiter: u8,
    pub no_provenance: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            header_lookahead: DEFAULT_HEADER_LOOKAHEAD,
            registry: HeaderRegistry::default(),
            delimiter: b',',
            no_provenance: false,
        }
    }
}
