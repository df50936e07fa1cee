use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content category a search is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    All,
    Org,
    Markdown,
    Pdf,
    Github,
    Notion,
    Plaintext,
    Image,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::All => "all",
            SearchType::Org => "org",
            SearchType::Markdown => "markdown",
            SearchType::Pdf => "pdf",
            SearchType::Github => "github",
            SearchType::Notion => "notion",
            SearchType::Plaintext => "plaintext",
            SearchType::Image => "image",
        }
    }

    /// Whether an entry with this `file_type` belongs to the category
    pub fn matches_file_type(&self, file_type: &str) -> bool {
        match self {
            SearchType::All => true,
            other => other.as_str().eq_ignore_ascii_case(file_type),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SearchType::All),
            "org" => Ok(SearchType::Org),
            "markdown" => Ok(SearchType::Markdown),
            "pdf" => Ok(SearchType::Pdf),
            "github" => Ok(SearchType::Github),
            "notion" => Ok(SearchType::Notion),
            "plaintext" => Ok(SearchType::Plaintext),
            "image" => Ok(SearchType::Image),
            other => Err(format!("unknown search type: {}", other)),
        }
    }
}

/// One ranked hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entry_id: String,
    pub content: String,
    pub heading: Option<String>,
    pub file: Option<String>,
    pub hashed_value: String,
    pub score: f64,
    pub source: SearchType,
    #[serde(default)]
    pub additional: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_parse_and_display() {
        assert_eq!("Markdown".parse::<SearchType>().unwrap(), SearchType::Markdown);
        assert_eq!(SearchType::Plaintext.to_string(), "plaintext");
        assert!("video".parse::<SearchType>().is_err());
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(SearchType::All.matches_file_type("org"));
        assert!(SearchType::Org.matches_file_type("org"));
        assert!(!SearchType::Org.matches_file_type("markdown"));
    }
}
