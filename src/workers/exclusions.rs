/// Championship filter on lowercase keyword substrings
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    keywords: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// First keyword contained in the championship name, if any
    pub fn matching_keyword(&self, championship: &str) -> Option<&str> {
        let name = championship.to_lowercase();
        self.keywords
            .iter()
            .find(|k| name.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_excluded(&self, championship: &str) -> bool {
        self.matching_keyword(championship).is_some()
    }
}
