//! Token search over the merged registry

use std::collections::BTreeSet;

use crate::agent::{Agent, Category};

/// Result cap when none is given
pub const DEFAULT_LIMIT: usize = 20;

/// Search constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Restrict the population before matching
    pub category: Option<Category>,
    /// Keep records carrying ANY of these tags
    pub tags: BTreeSet<String>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            tags: BTreeSet::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Search for agents matching every whitespace-delimited token of `query`.
///
/// Results keep registry order and are capped at `opts.limit`.
pub fn search<'a>(agents: &'a [Agent], query: &str, opts: &SearchOptions) -> Vec<&'a Agent> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    let wanted_tags: BTreeSet<String> = opts.tags.iter().map(|t| t.to_lowercase()).collect();

    agents
        .iter()
        .filter(|a| opts.category.map(|c| a.category == c).unwrap_or(true))
        .filter(|a| wanted_tags.is_empty() || a.tags.iter().any(|t| wanted_tags.contains(&t.to_lowercase())))
        .filter(|a| {
            let haystack = haystack(a);
            tokens.iter().all(|t| haystack.contains(t.as_str()))
        })
        .take(opts.limit)
        .collect()
}

fn haystack(agent: &Agent) -> String {
    let mut parts = vec![agent.name.as_str(), agent.description.as_str()];
    parts.extend(agent.tags.iter().map(String::as_str));
    parts.extend(agent.keywords.iter().map(String::as_str));
    parts.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Tier;
    use crate::registry::resolver::tests::agent;

    fn catalog() -> Vec<Agent> {
        let mut react = agent("react-expert", "1.0.0", Tier::Bundled);
        react.tags = vec!["frontend".to_string()];

        let mut vue = agent("vue-expert", "1.0.0", Tier::Bundled);
        vue.description = "Migrates React apps to Vue".to_string();
        vue.tags = vec!["Frontend".to_string()];

        let mut native = agent("mobile-dev", "1.0.0", Tier::Bundled);
        native.keywords = vec!["REACT-native".to_string()];
        native.tags = vec!["mobile".to_string()];

        let mut auditor = agent("auditor", "1.0.0", Tier::Bundled);
        auditor.category = Category::Security;
        auditor.description = "Audits react code for XSS".to_string();

        vec![react, vue, native, auditor]
    }

    fn names(results: &[&Agent]) -> Vec<String> {
        results.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_search_substring_case_insensitive_in_order() {
        let agents = catalog();
        let results = search(&agents, "React", &SearchOptions::default());
        assert_eq!(names(&results), vec!["react-expert", "vue-expert", "mobile-dev", "auditor"]);
    }

    #[test]
    fn test_search_all_tokens_must_match() {
        let agents = catalog();
        let results = search(&agents, "react vue", &SearchOptions::default());
        assert_eq!(names(&results), vec!["vue-expert"]);
    }

    #[test]
    fn test_search_category_filter() {
        let agents = catalog();
        let opts = SearchOptions {
            category: Some(Category::Security),
            ..Default::default()
        };
        assert_eq!(names(&search(&agents, "react", &opts)), vec!["auditor"]);
    }

    #[test]
    fn test_search_tag_filter_any_match() {
        let agents = catalog();
        let opts = SearchOptions {
            tags: BTreeSet::from(["frontend".to_string(), "mobile".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            names(&search(&agents, "", &opts)),
            vec!["react-expert", "vue-expert", "mobile-dev"]
        );
    }

    #[test]
    fn test_search_limit() {
        let agents: Vec<Agent> = (0..30)
            .map(|i| agent(&format!("react-{:02}", i), "1.0.0", Tier::Bundled))
            .collect();

        assert_eq!(search(&agents, "react", &SearchOptions::default()).len(), DEFAULT_LIMIT);

        let opts = SearchOptions {
            limit: 3,
            ..Default::default()
        };
        assert_eq!(names(&search(&agents, "react", &opts)), vec!["react-00", "react-01", "react-02"]);
    }

    #[test]
    fn test_search_no_match() {
        let agents = catalog();
        assert!(search(&agents, "kubernetes", &SearchOptions::default()).is_empty());
    }
}
