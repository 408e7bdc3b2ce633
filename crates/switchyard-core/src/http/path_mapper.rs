use std::collections::BTreeMap;

/// Rewrites request paths for a path-translating API gateway.
///
/// Mappings are prefix rules; the longest matching prefix wins and the
/// remainder of the path is kept.
#[derive(Debug, Clone, Default)]
pub struct PathMapper {
    // sorted by descending prefix length
    rules: Vec<(String, String)>,
}

impl PathMapper {
    #[must_use]
    pub fn new(mappings: &BTreeMap<String, String>) -> Self {
        let mut rules: Vec<(String, String)> =
            mappings.iter().map(|(from, to)| (from.clone(), to.clone())).collect();
        rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { rules }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn map(&self, path: &str) -> String {
        for (from, to) in &self.rules {
            if let Some(rest) = path.strip_prefix(from.as_str()) {
                if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') || from.ends_with('/') {
                    tracing::trace!(from = %path, prefix = %from, "api path mapped");
                    return format!("{to}{rest}");
                }
            }
        }
        path.to_string()
    }
}
