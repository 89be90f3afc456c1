//! Advisory checks for include/ignore pattern lists.

use globset::Glob;

/// A pattern entry that globset could not compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    pub field: &'static str,
    pub pattern: String,
    pub reason: String,
}

impl PatternWarning {
    pub fn message(&self) -> String {
        format!("{} pattern '{}' looks invalid: {}", self.field, self.pattern, self.reason)
    }
}

/// Split a comma separated pattern list into trimmed, non-empty entries.
pub fn split_patterns(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Check every entry of `list`. Warnings never block an invocation.
pub fn validate(field: &'static str, list: Option<&str>) -> Vec<PatternWarning> {
    let Some(list) = list else {
        return Vec::new();
    };

    split_patterns(list)
        .into_iter()
        .filter_map(|pattern| match Glob::new(pattern) {
            Ok(_) => None,
            Err(err) => Some(PatternWarning {
                field,
                pattern: pattern.to_owned(),
                reason: err.kind().to_string(),
            }),
        })
        .collect()
}
