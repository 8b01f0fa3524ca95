use serde::Deserialize;

/// One step of the header pipeline run on outgoing proxied requests
///
/// Written inline in a rule's `headers` array:
///
/// ```toml
/// headers = [
///     { type = "insert", name = "origin", value = "http://localhost:3000" },
///     { type = "remove", name = "^x-debug-" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum HeaderRuleConfig {
    /// Set `name`, replacing every existing value
    Insert { name: String, value: String },
    /// Drop `name`; a leading `^` makes it a regex over header names
    Remove { name: String },
    /// Copy `name` to `rename`, falling back to `default` when absent
    RenameDuplicate {
        name: String,
        rename: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl HeaderRuleConfig {
    pub fn insert(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Insert {
            name: name.into(),
            value: value.into(),
        }
    }
}
