use serde::Deserialize;

/// Opaque framework plugin descriptor
///
/// devgate does not run plugins; descriptors are carried through to the
/// server so they show up in startup logs and can be inspected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default)]
    pub options: toml::Table,
}

impl PluginConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: toml::Table::new(),
        }
    }
}
