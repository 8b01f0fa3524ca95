use devgate_config::ServerConfig;

use crate::ProxyRule;

/// Ordered proxy routing table; the first matching rule wins
#[derive(Debug, Clone, Default)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    pub const fn new(rules: Vec<ProxyRule>) -> Self {
        Self { rules }
    }

    /// Build the table from `server.proxy`, preserving declaration order
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails to build
    pub fn from_config(config: &ServerConfig) -> crate::Result<Self> {
        let rules = config
            .proxy
            .iter()
            .map(|(context, rule)| ProxyRule::from_config(context, rule))
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// First rule whose context matches the path and query
    pub fn find(&self, path_and_query: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path_and_query))
    }

    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
