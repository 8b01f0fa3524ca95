use std::sync::OnceLock;

use devgate_config::HeaderRuleConfig;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use regex::Regex;

/// Validated header rule applied to an outgoing request
#[derive(Debug, Clone)]
pub enum HeaderRule {
    /// Set a header, replacing every existing value
    Insert { name: HeaderName, value: HeaderValue },
    /// Remove headers by exact name or pattern
    Remove(NameOrPattern),
    /// Copy a header under a new name, keeping the original
    RenameDuplicate {
        name: HeaderName,
        rename: HeaderName,
        default: Option<HeaderValue>,
    },
}

/// Either a specific header name or a regex matched against header names
#[derive(Debug, Clone)]
pub enum NameOrPattern {
    Name(HeaderName),
    Pattern(Regex),
}

impl NameOrPattern {
    /// A leading `^` marks a regex, as with proxy contexts
    fn parse(raw: &str) -> Result<Self, InvalidHeaderRule> {
        if raw.starts_with('^') {
            Regex::new(raw)
                .map(Self::Pattern)
                .map_err(|e| InvalidHeaderRule::Pattern(raw.to_string(), e.to_string()))
        } else {
            parse_name(raw).map(Self::Name)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidHeaderRule {
    #[error("invalid header name '{0}'")]
    Name(String),
    #[error("invalid header value '{0}'")]
    Value(String),
    #[error("invalid header pattern '{0}': {1}")]
    Pattern(String, String),
}

impl TryFrom<&HeaderRuleConfig> for HeaderRule {
    type Error = InvalidHeaderRule;

    fn try_from(config: &HeaderRuleConfig) -> Result<Self, Self::Error> {
        Ok(match config {
            HeaderRuleConfig::Insert { name, value } => Self::Insert {
                name: parse_name(name)?,
                value: parse_value(value)?,
            },
            HeaderRuleConfig::Remove { name } => Self::Remove(NameOrPattern::parse(name)?),
            HeaderRuleConfig::RenameDuplicate { name, rename, default } => Self::RenameDuplicate {
                name: parse_name(name)?,
                rename: parse_name(rename)?,
                default: default.as_deref().map(parse_value).transpose()?,
            },
        })
    }
}

fn parse_name(raw: &str) -> Result<HeaderName, InvalidHeaderRule> {
    HeaderName::try_from(raw).map_err(|_| InvalidHeaderRule::Name(raw.to_string()))
}

fn parse_value(raw: &str) -> Result<HeaderValue, InvalidHeaderRule> {
    HeaderValue::try_from(raw).map_err(|_| InvalidHeaderRule::Value(raw.to_string()))
}

/// Apply header rules, in order, to an outgoing header map
pub fn apply_header_rules(headers: &mut HeaderMap, rules: &[HeaderRule]) {
    for rule in rules {
        match rule {
            HeaderRule::Insert { name, value } => {
                headers.insert(name.clone(), value.clone());
            }
            HeaderRule::Remove(NameOrPattern::Name(name)) => {
                headers.remove(name);
            }
            HeaderRule::Remove(NameOrPattern::Pattern(pattern)) => {
                let matching: Vec<_> = headers
                    .keys()
                    .filter(|key| pattern.is_match(key.as_str()))
                    .cloned()
                    .collect();

                for key in matching {
                    headers.remove(&key);
                }
            }
            HeaderRule::RenameDuplicate { name, rename, default } => {
                let value = headers.get(name).cloned().or_else(|| default.clone());

                if let Some(value) = value {
                    headers.insert(name.clone(), value.clone());
                    headers.insert(rename.clone(), value);
                }
            }
        }
    }
}

/// Connection-scoped headers a proxy must not forward
static HOP_BY_HOP: OnceLock<[HeaderName; 9]> = OnceLock::new();

/// Get the hop-by-hop header list
pub fn hop_by_hop_headers() -> &'static [HeaderName] {
    HOP_BY_HOP.get_or_init(|| {
        [
            header::CONNECTION,
            HeaderName::from_static("keep-alive"),
            HeaderName::from_static("proxy-connection"),
            header::PROXY_AUTHENTICATE,
            header::PROXY_AUTHORIZATION,
            header::TE,
            header::TRAILER,
            header::TRANSFER_ENCODING,
            header::UPGRADE,
        ]
    })
}

/// Remove hop-by-hop headers, including any named by `Connection`
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();

    for name in listed.iter().chain(hop_by_hop_headers()) {
        headers.remove(name);
    }
}
