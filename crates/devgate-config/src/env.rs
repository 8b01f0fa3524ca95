use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Matches `{{ env.VAR }}` and `{{ env.VAR | default("fallback") }}`
fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Expand environment placeholders in raw TOML text
///
/// Comment lines are copied through untouched, so a commented-out
/// placeholder for an unset variable is not an error.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut expanded = String::with_capacity(line.len());
    let mut cursor = 0;

    for captures in placeholder().captures_iter(line) {
        let Some(whole) = captures.get(0) else { continue };

        expanded.push_str(&line[cursor..whole.start()]);
        expanded.push_str(&resolve(&captures)?);
        cursor = whole.end();
    }

    expanded.push_str(&line[cursor..]);
    Ok(expanded)
}

fn resolve(captures: &Captures<'_>) -> Result<String, String> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(var_name) = key.strip_prefix("env.").filter(|name| !name.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(var_name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(default)) => Ok(default.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{var_name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "port = 3000\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_variable() {
        temp_env::with_var("DEVGATE_TEST_BACKEND", Some("http://localhost:5000"), || {
            let result = expand_env("target = \"{{ env.DEVGATE_TEST_BACKEND }}\"").unwrap();
            assert_eq!(result, "target = \"http://localhost:5000\"");
        });
    }

    #[test]
    fn expands_several_variables_on_one_line() {
        let vars = [("DEVGATE_TEST_HOST", Some("localhost")), ("DEVGATE_TEST_PORT", Some("5000"))];
        temp_env::with_vars(vars, || {
            let result = expand_env("target = \"http://{{ env.DEVGATE_TEST_HOST }}:{{env.DEVGATE_TEST_PORT}}\"").unwrap();
            assert_eq!(result, "target = \"http://localhost:5000\"");
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("DEVGATE_TEST_MISSING", || {
            let err = expand_env("target = \"{{ env.DEVGATE_TEST_MISSING }}\"").unwrap_err();
            assert!(err.contains("DEVGATE_TEST_MISSING"));
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("DEVGATE_TEST_OPTIONAL", || {
            let result = expand_env("origin = \"{{ env.DEVGATE_TEST_OPTIONAL | default(\"http://localhost:3000\") }}\"").unwrap();
            assert_eq!(result, "origin = \"http://localhost:3000\"");
        });

        temp_env::with_var("DEVGATE_TEST_OPTIONAL", Some("http://127.0.0.1:3000"), || {
            let result = expand_env("origin = \"{{ env.DEVGATE_TEST_OPTIONAL | default(\"http://localhost:3000\") }}\"").unwrap();
            assert_eq!(result, "origin = \"http://127.0.0.1:3000\"");
        });
    }

    #[test]
    fn rejects_other_scopes() {
        let err = expand_env("target = \"{{ secrets.BACKEND }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("DEVGATE_TEST_MISSING", || {
            let input = "  # target = \"{{ env.DEVGATE_TEST_MISSING }}\"\nport = 3000";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
