//! Variable expansion in `folio.toml` values.
//!
//! Site text (`site.title`, `site.description`, `site.url`) accepts
//! `${VAR}` and `${VAR:-default}`. Path settings accept the same forms plus
//! a leading `~` for the home directory, so a project can keep its content
//! outside the config directory.

use std::borrow::Cow;
use std::env::VarError;

use shellexpand::LookupError;

use crate::ConfigError;

/// Expand a site text field.
///
/// Text without `${` is returned as written, so prices and shell snippets
/// in a description keep their bare `$`.
pub(crate) fn text(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env(value)
        .map(Cow::into_owned)
        .map_err(|e| unset(field, &e))
}

/// Expand an optional path setting in place.
pub(crate) fn path(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value {
        *raw = shellexpand::full(raw.as_str())
            .map(Cow::into_owned)
            .map_err(|e| unset(field, &e))?;
    }
    Ok(())
}

fn unset(field: &str, error: &LookupError<VarError>) -> ConfigError {
    ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", error.var_name),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_text_with_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_UNSET_TITLE");
        }
        let title = text("${FOLIO_TEST_UNSET_TITLE:-Guide} (draft)", "site.title").unwrap();
        assert_eq!(title, "Guide (draft)");
    }

    #[test]
    fn test_text_embedded_host() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_HOST", "staging.example.com");
        }
        let url = text("https://${FOLIO_TEST_HOST}", "site.url").unwrap();
        assert_eq!(url, "https://staging.example.com");
    }

    #[test]
    fn test_text_unset_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("FOLIO_TEST_MISSING");
        }
        let err = text("${FOLIO_TEST_MISSING}", "site.description").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in site.description: ${FOLIO_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_text_keeps_bare_dollar() {
        let description = text("Audits from $500", "site.description").unwrap();
        assert_eq!(description, "Audits from $500");
    }

    #[test]
    fn test_path_expands_variable() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("FOLIO_TEST_CONTENT", "/srv/content");
        }
        let mut value = Some("${FOLIO_TEST_CONTENT}/pages".to_owned());
        path(&mut value, "build.source_dir").unwrap();
        assert_eq!(value.as_deref(), Some("/srv/content/pages"));
    }

    #[test]
    fn test_path_expands_home() {
        let home = std::env::var("HOME").unwrap();
        let mut value = Some("~/sites/guide".to_owned());
        path(&mut value, "build.output_dir").unwrap();
        assert_eq!(value, Some(format!("{}/sites/guide", home.trim_end_matches('/'))));
    }

    #[test]
    fn test_path_unset_stays_unset() {
        let mut value = None;
        path(&mut value, "templates.dir").unwrap();
        assert_eq!(value, None);
    }
}
