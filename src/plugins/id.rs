//! Plugin identity: `name` for standalone plugins, `name@marketplace` for
//! plugins declared inside a marketplace manifest.

use super::PluginError;

pub const MARKETPLACE_SEP: char = '@';

pub fn compose(plugin: &str, marketplace: &str) -> String {
    format!("{}{}{}", plugin, MARKETPLACE_SEP, marketplace)
}

/// Splits a composite id into `(plugin, marketplace)`.
pub fn parse(id: &str) -> Option<(&str, &str)> {
    id.split_once(MARKETPLACE_SEP)
}

pub fn is_composite(id: &str) -> bool {
    id.contains(MARKETPLACE_SEP)
}

pub fn plugin_name(id: &str) -> &str {
    parse(id).map(|(p, _)| p).unwrap_or(id)
}

/// Checks that a manifest-declared name can be used as (part of) an id.
/// A valid name is never composite, so standalone ids cannot collide with
/// `name@marketplace` ids.
pub fn validate_name(name: &str) -> Result<(), PluginError> {
    let invalid = |reason: String| PluginError::InvalidName {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("must not be empty".to_string()));
    }
    if is_composite(name) {
        return Err(invalid(format!(
            "must not contain marketplace separator '{}'",
            MARKETPLACE_SEP
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        assert_eq!(compose("tools", "acme"), "tools@acme");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("tools@acme"), Some(("tools", "acme")));
        assert_eq!(parse("standalone"), None);
    }

    #[test]
    fn test_is_composite() {
        assert!(is_composite("tools@acme"));
        assert!(!is_composite("tools"));
    }

    #[test]
    fn test_plugin_name() {
        assert_eq!(plugin_name("tools@acme"), "tools");
        assert_eq!(plugin_name("tools"), "tools");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("my-plugin").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());

        let err = validate_name("a@b").unwrap_err();
        assert!(matches!(&err, PluginError::InvalidName { name, .. } if name == "a@b"));
        assert!(err.to_string().contains("separator"));
    }
}
