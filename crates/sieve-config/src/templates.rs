//! Configuration templates for `sieve init`.
//!
//! Templates are kept as valid TOML files listing every default, and are
//! written out commented, so a fresh file changes nothing until edited.

/// Project configuration template (valid TOML).
const LOCAL_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Global configuration template (valid TOML).
const GLOBAL_TEMPLATE: &str = include_str!("../templates/config-global.toml");

/// Returns the project configuration template, commented out.
pub fn local_template() -> String {
    comment_out(LOCAL_TEMPLATE)
}

/// Returns the global configuration template, commented out.
pub fn global_template() -> String {
    comment_out(GLOBAL_TEMPLATE)
}

/// Prefixes every setting and section line with `# `.
///
/// Existing comments and blank lines pass through unchanged.
fn comment_out(template: &str) -> String {
    template
        .lines()
        .map(|line| {
            if line.is_empty() || line.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, parse::parse_config};

    #[test]
    fn raw_templates_parse_as_valid_config() {
        for template in [LOCAL_TEMPLATE, GLOBAL_TEMPLATE] {
            let result = parse_config(template);
            assert!(result.is_ok(), "template failed to parse: {result:?}");
        }
    }

    #[test]
    fn raw_template_lists_defaults() {
        let defaults = Config::default();
        let parsed = parse_config(LOCAL_TEMPLATE).unwrap();
        let parser = parsed.parser.unwrap();
        assert_eq!(parser.max_depth, Some(defaults.parser.max_depth));
        assert_eq!(
            parser.placeholder_max_len,
            Some(defaults.parser.placeholder_max_len)
        );
    }

    #[test]
    fn both_templates_cover_the_cache() {
        let defaults = Config::default().cache;
        for template in [LOCAL_TEMPLATE, GLOBAL_TEMPLATE] {
            let cache = parse_config(template).unwrap().cache.unwrap();
            assert_eq!(cache.enabled, Some(defaults.enabled));
            assert_eq!(cache.capacity, Some(defaults.capacity));
        }
    }

    #[test]
    fn rendered_templates_are_inert() {
        for template in [local_template(), global_template()] {
            assert!(
                template
                    .lines()
                    .all(|line| line.is_empty() || line.starts_with('#'))
            );
            let parsed = parse_config(&template).unwrap();
            assert!(parsed.root.is_none());
            assert!(parsed.parser.is_none());
        }
    }

    #[test]
    fn comment_out_keeps_comments_and_blank_lines() {
        let input = "# note\n[parser]\n\nlike = \"sql\"\n";
        assert_eq!(
            comment_out(input),
            "# note\n# [parser]\n\n# like = \"sql\"\n"
        );
    }
}
