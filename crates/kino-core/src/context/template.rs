//! `{{ placeholder }}` substitution for `write(..., args)`.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::Result;

/// Render `text` as a Jinja-style template with `args` as its context.
///
/// Undefined variables are errors rather than empty strings.
pub fn render<S: Serialize>(text: &str, args: S) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    Ok(env.render_str(text, args)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KinoError;
    use serde_json::json;

    #[test]
    fn substitutes_placeholders() {
        let out = render("Hello {{name}}", json!({"name": "Alice"})).unwrap();
        assert_eq!(out, "Hello Alice");
    }

    #[test]
    fn supports_filters_and_loops() {
        let out = render(
            "{% for m in modules %}{{ m | upper }};{% endfor %}",
            json!({"modules": ["api", "web"]}),
        )
        .unwrap();
        assert_eq!(out, "API;WEB;");
    }

    #[test]
    fn undefined_variable_is_error() {
        let err = render("package {{package}};", json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, KinoError::Template(_)));
    }

    #[test]
    fn syntax_error_is_error() {
        let err = render("{% if %}", json!({})).unwrap_err();
        assert!(matches!(err, KinoError::Template(_)));
    }
}
