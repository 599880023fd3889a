//! Template helpers
//!
//! The helper set is closed: `eq`, `or` and `uppercase`. Each helper is a pure
//! function; a [`TemplateHelpers`] value selects which ones a render call gets,
//! and the renderer registers them into a registry owned by that call only.

use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

/// Helpers available to `.hbs` templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    /// `{{#if (eq orm "prisma")}}`
    Eq,
    /// `{{#if (or twoFactor rbac)}}`
    Or,
    /// `{{uppercase provider}}`
    Uppercase,
}

impl Helper {
    pub const ALL: &'static [Helper] = &[Helper::Eq, Helper::Or, Helper::Uppercase];

    /// Name used inside templates
    pub fn name(&self) -> &'static str {
        match self {
            Helper::Eq => "eq",
            Helper::Or => "or",
            Helper::Uppercase => "uppercase",
        }
    }
}

/// Set of helpers handed to a single render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHelpers {
    helpers: Vec<Helper>,
}

impl TemplateHelpers {
    /// All helpers the shipped templates rely on
    pub fn standard() -> Self {
        Self {
            helpers: Helper::ALL.to_vec(),
        }
    }

    /// No helpers; plain interpolation and built-in blocks only
    pub fn none() -> Self {
        Self {
            helpers: Vec::new(),
        }
    }

    pub fn with(mut self, helper: Helper) -> Self {
        if !self.helpers.contains(&helper) {
            self.helpers.push(helper);
        }
        self
    }

    pub fn contains(&self, helper: Helper) -> bool {
        self.helpers.contains(&helper)
    }

    /// Register the selected helpers into a registry
    pub(crate) fn install(&self, registry: &mut Handlebars<'_>) {
        for helper in &self.helpers {
            match helper {
                Helper::Eq => {
                    registry.register_helper(helper.name(), Box::new(eq_helper));
                }
                Helper::Or => {
                    registry.register_helper(helper.name(), Box::new(or_helper));
                }
                Helper::Uppercase => {
                    registry.register_helper(helper.name(), Box::new(uppercase_helper));
                }
            }
        }
    }
}

impl Default for TemplateHelpers {
    fn default() -> Self {
        Self::standard()
    }
}

/// Strict equality of two template values
pub fn equals(a: &Value, b: &Value) -> bool {
    a == b
}

/// True if any argument is truthy
pub fn any_truthy(values: &[&Value]) -> bool {
    values.iter().any(|v| is_truthy(v))
}

/// Uppercase a string value
pub fn uppercase(s: &str) -> String {
    s.to_uppercase()
}

/// Handlebars truthiness: empty strings, empty arrays, zero, null and false are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

handlebars_helper!(eq_helper: |a: Json, b: Json| equals(a, b));
handlebars_helper!(or_helper: |*args| any_truthy(&args));
handlebars_helper!(uppercase_helper: |s: str| uppercase(s));

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(helpers: &TemplateHelpers, template: &str, data: &Value) -> String {
        let mut registry = Handlebars::new();
        helpers.install(&mut registry);
        registry.render_template(template, data).unwrap()
    }

    #[test]
    fn test_equals() {
        assert!(equals(&json!("prisma"), &json!("prisma")));
        assert!(!equals(&json!("prisma"), &json!("drizzle")));
        assert!(!equals(&json!(1), &json!("1")));
    }

    #[test]
    fn test_any_truthy() {
        assert!(any_truthy(&[&json!(false), &json!("x")]));
        assert!(!any_truthy(&[&json!(false), &json!(""), &json!([]), &json!(null)]));
        assert!(!any_truthy(&[]));
    }

    #[test]
    fn test_uppercase() {
        assert_eq!(uppercase("github"), "GITHUB");
    }

    #[test]
    fn test_eq_in_template() {
        let out = render(
            &TemplateHelpers::standard(),
            r#"{{#if (eq orm "prisma")}}prisma{{else}}other{{/if}}"#,
            &json!({"orm": "prisma"}),
        );
        assert_eq!(out, "prisma");
    }

    #[test]
    fn test_or_in_template() {
        let template = "{{#if (or twoFactor rbac)}}plugins{{/if}}";
        let helpers = TemplateHelpers::standard();
        assert_eq!(
            render(&helpers, template, &json!({"twoFactor": false, "rbac": true})),
            "plugins"
        );
        assert_eq!(
            render(&helpers, template, &json!({"twoFactor": false, "rbac": false})),
            ""
        );
    }

    #[test]
    fn test_uppercase_in_each() {
        let out = render(
            &TemplateHelpers::standard(),
            "{{#each providers}}{{uppercase this}}_CLIENT_ID\n{{/each}}",
            &json!({"providers": ["github", "google"]}),
        );
        assert_eq!(out, "GITHUB_CLIENT_ID\nGOOGLE_CLIENT_ID\n");
    }

    #[test]
    fn test_with_deduplicates() {
        let helpers = TemplateHelpers::none()
            .with(Helper::Uppercase)
            .with(Helper::Uppercase);
        assert!(helpers.contains(Helper::Uppercase));
        assert!(!helpers.contains(Helper::Eq));
        assert_eq!(helpers, TemplateHelpers::none().with(Helper::Uppercase));
    }
}
