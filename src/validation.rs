//! Composable request-field validation rules.
//!
//! A [`Rule`] wraps a plain predicate over the raw string value of a request
//! field. Handlers and managers pair a rule with the [`DomainError`] to raise
//! when it fails, keeping the field → rule → error tables of each operation
//! in one place instead of spreading ad-hoc checks around.

use email_address::EmailAddress;

use crate::error::DomainError;

/// A validation rule over a raw request field.
pub struct Rule(Box<dyn Fn(&str) -> bool + Send + Sync>);

impl Rule {
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Rule(Box::new(predicate))
    }

    /// Run the rule against a field value.
    pub fn check(&self, input: &str) -> bool {
        (self.0)(input)
    }

    /// Run the rule, raising `err` on failure.
    pub fn require(&self, input: &str, err: DomainError) -> Result<(), DomainError> {
        if self.check(input) { Ok(()) } else { Err(err) }
    }
}

/// Character count within `[min, max]`, inclusive.
pub fn length(min: usize, max: usize) -> Rule {
    Rule::new(move |input| {
        let len = input.chars().count();
        len >= min && len <= max
    })
}

/// Exact match against a literal.
pub fn equals(expected: &'static str) -> Rule {
    Rule::new(move |input| input == expected)
}

/// Passes when any of the given rules passes.
pub fn one_of(rules: impl IntoIterator<Item = Rule>) -> Rule {
    let rules: Vec<Rule> = rules.into_iter().collect();
    Rule::new(move |input| rules.iter().any(|rule| rule.check(input)))
}

/// RFC-compliant email address syntax.
pub fn email() -> Rule {
    Rule::new(|input| EmailAddress::is_valid(input))
}

/// A well-formed custom-field options payload: a JSON array of at most
/// [`crate::fields::MAX_OPTIONS`] strings, each at most
/// [`crate::fields::MAX_OPTION_LEN`] characters.
pub fn custom_field_options() -> Rule {
    Rule::new(|input| crate::fields::parse_options(Some(input)).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let rule = length(2, 4);
        assert!(rule.check("ab"));
        assert!(rule.check("äöüß"));
        assert!(!rule.check("a"));
        assert!(!rule.check("abcde"));
    }

    #[test]
    fn one_of_passes_when_any_member_passes() {
        let rule = one_of([equals("text"), equals("select")]);
        assert!(rule.check("text"));
        assert!(rule.check("select"));
        assert!(!rule.check("textarea"));
        assert!(!rule.check(""));
    }

    #[test]
    fn email_rejects_garbage() {
        let rule = email();
        assert!(rule.check("agent@example.com"));
        assert!(!rule.check("not-an-email"));
        assert!(!rule.check("@example.com"));
    }

    #[test]
    fn require_maps_failure_to_the_given_error() {
        let err = length(2, 100)
            .require("x", DomainError::InvalidName)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidName));
    }

    #[test]
    fn custom_field_options_rule_matches_parser() {
        let rule = custom_field_options();
        assert!(rule.check(r#"["Low","High"]"#));
        assert!(!rule.check(r#"{"not":"an array"}"#));
        assert!(!rule.check("not json"));
    }
}
