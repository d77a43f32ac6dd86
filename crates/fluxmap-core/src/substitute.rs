//! `${name}` token replacement for `spec.postBuild.substitute`

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `${name}` where the name holds no brace or `$`, so the innermost token
/// of `${a${b}}` is the one matched.
static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^{}$]*)\}").unwrap());

/// Replace every `${name}` token whose name is mapped.
///
/// Single pass over the input: replacement values are not scanned again,
/// unmapped and unterminated tokens are copied through untouched.
pub fn substitute(input: &str, vars: &BTreeMap<String, String>) -> String {
    if vars.is_empty() {
        return input.to_string();
    }

    VARIABLE_PATTERN
        .replace_all(input, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
