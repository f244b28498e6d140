//! Template interpolation for event narration.
//!
//! Templates use `{name}` placeholders. Any brace that is not part of a known
//! placeholder is an error, so a bad template never leaks into output.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ArenaError, Result};

/// Replace every `{key}` in `template` with its value from `vars`.
///
/// # Errors
///
/// Returns [`ArenaError::EventExecutionFailure`] on an unknown placeholder or
/// an unbalanced brace.
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(start) = rest.find(|c: char| c == '{' || c == '}') {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);
        if tail.starts_with('}') {
            return Err(ArenaError::EventExecutionFailure(format!(
                "unbalanced '}}' in template: {template}"
            )));
        }
        let Some(end) = tail.find('}') else {
            return Err(ArenaError::EventExecutionFailure(format!(
                "unclosed placeholder in template: {template}"
            )));
        };
        let key = &tail[1..end];
        let value = vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| {
                ArenaError::EventExecutionFailure(format!(
                    "unknown placeholder '{{{key}}}' in template: {template}"
                ))
            })?;
        out.push_str(value);
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Pick one template from a pool.
///
/// # Errors
///
/// Returns [`ArenaError::EventExecutionFailure`] if the pool is empty.
pub fn pick<'a, R: Rng + ?Sized>(pool: &'a [String], what: &str, rng: &mut R) -> Result<&'a str> {
    pool.choose(rng)
        .map(String::as_str)
        .ok_or_else(|| ArenaError::EventExecutionFailure(format!("no {what} templates")))
}

/// Join names as "A", "A and B", or "A, B and C".
#[must_use]
pub fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let text = render("{killer} corners {victim}.", &[("killer", "Ash"), ("victim", "Bo")]).unwrap();
        assert_eq!(text, "Ash corners Bo.");
    }

    #[test]
    fn test_render_rejects_unknown_and_unbalanced() {
        assert!(render("{who} waits", &[("victim", "Bo")]).is_err());
        assert!(render("{victim waits", &[("victim", "Bo")]).is_err());
        assert!(render("victim} waits", &[("victim", "Bo")]).is_err());
    }

    #[test]
    fn test_render_keeps_braces_in_values() {
        let text = render("{victim} falls", &[("victim", "{odd}")]).unwrap();
        assert_eq!(text, "{odd} falls");
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&[]), "");
        assert_eq!(join_names(&["A"]), "A");
        assert_eq!(join_names(&["A", "B"]), "A and B");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B and C");
    }
}
