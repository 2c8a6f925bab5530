//! Parsing of string-encoded rules
//!
//! Older schemas list rules as short strings such as `"required"` or
//! `"minLength:3"`. Each string parses into the same [`Rule`] a structured
//! definition would produce.

use regex::RegexBuilder;
use std::str::FromStr;

use crate::error::{FormError, Result};
use crate::rule::Rule;

impl FromStr for Rule {
    type Err = FormError;

    /// Parse `name[:param]`. Unrecognized names become [`Rule::unknown`] so
    /// that the evaluator decides how to treat them.
    fn from_str(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let (name, param) = match encoded.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (encoded, None),
        };

        if name.is_empty() {
            return Err(FormError::invalid_rule("empty rule name"));
        }

        match name {
            "required" => Ok(Rule::required()),
            "email" => Ok(Rule::email()),
            "minLength" => Ok(Rule::min_length(parse_bound(name, param)?)),
            "maxLength" => Ok(Rule::max_length(parse_bound(name, param)?)),
            "pattern" => {
                let literal = param.ok_or_else(|| {
                    FormError::invalid_rule("pattern requires an expression, e.g. 'pattern:^[a-z]+$'")
                })?;
                Ok(Rule::from_regex(compile_pattern(literal)?))
            }
            "custom" => Err(FormError::invalid_rule(
                "custom rules carry a predicate and must be built in code",
            )),
            other => Ok(Rule::unknown(other)),
        }
    }
}

/// Parse a length bound parameter
pub(crate) fn parse_bound(rule: &str, param: Option<&str>) -> Result<usize> {
    let raw = param.ok_or_else(|| {
        FormError::invalid_rule(format!("{} requires a length, e.g. '{}:3'", rule, rule))
    })?;
    raw.trim().parse::<usize>().map_err(|_| {
        FormError::invalid_rule(format!(
            "{} expects a non-negative integer, got '{}'",
            rule, raw
        ))
    })
}

/// Compile a pattern written either bare (`^[a-z]+$`) or as a slash-delimited
/// literal with flags (`/^[a-z]+$/i`).
///
/// Input is read as a literal only when it starts with `/` and everything
/// after the last `/` is a JavaScript flag letter, so `/api/v1` stays a bare
/// pattern. Supported flags: `i` (case-insensitive), `m` (multi-line), `s`
/// (dot matches newline). `g` and `u` are accepted and ignored.
pub fn compile_pattern(literal: &str) -> Result<regex::Regex> {
    let (source, flags) = split_literal(literal);

    let mut builder = RegexBuilder::new(source);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'u' => {}
            other => {
                return Err(FormError::invalid_rule(format!(
                    "unsupported pattern flag '{}' in {}",
                    other, literal
                )))
            }
        }
    }

    Ok(builder.build()?)
}

const LITERAL_FLAGS: &str = "dgimsuvy";

fn split_literal(literal: &str) -> (&str, &str) {
    if let Some(body) = literal.strip_prefix('/') {
        if let Some(end) = body.rfind('/') {
            let flags = &body[end + 1..];
            if flags.chars().all(|c| LITERAL_FLAGS.contains(c)) {
                return (&body[..end], flags);
            }
        }
    }
    (literal, "")
}
