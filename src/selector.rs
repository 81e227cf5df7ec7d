//! Field selector path expressions.
//!
//! A field whose name starts with `$.` or `$[` is a path expression into the
//! upstream object: dot steps (`$.properties.name`), quoted bracket steps
//! (`$["properties"]["first name"]`), and numeric index steps
//! (`$.contacts[0].id`). Everything else is a plain top-level key.
//!
//! Evaluation distinguishes data that is absent from expressions that are
//! unreadable: a missing key or out-of-range index is [`PathOutcome::MissingLeaf`],
//! while text that does not form a path at all is
//! [`PathOutcome::InvalidExpression`].

use serde_json::Value;

/// One navigation step of a parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Result of evaluating a path expression against an object.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// The path resolved to a value.
    Found(Value),
    /// The path was well formed but the data ran out along the way.
    MissingLeaf,
    /// The expression itself could not be parsed.
    InvalidExpression(String),
}

/// Whether a field name should be treated as a path expression.
pub fn is_path_selector(field: &str) -> bool {
    field.starts_with("$.") || field.starts_with("$[")
}

/// Evaluates `selector` against `object`.
pub fn evaluate(selector: &str, object: &Value) -> PathOutcome {
    let steps = match parse_steps(selector) {
        Ok(steps) => steps,
        Err(reason) => return PathOutcome::InvalidExpression(reason),
    };
    let mut current = object;
    for step in &steps {
        current = match step {
            PathStep::Key(name) => match current.as_object().and_then(|map| map.get(name)) {
                Some(value) => value,
                None => return PathOutcome::MissingLeaf,
            },
            PathStep::Index(index) => match current.as_array().and_then(|items| items.get(*index)) {
                Some(value) => value,
                None => return PathOutcome::MissingLeaf,
            },
        };
    }
    PathOutcome::Found(current.clone())
}

/// Parses a selector into navigation steps.
///
/// The grammar is a leading `$` followed by any number of `.name`,
/// `["name"]` / `['name']`, or `[index]` steps.
pub fn parse_steps(selector: &str) -> Result<Vec<PathStep>, String> {
    let rest = selector
        .strip_prefix('$')
        .ok_or_else(|| "path expressions must start with '$'".to_string())?;
    let mut steps = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                if name.is_empty() {
                    return Err("empty property name after '.'".to_string());
                }
                steps.push(PathStep::Key(name));
            }
            '[' => match chars.peek().copied() {
                Some(quote @ ('"' | '\'')) => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some(next) if next == quote => break,
                            Some(next) => name.push(next),
                            None => return Err("unterminated quoted name".to_string()),
                        }
                    }
                    if chars.next() != Some(']') {
                        return Err("expected ']' after quoted name".to_string());
                    }
                    steps.push(PathStep::Key(name));
                }
                Some(digit) if digit.is_ascii_digit() => {
                    let mut digits = String::new();
                    while let Some(&next) = chars.peek() {
                        if !next.is_ascii_digit() {
                            break;
                        }
                        digits.push(next);
                        chars.next();
                    }
                    if chars.next() != Some(']') {
                        return Err("expected ']' after index".to_string());
                    }
                    let index = digits
                        .parse()
                        .map_err(|_| format!("index '{}' is out of range", digits))?;
                    steps.push(PathStep::Index(index));
                }
                _ => return Err("expected a quoted name or an index inside '[]'".to_string()),
            },
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    if steps.is_empty() {
        return Err("the expression selects nothing".to_string());
    }
    Ok(steps)
}
