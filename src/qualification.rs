//! Qualification parsing.
//!
//! Qualifications are `name=value` query strings whose values may embed
//! `<%=parameter["Name"]%>` or `<%=field["Name"]%>` placeholders. This module
//! substitutes placeholders from a caller-supplied scope, splits query strings
//! into parameter maps, and parses `order` metadata into sort items.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::BridgeError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<%=\s*(parameter|field)\[\s*"([^"]*)"\s*\]\s*%>"#).expect("valid placeholder pattern")
});

static ORDER_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^<%=\s*field\[\s*"([^"]*)"\s*\]\s*%>$"#).expect("valid order field pattern")
});

/// Replaces every placeholder in `template` with its value from `scope`.
///
/// Literal text passes through untouched. A placeholder naming a value the
/// scope does not hold fails the whole parse.
pub fn parse(template: &str, scope: &HashMap<String, String>) -> Result<String, BridgeError> {
    let mut output = String::with_capacity(template.len());
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let matched = captures.get(0).expect("a match always has a group 0");
        let kind = &captures[1];
        let name = &captures[2];
        let value = scope
            .get(name)
            .ok_or_else(|| BridgeError::UnresolvedPlaceholder {
                reference: format!("{}[\"{}\"]", kind, name),
            })?;
        output.push_str(&template[last..matched.start()]);
        output.push_str(value);
        last = matched.end();
    }
    output.push_str(&template[last..]);
    Ok(output)
}

/// Splits a `name=value&name=value` query string into a parameter map.
///
/// A pair without `=` maps to the empty string. Values are kept verbatim,
/// no URL decoding happens here. Later duplicates win.
pub fn parse_parameters(query: &str) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    if query.trim().is_empty() {
        return parameters;
    }
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => parameters.insert(name.to_string(), value.to_string()),
            None => parameters.insert(pair.to_string(), String::new()),
        };
    }
    parameters
}

/// Parses `order` metadata into `(property, direction)` items.
///
/// Each comma-separated item is `property:direction`, where the property may
/// be wrapped as `<%=field["name"]%>` and the direction defaults to `ASC`.
/// Repeating a property keeps its first position but takes the last
/// direction. Directions are normalized to `ASC` or `DESC`.
pub fn parse_order(order: &str) -> Vec<(String, String)> {
    let mut items: Vec<(String, String)> = Vec::new();
    for part in order.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (property, direction) = match part.rsplit_once(':') {
            Some((property, direction)) => (property.trim(), direction.trim()),
            None => (part, "ASC"),
        };
        let name = ORDER_FIELD
            .captures(property)
            .map(|captures| captures[1].to_string())
            .unwrap_or_else(|| property.to_string());
        let direction = if direction.eq_ignore_ascii_case("DESC") {
            "DESC"
        } else {
            "ASC"
        };
        match items.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = direction.to_string(),
            None => items.push((name, direction.to_string())),
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_parameter_placeholders() {
        let scope = scope(&[("Username", "tom.cat")]);
        let parsed = parse("username=<%=parameter[\"Username\"]%>", &scope).unwrap();
        assert_eq!(parsed, "username=tom.cat");
    }

    #[test]
    fn substitutes_field_placeholders_from_the_same_scope() {
        let scope = scope(&[("First Name", "Tom")]);
        let parsed = parse("firstname=<%=field[\"First Name\"]%>", &scope).unwrap();
        assert_eq!(parsed, "firstname=Tom");
    }

    #[test]
    fn tolerates_whitespace_inside_the_placeholder() {
        let scope = scope(&[("Id", "512")]);
        let parsed = parse("<%= parameter[ \"Id\" ] %>", &scope).unwrap();
        assert_eq!(parsed, "512");
    }

    #[test]
    fn leaves_literal_text_untouched() {
        let scope = scope(&[("Id", "512")]);
        let parsed = parse("id=<%=parameter[\"Id\"]%>&archived=false", &scope).unwrap();
        assert_eq!(parsed, "id=512&archived=false");
    }

    #[test]
    fn missing_placeholder_value_fails() {
        let error = parse("id=<%=parameter[\"Id\"]%>", &HashMap::new()).unwrap_err();
        assert!(matches!(
            error,
            BridgeError::UnresolvedPlaceholder { ref reference } if reference == "parameter[\"Id\"]"
        ));
    }

    #[test]
    fn template_without_placeholders_is_returned_as_is() {
        let parsed = parse("limit=10&archived=true", &HashMap::new()).unwrap();
        assert_eq!(parsed, "limit=10&archived=true");
    }

    #[test]
    fn splits_pairs_into_a_map() {
        let parameters = parse_parameters("id=512&archived=false");
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters.get("id").unwrap(), "512");
        assert_eq!(parameters.get("archived").unwrap(), "false");
    }

    #[test]
    fn empty_query_yields_an_empty_map() {
        assert!(parse_parameters("").is_empty());
        assert!(parse_parameters("   ").is_empty());
    }

    #[test]
    fn value_may_contain_equals_signs() {
        let parameters = parse_parameters("filter=a=b");
        assert_eq!(parameters.get("filter").unwrap(), "a=b");
    }

    #[test]
    fn pair_without_equals_maps_to_empty_string() {
        let parameters = parse_parameters("archived");
        assert_eq!(parameters.get("archived").unwrap(), "");
    }

    #[test]
    fn later_duplicates_win() {
        let parameters = parse_parameters("limit=10&limit=25");
        assert_eq!(parameters.get("limit").unwrap(), "25");
    }

    #[test]
    fn order_unwraps_field_placeholders() {
        let items = parse_order("<%=field[\"name\"]%>:ASC");
        assert_eq!(items, vec![("name".to_string(), "ASC".to_string())]);
    }

    #[test]
    fn order_accepts_bare_property_names() {
        let items = parse_order("createdate:DESC");
        assert_eq!(items, vec![("createdate".to_string(), "DESC".to_string())]);
    }

    #[test]
    fn order_direction_defaults_to_ascending() {
        let items = parse_order("name");
        assert_eq!(items, vec![("name".to_string(), "ASC".to_string())]);
    }

    #[test]
    fn order_normalizes_direction_case() {
        let items = parse_order("name:desc");
        assert_eq!(items, vec![("name".to_string(), "DESC".to_string())]);
    }

    #[test]
    fn repeated_property_takes_the_last_direction() {
        let items = parse_order("name:ASC,name:DESC");
        assert_eq!(items, vec![("name".to_string(), "DESC".to_string())]);
    }

    #[test]
    fn distinct_properties_are_kept_in_order() {
        let items = parse_order("name:ASC,createdate:DESC");
        assert_eq!(
            items,
            vec![
                ("name".to_string(), "ASC".to_string()),
                ("createdate".to_string(), "DESC".to_string()),
            ]
        );
    }

    #[test]
    fn empty_order_yields_no_items() {
        assert!(parse_order("").is_empty());
    }
}
