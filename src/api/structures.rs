//! Structure dispatch and upstream path building.
//!
//! Each supported structure maps to a HubSpot CRM v3 object collection. The
//! path builder consumes the control keys it understands (`id`, `body`,
//! `accessor`) out of the parameter map; everything left over is forwarded to
//! HubSpot verbatim as query parameters.

use std::collections::HashMap;

use crate::qualification;

use super::error::BridgeError;

/// The closed set of structures the bridge can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Structure {
    Companies,
    Contacts,
    Tickets,
    /// Caller-directed escape hatch: the query names the path directly.
    Adhoc,
}

/// A qualification split into its upstream path (Adhoc only) and parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub raw_path: Option<String>,
    pub params: HashMap<String, String>,
}

/// The upstream path plus the parameters left after path building.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub path: String,
    pub params: HashMap<String, String>,
}

impl Structure {
    /// Maps a structure name to its variant.
    pub fn resolve(name: &str) -> Result<Self, BridgeError> {
        match name {
            "Companies" => Ok(Self::Companies),
            "Contacts" => Ok(Self::Contacts),
            "Tickets" => Ok(Self::Tickets),
            "Adhoc" => Ok(Self::Adhoc),
            other => Err(BridgeError::InvalidStructure(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Companies => "Companies",
            Self::Contacts => "Contacts",
            Self::Tickets => "Tickets",
            Self::Adhoc => "Adhoc",
        }
    }

    /// Splits a qualification into path and parameters.
    ///
    /// For Adhoc the text up to the first `?` is the upstream path and the
    /// rest is the query string. Other structures treat the whole text as a
    /// query string.
    pub fn parse_query(&self, query: &str) -> ParsedQuery {
        match self {
            Self::Adhoc => {
                let (path, tail) = match query.split_once('?') {
                    Some((path, tail)) => (path, tail),
                    None => (query, ""),
                };
                ParsedQuery {
                    raw_path: Some(path.to_string()),
                    params: qualification::parse_parameters(tail),
                }
            }
            _ => ParsedQuery {
                raw_path: None,
                params: qualification::parse_parameters(query),
            },
        }
    }

    /// Builds the upstream path, consuming the control keys this structure
    /// understands. The returned parameter map is what may still reach the
    /// wire.
    pub fn build_path(&self, parsed: ParsedQuery) -> Result<PathPlan, BridgeError> {
        let ParsedQuery { raw_path, mut params } = parsed;
        let path = match self {
            Self::Companies => object_path("/objects/companies", &mut params, true),
            Self::Contacts => object_path("/objects/contacts", &mut params, true),
            Self::Tickets => object_path("/objects/tickets", &mut params, false),
            Self::Adhoc => raw_path
                .filter(|path| !path.is_empty())
                .ok_or_else(|| BridgeError::MissingRequiredParameter {
                    structure: self.name().to_string(),
                    parameter: "path".to_string(),
                })?,
        };
        Ok(PathPlan { path, params })
    }

    /// Pops the accessor naming the results array inside a response.
    ///
    /// Fixed structures always answer under `results`; Adhoc callers must
    /// name theirs with an `accessor` parameter.
    pub fn resolve_accessor(
        &self,
        mut params: HashMap<String, String>,
    ) -> Result<(String, HashMap<String, String>), BridgeError> {
        match self {
            Self::Companies | Self::Contacts | Self::Tickets => {
                Ok(("results".to_string(), params))
            }
            Self::Adhoc => {
                let accessor = params.remove("accessor").ok_or_else(|| {
                    BridgeError::MissingRequiredParameter {
                        structure: self.name().to_string(),
                        parameter: "accessor".to_string(),
                    }
                })?;
                Ok((accessor, params))
            }
        }
    }
}

/// Appends `/{id}` when an id parameter is present, then `/search` when a
/// body parameter is present and the collection supports the search
/// endpoint. Tickets has no search endpoint, so its body key is left alone.
fn object_path(base: &str, params: &mut HashMap<String, String>, searchable: bool) -> String {
    let mut path = base.to_string();
    if let Some(id) = params.remove("id") {
        path.push('/');
        path.push_str(&id);
    }
    if searchable && params.remove("body").is_some() {
        path.push_str("/search");
    }
    path
}

/// Splits a structure string on `>` into trimmed segments.
pub fn split_structure(structure: &str) -> Vec<String> {
    structure
        .split('>')
        .map(|segment| segment.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn resolves_known_structures() {
        assert_eq!(Structure::resolve("Companies").unwrap(), Structure::Companies);
        assert_eq!(Structure::resolve("Contacts").unwrap(), Structure::Contacts);
        assert_eq!(Structure::resolve("Tickets").unwrap(), Structure::Tickets);
        assert_eq!(Structure::resolve("Adhoc").unwrap(), Structure::Adhoc);
    }

    #[test]
    fn unknown_structure_is_rejected_by_name() {
        let error = Structure::resolve("Deals").unwrap_err();
        assert!(matches!(error, BridgeError::InvalidStructure(ref name) if name == "Deals"));
    }

    #[test]
    fn collection_path_without_control_keys() {
        let plan = Structure::Companies
            .build_path(ParsedQuery {
                raw_path: None,
                params: params(&[("limit", "10")]),
            })
            .unwrap();
        assert_eq!(plan.path, "/objects/companies");
        assert_eq!(plan.params, params(&[("limit", "10")]));
    }

    #[test]
    fn id_is_consumed_into_the_path() {
        let plan = Structure::Contacts
            .build_path(ParsedQuery {
                raw_path: None,
                params: params(&[("id", "512"), ("archived", "false")]),
            })
            .unwrap();
        assert_eq!(plan.path, "/objects/contacts/512");
        assert!(!plan.params.contains_key("id"));
        assert_eq!(plan.params, params(&[("archived", "false")]));
    }

    #[test]
    fn body_switches_searchable_collections_to_the_search_path() {
        for (structure, expected) in [
            (Structure::Companies, "/objects/companies/search"),
            (Structure::Contacts, "/objects/contacts/search"),
        ] {
            let plan = structure
                .build_path(ParsedQuery {
                    raw_path: None,
                    params: params(&[("body", "{}")]),
                })
                .unwrap();
            assert_eq!(plan.path, expected);
            assert!(!plan.params.contains_key("body"));
        }
    }

    #[test]
    fn tickets_have_no_search_path() {
        let plan = Structure::Tickets
            .build_path(ParsedQuery {
                raw_path: None,
                params: params(&[("body", "{}")]),
            })
            .unwrap();
        assert_eq!(plan.path, "/objects/tickets");
        assert!(plan.params.contains_key("body"));
    }

    #[test]
    fn id_and_body_compose_in_order() {
        let plan = Structure::Companies
            .build_path(ParsedQuery {
                raw_path: None,
                params: params(&[("id", "99"), ("body", "{}")]),
            })
            .unwrap();
        assert_eq!(plan.path, "/objects/companies/99/search");
    }

    #[test]
    fn path_building_is_deterministic() {
        let parsed = ParsedQuery {
            raw_path: None,
            params: params(&[("id", "7"), ("archived", "true")]),
        };
        let first = Structure::Companies.build_path(parsed.clone()).unwrap();
        let second = Structure::Companies.build_path(parsed).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn adhoc_query_splits_path_from_parameters() {
        let parsed = Structure::Adhoc.parse_query("/objects/contacts/512?accessor=results&archived=false");
        assert_eq!(parsed.raw_path.as_deref(), Some("/objects/contacts/512"));
        assert_eq!(
            parsed.params,
            params(&[("accessor", "results"), ("archived", "false")])
        );
    }

    #[test]
    fn adhoc_query_without_parameters_is_all_path() {
        let parsed = Structure::Adhoc.parse_query("/objects/tickets");
        assert_eq!(parsed.raw_path.as_deref(), Some("/objects/tickets"));
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn adhoc_requires_a_path() {
        let error = Structure::Adhoc
            .build_path(ParsedQuery {
                raw_path: Some(String::new()),
                params: HashMap::new(),
            })
            .unwrap_err();
        assert!(matches!(
            error,
            BridgeError::MissingRequiredParameter { ref parameter, .. } if parameter == "path"
        ));
    }

    #[test]
    fn adhoc_path_passes_through_untouched() {
        let plan = Structure::Adhoc
            .build_path(ParsedQuery {
                raw_path: Some("/objects/contacts/512".to_string()),
                params: params(&[("id", "512")]),
            })
            .unwrap();
        assert_eq!(plan.path, "/objects/contacts/512");
        assert!(plan.params.contains_key("id"));
    }

    #[test]
    fn fixed_structures_answer_under_results() {
        let (accessor, rest) = Structure::Companies
            .resolve_accessor(params(&[("limit", "5")]))
            .unwrap();
        assert_eq!(accessor, "results");
        assert_eq!(rest, params(&[("limit", "5")]));
    }

    #[test]
    fn adhoc_accessor_is_popped_from_the_parameters() {
        let (accessor, rest) = Structure::Adhoc
            .resolve_accessor(params(&[("accessor", "results"), ("limit", "5")]))
            .unwrap();
        assert_eq!(accessor, "results");
        assert!(!rest.contains_key("accessor"));
        assert_eq!(rest, params(&[("limit", "5")]));
    }

    #[test]
    fn adhoc_without_accessor_is_an_error() {
        let error = Structure::Adhoc.resolve_accessor(HashMap::new()).unwrap_err();
        assert!(matches!(
            error,
            BridgeError::MissingRequiredParameter { ref structure, ref parameter }
                if structure == "Adhoc" && parameter == "accessor"
        ));
    }

    #[test]
    fn structure_strings_split_on_angle_brackets() {
        assert_eq!(split_structure("Companies"), ["Companies"]);
        assert_eq!(split_structure("Adhoc > Contacts"), ["Adhoc", "Contacts"]);
        assert_eq!(split_structure(""), [""]);
    }
}
