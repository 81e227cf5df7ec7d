//! Error taxonomy for bridge operations.
//!
//! Every failure a caller can observe is one of these variants. Input
//! problems (bad structure, missing parameters, malformed selectors) are
//! distinguished from upstream problems (HTTP failures, unreachable host)
//! so callers can decide what is retryable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The structure name does not map to a supported HubSpot object.
    #[error("Invalid Structure: '{0}' is not a valid structure")]
    InvalidStructure(String),

    /// A structure-mandated parameter was absent from the parsed query.
    #[error("The {structure} structure requires the {parameter} parameter")]
    MissingRequiredParameter { structure: String, parameter: String },

    /// A qualification referenced a placeholder with no supplied value.
    #[error("No value supplied for placeholder <%={reference}%>")]
    UnresolvedPlaceholder { reference: String },

    /// The `body` parameter could not be used as a search request body.
    #[error("The 'body' parameter was not valid JSON: {0}")]
    MalformedQuery(String),

    /// HubSpot accepts at most one sort property per search.
    #[error("HubSpot only supports a sort on one property ({properties} requested)")]
    UnsupportedSort { properties: usize },

    /// Retrieve matched more than one record.
    #[error("Retrieve must return a single result, but multiple results were found")]
    MultipleResults,

    /// A count response carried neither a total nor a single object id.
    #[error("The count result was unexpected, check the query and rerun")]
    UnexpectedPayload,

    /// A field selector was not a well-formed path expression.
    #[error("There was an issue reading '{selector}': {reason}")]
    PathEvaluation { selector: String, reason: String },

    /// HubSpot answered with an error status or an error message body.
    #[error("{message}")]
    UpstreamHttp { status: Option<u16>, message: String },

    /// The request never produced a response.
    #[error("Unable to reach the HubSpot service: {0}")]
    Transport(#[from] reqwest::Error),
}
