//! Outcomes of resource operations.

use bytes::Bytes;

/// The externally visible outcome of a resource operation.
///
/// Failures are collapsed into [`ResourceResponse::ServerError`]; the cause is
/// logged where it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceResponse {
    /// The resource bytes and their exact length.
    Content { body: Bytes, content_length: usize },
    Ok,
    NotFound,
    ServerError,
}

impl ResourceResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ResourceResponse::Content { .. } | ResourceResponse::Ok)
    }

    /// A status code in the manner of the HTTP surface this maps onto.
    pub fn status_code(&self) -> u16 {
        match self {
            ResourceResponse::Content { .. } | ResourceResponse::Ok => 200,
            ResourceResponse::NotFound => 404,
            ResourceResponse::ServerError => 500,
        }
    }
}
