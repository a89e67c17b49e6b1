//! Wire types for the JSON routes

use serde::Serialize;

use crate::archive::{DocId, DocRecord};

/// One search result on the wire. The JSON route never carries snippets;
/// those exist only in the HTML view.
#[derive(Debug, Clone, Serialize)]
pub struct ResultJson {
    pub id: DocId,
    pub url: String,
    pub title: Option<String>,
    pub content: String,
}

impl From<&DocRecord> for ResultJson {
    fn from(record: &DocRecord) -> Self {
        Self {
            id: record.id,
            url: record.url.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
        }
    }
}

/// Envelope for `GET /search.json`
#[derive(Debug, Clone, Serialize)]
pub struct SearchEnvelope {
    pub results: Vec<ResultJson>,
    pub query: String,
}

/// Error envelope for the JSON routes
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
