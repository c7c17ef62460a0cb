//! Multipart file-upload requests.
//!
//! Follows the GraphQL multipart request convention: an `operations` part
//! holding the JSON request body with `null` at each file position, a `map`
//! part pairing form part names with variable paths, and one part per file.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};

use crate::error::GraphqlClientError;

/// One file attached to a GraphQL operation.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Dotted path of the variable the file replaces, e.g. `variables.image`.
    ///
    /// The serialized variables must carry `null` at this position.
    pub variable_path: String,
    /// File name sent with the part.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Create an upload for a single variable path.
    #[must_use]
    pub fn new(
        variable_path: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            variable_path: variable_path.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Assemble the multipart form for `operations` plus attached files.
pub fn build_form(
    operations: String,
    files: Vec<FileUpload>,
) -> Result<Form, GraphqlClientError> {
    if files.is_empty() {
        return Err(GraphqlClientError::InvalidUpload {
            message: "upload request without files".to_string(),
        });
    }

    let mut map = BTreeMap::new();
    for (index, file) in files.iter().enumerate() {
        map.insert(index.to_string(), vec![file.variable_path.clone()]);
    }
    let map_json = serde_json::to_string(&map)?;

    let mut form = Form::new().text("operations", operations).text("map", map_json);
    for (index, file) in files.into_iter().enumerate() {
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|err| GraphqlClientError::InvalidUpload {
                message: format!("bad content type {}: {err}", file.content_type),
            })?;
        form = form.part(index.to_string(), part);
    }

    Ok(form)
}
