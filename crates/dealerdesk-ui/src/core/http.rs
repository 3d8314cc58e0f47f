//! Transport-neutral request/response types.
//!
//! # Design
//! - Requests are plain data so the client pipeline can be tested without a browser.
//! - File uploads carry bytes; the browser transport rebuilds `FormData` from them.
//! - The [`Transport`] trait is the only seam between core and `gloo-net`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::errors::RequestError;

/// HTTP methods used by the admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One part of a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultipartField {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// Original file name.
        file_name: String,
        /// MIME type reported by the browser.
        mime: String,
        /// File contents.
        bytes: Vec<u8>,
    },
}

/// A file picked by the user, read into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upload {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the browser.
    pub mime: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Wrap the upload as a multipart field named `field`.
    #[must_use]
    pub fn into_field(self, field: &str) -> MultipartField {
        MultipartField::File {
            name: field.to_string(),
            file_name: self.file_name,
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}

/// Request body variants.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(Value),
    /// `multipart/form-data` fields.
    Multipart(Vec<MultipartField>),
}

/// Request relative to a client's base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL.
    pub path: String,
    /// Query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// Body payload.
    pub body: RequestBody,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PATCH path`
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE path`
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter unless the value is absent or blank.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value.map(|value| value.to_string()) {
            Some(value) if !value.trim().is_empty() => self.query(key, value),
            _ => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encode`] when `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, RequestError> {
        let value =
            serde_json::to_value(body).map_err(|err| RequestError::Encode(err.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart body.
    #[must_use]
    pub fn multipart(mut self, fields: Vec<MultipartField>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }
}

/// Fully resolved request handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL without query string.
    pub url: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Header pairs.
    pub headers: Vec<(String, String)>,
    /// Body payload.
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as received from the network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failure raised before a response exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The browser could not build the request.
    #[error("failed to build request: {0}")]
    Build(String),
    /// The request never reached the server or the connection dropped.
    #[error("request could not be sent: {0}")]
    Unreachable(String),
}

/// Sends prepared requests.
#[async_trait(?Send)]
pub trait Transport {
    /// Send a request and collect the full response body.
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_skips_blank_optional_query_values() {
        let request = ApiRequest::get("/event-logs")
            .query("page", 2)
            .query_opt("entity_type", Some(""))
            .query_opt("event_type", Some("ENTITY_CREATE"))
            .query_opt("user_id", None::<&str>);
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("event_type".to_string(), "ENTITY_CREATE".to_string()),
            ]
        );
    }

    #[test]
    fn json_body_is_captured() {
        let request = ApiRequest::post("/voices")
            .json(&json!({"name": "Emma"}))
            .expect("encodes");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, RequestBody::Json(json!({"name": "Emma"})));
    }

    #[test]
    fn upload_becomes_named_file_field() {
        let upload = Upload {
            file_name: "logo.png".into(),
            mime: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        assert!(matches!(
            upload.into_field("logo"),
            MultipartField::File { name, file_name, .. } if name == "logo" && file_name == "logo.png"
        ));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = PreparedRequest {
            method: Method::Get,
            url: "http://h/users/me".into(),
            query: Vec::new(),
            headers: vec![("Authorization".into(), "Bearer t".into())],
            body: RequestBody::Empty,
        };
        assert_eq!(request.header("authorization"), Some("Bearer t"));
        assert_eq!(request.header("content-type"), None);
    }
}
