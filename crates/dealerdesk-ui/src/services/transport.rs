//! `gloo-net` implementation of the core [`Transport`].
//!
//! # Design
//! - Requests arrive fully prepared; this layer only maps them onto `fetch`.
//! - Multipart bodies are rebuilt as `FormData` from in-memory bytes.

use async_trait::async_trait;
use gloo_net::http::{Method as HttpMethod, Request};
use js_sys::{Array, Uint8Array};
use url::Url;
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::core::http::{
    Method, MultipartField, PreparedRequest, RawResponse, RequestBody, Transport, TransportError,
};

/// Sends requests through the browser `fetch` API.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let built = build(&request).map_err(|err| TransportError::Build(err.to_string()))?;
        let response = built
            .send()
            .await
            .map_err(|err| TransportError::Unreachable(err.to_string()))?;
        let status = response.status();
        let body = response
            .binary()
            .await
            .map_err(|err| TransportError::Unreachable(err.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

fn build(request: &PreparedRequest) -> anyhow::Result<Request> {
    let mut url = Url::parse(&request.url)?;
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.query {
            pairs.append_pair(name, value);
        }
    }
    let method = match request.method {
        Method::Get => HttpMethod::GET,
        Method::Post => HttpMethod::POST,
        Method::Patch => HttpMethod::PATCH,
        Method::Delete => HttpMethod::DELETE,
    };
    let mut built = Request::new(url.as_str()).method(method);
    for (name, value) in &request.headers {
        built = built.header(name, value);
    }
    Ok(match &request.body {
        RequestBody::Empty => built,
        RequestBody::Json(value) => built.json(value)?,
        RequestBody::Multipart(fields) => built.body(form_data(fields)?),
    })
}

fn form_data(fields: &[MultipartField]) -> anyhow::Result<FormData> {
    let form = FormData::new().map_err(|err| anyhow::anyhow!("form-data failed: {err:?}"))?;
    for field in fields {
        match field {
            MultipartField::Text { name, value } => form
                .append_with_str(name, value)
                .map_err(|err| anyhow::anyhow!("append {name}: {err:?}"))?,
            MultipartField::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let blob = blob(bytes, mime)?;
                form.append_with_blob_and_filename(name, &blob, file_name)
                    .map_err(|err| anyhow::anyhow!("attach {name}: {err:?}"))?;
            }
        }
    }
    Ok(form)
}

/// Wrap bytes in a `Blob` of the given MIME type.
pub(crate) fn blob(bytes: &[u8], mime: &str) -> anyhow::Result<Blob> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let mut options = BlobPropertyBag::new();
    options.type_(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|err| anyhow::anyhow!("blob failed: {err:?}"))
}
