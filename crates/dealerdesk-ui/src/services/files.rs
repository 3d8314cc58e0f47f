//! Reading picked files and offering downloads.

use gloo::file::File;
use gloo::file::futures::read_as_bytes;
use wasm_bindgen::JsCast;
use web_sys::{HtmlAnchorElement, HtmlInputElement, Url};

use crate::core::http::Upload;
use crate::services::transport::blob;

/// First file selected in a file input, if any.
pub(crate) fn first_file(input: &HtmlInputElement) -> Option<File> {
    input
        .files()
        .and_then(|files| files.get(0))
        .map(File::from)
}

/// Read a picked file into memory.
pub(crate) async fn read_upload(file: &File) -> anyhow::Result<Upload> {
    let bytes = read_as_bytes(file)
        .await
        .map_err(|err| anyhow::anyhow!("read {}: {err}", file.name()))?;
    Ok(Upload {
        file_name: file.name(),
        mime: file.raw_mime_type(),
        bytes,
    })
}

/// Save `bytes` through a temporary object URL.
pub(crate) fn download(bytes: &[u8], mime: &str, file_name: &str) -> anyhow::Result<()> {
    let blob = blob(bytes, mime)?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|err| anyhow::anyhow!("object url failed: {err:?}"))?;
    let anchor = gloo::utils::document()
        .create_element("a")
        .map_err(|err| anyhow::anyhow!("create anchor: {err:?}"))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| anyhow::anyhow!("anchor cast failed"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url).map_err(|err| anyhow::anyhow!("revoke url: {err:?}"))?;
    Ok(())
}
