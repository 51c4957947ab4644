//! Blob helpers: building upload bodies, reading picked files and
//! triggering downloads.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, HtmlInputElement, Url};

use crate::core::http::Upload;
use crate::utils::dom;

/// Wrap bytes in a `Blob` with the given MIME type.
pub fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<Blob, JsValue> {
    let array = Uint8Array::from(bytes);
    let parts = Array::of1(&array);
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Read a file picked through `<input type="file">`.
pub async fn read_file(file: &File) -> Result<Upload, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    let mime = match file.type_() {
        mime if mime.is_empty() => {
            crate::utils::file_types::mime_for_name(&file.name()).to_string()
        }
        mime => mime,
    };
    Ok(Upload::new(file.name(), mime, bytes))
}

/// Read every file picked in `input`, then clear it so the same file can
/// be picked again.
pub async fn read_input_files(input: &HtmlInputElement) -> Vec<Upload> {
    let mut uploads = Vec::new();
    if let Some(files) = input.files() {
        for index in 0..files.length() {
            let Some(file) = files.get(index) else {
                continue;
            };
            match read_file(&file).await {
                Ok(upload) => uploads.push(upload),
                Err(err) => {
                    tracing::warn!(name = %file.name(), error = ?err, "failed to read picked file")
                }
            }
        }
    }
    input.set_value("");
    uploads
}

/// Hand `bytes` to the browser as a download named `file_name`.
pub fn save_bytes(file_name: &str, bytes: &[u8], mime: &str) -> Result<(), JsValue> {
    let document = dom::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;

    let blob = bytes_to_blob(bytes, mime)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}
