use folio::app::App;
use folio::utils::log::init_logging;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

fn main() {
    console_error_panic_hook::set_once();
    init_logging();

    let Some(root) = document().get_element_by_id("app") else {
        tracing::error!("missing #app mount point");
        return;
    };

    mount_to(root.unchecked_into::<web_sys::HtmlElement>(), App).forget();
}
