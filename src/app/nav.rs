use wasm_bindgen::JsCast;

/// A link is active on an exact match, or when a non-root href prefixes the
/// current path. Nested hrefs can leave several links active at once.
pub fn is_active_link(href: &str, current_path: &str) -> bool {
    if href.is_empty() {
        return false;
    }
    href == current_path || (href != "/" && current_path.starts_with(href))
}

/// Adds `active_class` to every link under `selector` whose href matches the
/// current location. Returns how many links were marked.
pub fn highlight_active_links(selector: &str, active_class: &str) -> usize {
    let Some(window) = web_sys::window() else { return 0 };
    let Some(doc) = window.document() else { return 0 };
    let Ok(path) = window.location().pathname() else { return 0 };
    let links = match doc.query_selector_all(selector) {
        Ok(links) => links,
        Err(e) => {
            log::warn!("[Nav] bad selector {:?}: {:?}", selector, e);
            return 0;
        }
    };

    let mut marked = 0;
    for i in 0..links.length() {
        let Some(link) = links.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) else {
            continue;
        };
        let Some(href) = link.get_attribute("href") else { continue };
        if is_active_link(&href, &path) && link.class_list().add_1(active_class).is_ok() {
            marked += 1;
        }
    }
    log::debug!("[Nav] {} active link(s) for {}", marked, path);
    marked
}
