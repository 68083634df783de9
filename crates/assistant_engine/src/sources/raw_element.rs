use assistant_core::RawElementRecord;

use crate::Dom;

/// The raw host element surfaced as a single entry, if it is on the page.
/// Duplicate instances share one entry.
pub fn read_raw_element(dom: &Dom, dom_id: &str) -> Option<RawElementRecord> {
    let node = dom.get_element_by_id(dom_id)?;
    let element = dom.element(node)?;
    let label = [Some(element.text.trim()), element.attr("title"), element.attr("aria-label")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|label| !label.is_empty())
        .unwrap_or(dom_id);
    Some(RawElementRecord {
        dom_id: dom_id.to_string(),
        label: label.to_string(),
    })
}
