//! Embedded page payload extraction.
//!
//! hawk.live renders an Inertia-style app: the whole page state is a JSON
//! document stored HTML-escaped in the `data-page` attribute of the root
//! element. Everything that knows about that marker lives here.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::de::DeserializeOwned;

use crate::error::MalformedPageError;

/// Attribute carrying the page payload
pub const PAYLOAD_ATTRIBUTE: &str = "data-page";

static PAYLOAD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[data-page]").unwrap_or_else(|_| unreachable!("static selector is valid"))
});

/// Locate the embedded payload and decode it as `T`
///
/// Attribute values come back from the HTML parser already unescaped, so
/// the text is handed straight to serde.
pub fn extract_payload<T: DeserializeOwned>(html: &str) -> Result<T, MalformedPageError> {
    let raw = locate_payload(html)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Raw (unescaped) payload text of the first element carrying the marker
pub fn locate_payload(html: &str) -> Result<String, MalformedPageError> {
    let document = Html::parse_document(html);

    document
        .select(&PAYLOAD_SELECTOR)
        .next()
        .and_then(|element| element.value().attr(PAYLOAD_ATTRIBUTE))
        .map(str::to_string)
        .ok_or(MalformedPageError::MissingPayload {
            attribute: PAYLOAD_ATTRIBUTE,
        })
}
