//! Component E/F: the MPD data model (periods / adaptation sets /
//! representations / segment indexers) and the parser that builds it from
//! XML.

pub mod model;
pub mod ranged_uri;
pub mod segment_base;
pub mod url_template;
pub mod uuid;
pub mod xml;

pub use model::{
    AdaptationSet, ContentProtection, Format, Mpd, Period, Representation, SchemeInitData,
};
pub use ranged_uri::RangedUri;
pub use segment_base::{
    MultiSegmentBase, SegmentBase, SegmentCount, SegmentList, SegmentTemplate,
    SegmentTimelineElement, SegmentUriRef, SingleSegmentBase,
};
pub use url_template::UrlTemplate;
pub use uuid::Uuid;

/// Parses an MPD document. `manifest_uri` is the URI the document was
/// fetched from, used to resolve relative `BaseURL`/segment references.
pub fn parse(xml_text: &str, manifest_uri: &str) -> crate::error::Result<Mpd> {
    model::parse(xml_text, manifest_uri)
}
