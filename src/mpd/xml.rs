//! Raw `serde`-deserializable mirror of the DASH MPD XML schema subset this
//! crate consumes.
//!
//! We lean on `quick_xml`'s serde integration exactly as the teacher crate's
//! own `lib.rs` does ("we are using the quick_xml + serde crates to
//! deserialize the XML content to Rust structs") rather than hand-rolling the
//! SAX cursor `spec.md` §9 suggests as a fallback for languages without a
//! serde-shaped XML library. `quick_xml::de::from_str` *is* the "cursor
//! interface... agnostic of the XML library" that design note asks for: the
//! structs below are the schema description, and [`crate::mpd::model`] is
//! where the semantic rules of §4.F (BaseURL inheritance, early-access period
//! dropping, content-type/language consistency) get applied as a validation
//! pass over the deserialized tree. Fields this crate has no use for are
//! dropped silently by serde, matching the teacher's "serde will ignore
//! unknown fields" comment.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct XBaseURL {
    #[serde(rename = "$value")]
    pub base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XS {
    pub t: Option<i64>,
    pub d: i64,
    pub r: Option<i64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XSegmentTimeline {
    #[serde(rename = "S")]
    pub segments: Vec<XS>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XInitialization {
    pub sourceURL: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XSegmentTemplate {
    pub initialization: Option<String>,
    pub media: Option<String>,
    pub SegmentTimeline: Option<XSegmentTimeline>,
    pub startNumber: Option<u64>,
    pub duration: Option<u64>,
    pub timescale: Option<u64>,
    pub presentationTimeOffset: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XSegmentBase {
    #[serde(rename = "Initialization")]
    pub initialization: Option<XInitialization>,
    pub timescale: Option<u64>,
    pub presentationTimeOffset: Option<u64>,
    pub indexRange: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XSegmentURL {
    pub media: Option<String>,
    pub mediaRange: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XSegmentList {
    pub duration: Option<u64>,
    pub timescale: Option<u64>,
    pub presentationTimeOffset: Option<u64>,
    pub startNumber: Option<u64>,
    pub SegmentTimeline: Option<XSegmentTimeline>,
    #[serde(rename = "Initialization")]
    pub initialization: Option<XInitialization>,
    #[serde(rename = "SegmentURL")]
    pub segment_urls: Option<Vec<XSegmentURL>>,
}

/// A generic `schemeIdUri`/`value` descriptor element (`Role`, `Viewpoint`,
/// `Accessibility`, and the bare attributes of `ContentProtection`). Per
/// SPEC_FULL.md §15.2 this carries a single field: the source's local `id`
/// variable is the loop-local holding the attribute before it's stored into
/// `scheme_id_`, not a second attribute.
#[derive(Debug, Deserialize, Clone)]
pub struct XDescriptor {
    pub schemeIdUri: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XPssh {
    #[serde(rename = "$value")]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XContentProtection {
    pub schemeIdUri: Option<String>,
    pub value: Option<String>,
    #[serde(rename = "default_KID")]
    pub default_kid: Option<String>,
    #[serde(rename = "pssh")]
    pub cenc_pssh: Option<XPssh>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XAudioChannelConfiguration {
    pub schemeIdUri: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XContentComponent {
    pub id: Option<String>,
    pub lang: Option<String>,
    pub contentType: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XRepresentation {
    pub id: Option<String>,
    pub mimeType: Option<String>,
    pub codecs: Option<String>,
    pub bandwidth: Option<u64>,
    pub audioSamplingRate: Option<u64>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    #[serde(rename = "maxPlayoutRate")]
    pub max_playout_rate: Option<f64>,
    pub BaseURL: Option<XBaseURL>,
    pub AudioChannelConfiguration: Option<XAudioChannelConfiguration>,
    pub SegmentTemplate: Option<XSegmentTemplate>,
    pub SegmentBase: Option<XSegmentBase>,
    pub SegmentList: Option<XSegmentList>,
    #[serde(rename = "ContentProtection")]
    pub content_protections: Option<Vec<XContentProtection>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XAdaptationSet {
    pub id: Option<i64>,
    pub BaseURL: Option<XBaseURL>,
    pub contentType: Option<String>,
    pub lang: Option<String>,
    pub mimeType: Option<String>,
    pub codecs: Option<String>,
    pub SegmentTemplate: Option<XSegmentTemplate>,
    pub SegmentBase: Option<XSegmentBase>,
    pub SegmentList: Option<XSegmentList>,
    pub ContentComponent: Option<XContentComponent>,
    #[serde(rename = "ContentProtection")]
    pub content_protections: Option<Vec<XContentProtection>>,
    #[serde(rename = "Representation")]
    pub representations: Option<Vec<XRepresentation>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XPeriod {
    pub id: Option<String>,
    pub start: Option<String>,
    pub duration: Option<String>,
    pub BaseURL: Option<XBaseURL>,
    pub SegmentTemplate: Option<XSegmentTemplate>,
    #[serde(rename = "AdaptationSet")]
    pub adaptation_sets: Option<Vec<XAdaptationSet>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XUTCTiming {
    pub schemeIdUri: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct XMpd {
    #[serde(rename = "type")]
    pub mpdtype: Option<String>,
    pub minBufferTime: Option<String>,
    pub minimumUpdatePeriod: Option<String>,
    pub timeShiftBufferDepth: Option<String>,
    pub mediaPresentationDuration: Option<String>,
    pub availabilityStartTime: Option<String>,
    #[serde(rename = "Period")]
    pub periods: Vec<XPeriod>,
    #[serde(rename = "BaseURL")]
    pub base_urls: Option<Vec<XBaseURL>>,
    pub UTCTiming: Option<XUTCTiming>,
}

/// Deserializes `xml` into the raw schema mirror. Any malformed XML or
/// attribute of the wrong type fails here, before semantic validation runs.
/// Routed through `serde_path_to_error` so a failure names the XML path it
/// occurred at (e.g. `periods[2].adaptation_sets[0].representations[1]`)
/// rather than just the innermost serde error.
pub fn deserialize(xml: &str) -> Result<XMpd, String> {
    let mut de = quick_xml::de::Deserializer::from_str(xml);
    serde_path_to_error::deserialize(&mut de).map_err(|e| e.to_string())
}
