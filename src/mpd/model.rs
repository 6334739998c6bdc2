//! Component E/F: the validated MPD domain model, and the conversion pass
//! from the raw `xml` schema mirror that applies every semantic rule in
//! `spec.md` §4.F (BaseURL inheritance, early-access period dropping,
//! content-type/language consistency, ContentProtection pssh handling).

use std::sync::Arc;

use base64::Engine;

use crate::error::{DashError, Result};
use crate::mpd::ranged_uri::RangedUri;
use crate::mpd::segment_base::{
    SegmentBase, SegmentList, SegmentTemplate, SegmentTimelineElement, SingleSegmentBase,
};
use crate::mpd::url_template::UrlTemplate;
use crate::mpd::uuid::Uuid;
use crate::mpd::xml::{self, XAdaptationSet, XMpd, XPeriod, XRepresentation};
use crate::upstream::constants::LENGTH_UNBOUNDED;
use crate::util::mime::{base_content_type, content_type, ContentType};
use crate::util::{parse_xs_date_time, parse_xs_duration};

pub const UUID_PSSH_OFFSET: usize = 12;
pub const UUID_PSSH_END: usize = 28;

/// Scheme-specific initialization data carried opaquely — the engine never
/// interprets it beyond deriving a UUID (§4.F open question, resolved in
/// SPEC_FULL.md §15.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeInitData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentProtection {
    pub scheme_id_uri: String,
    pub uuid: Uuid,
    pub data: Option<SchemeInitData>,
}

impl ContentProtection {
    /// Derives `uuid` from a base64-encoded `cenc:pssh` payload's bytes
    /// `12..28` when `scheme_id_uri` itself carries no UUID. Fails (per
    /// `spec.md` §9) when the payload decodes to fewer than 28 bytes.
    fn from_descriptor(scheme_id_uri: String, pssh_b64: Option<&str>) -> Result<Self> {
        let mut uuid = Uuid::EMPTY;
        let mut data = None;
        if let Some(b64) = pssh_b64 {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(b64.trim())
                .map_err(|e| DashError::Parse(format!("invalid base64 in cenc:pssh: {e}")))?;
            if decoded.len() < UUID_PSSH_END {
                return Err(DashError::Invariant(
                    "ContentProtection carries a pssh shorter than 28 bytes; cannot derive a UUID".into(),
                ));
            }
            uuid = Uuid::from_slice(&decoded[UUID_PSSH_OFFSET..UUID_PSSH_END])
                .expect("slice is exactly 16 bytes");
            data = Some(SchemeInitData { mime_type: "application/octet-stream".to_string(), data: decoded });
        }
        Ok(ContentProtection { scheme_id_uri, uuid, data })
    }
}

#[derive(Debug, Clone)]
pub struct Format {
    pub id: String,
    pub mime_type: String,
    pub codecs: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub frame_rate: Option<f64>,
    pub max_playout_rate: f64,
    pub audio_channels: Option<u32>,
    pub audio_sampling_rate: Option<u64>,
    pub bitrate: u64,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Representation {
    pub id: String,
    pub revision_id: u64,
    pub format: Format,
    pub segment_base: Arc<SegmentBase>,
    pub content_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AdaptationSet {
    pub id: i64,
    pub content_type: ContentType,
    pub representations: Vec<Representation>,
    pub content_protections: Vec<ContentProtection>,
    pub segment_base: Option<Arc<SegmentBase>>,
}

#[derive(Debug, Clone)]
pub struct Period {
    pub id: Option<String>,
    pub start_ms: i64,
    /// Explicit `@duration`, or -1 when absent (the last period's duration is
    /// then implicit from the MPD's `mediaPresentationDuration`).
    pub duration_ms: i64,
    pub adaptation_sets: Vec<AdaptationSet>,
    pub segment_base: Option<Arc<SegmentBase>>,
}

#[derive(Debug, Clone)]
pub struct Mpd {
    pub availability_start_time_ms: i64,
    /// -1 means unknown/live.
    pub duration_ms: i64,
    pub min_buffer_time_ms: i64,
    pub dynamic: bool,
    pub min_update_period_ms: i64,
    pub time_shift_buffer_depth_ms: i64,
    pub utc_timing_scheme_id_uri: Option<String>,
    pub utc_timing_value: Option<String>,
    pub location: Option<String>,
    pub periods: Vec<Period>,
}

/// Parses `xml`, resolving relative URIs against `manifest_uri`. Returns
/// `Err` on any hard parse or invariant failure (§4.F: "any hard parse error
/// returns a null MPD to the fetcher" — the caller is expected to map `Err`
/// to that same null-manifest behaviour).
pub fn parse(xml_text: &str, manifest_uri: &str) -> Result<Mpd> {
    let raw: XMpd = xml::deserialize(xml_text).map_err(|e| DashError::Parse(format!("malformed MPD XML: {e}")))?;
    convert(raw, manifest_uri)
}

fn resolve_base(inherited: &str, child: Option<&str>) -> String {
    match child {
        Some(c) if !c.is_empty() => crate::util::uri::resolve(inherited, c),
        _ => inherited.to_string(),
    }
}

fn parse_range(range: &str) -> Result<(i64, i64)> {
    let (start_str, end_str) = range
        .split_once('-')
        .ok_or_else(|| DashError::Parse(format!("malformed byte range '{range}'")))?;
    let start: i64 = start_str.parse().map_err(|_| DashError::Parse(format!("malformed byte range '{range}'")))?;
    if end_str.is_empty() {
        return Ok((start, LENGTH_UNBOUNDED));
    }
    let end: i64 = end_str.parse().map_err(|_| DashError::Parse(format!("malformed byte range '{range}'")))?;
    Ok((start, end - start + 1))
}

fn expand_timeline(segments: &[xml::XS]) -> Vec<SegmentTimelineElement> {
    let mut out = Vec::new();
    let mut cursor = 0i64;
    for s in segments {
        let start = s.t.unwrap_or(cursor);
        let repeat = s.r.unwrap_or(0).max(0);
        for i in 0..=repeat {
            out.push(SegmentTimelineElement { start_time: start + i * s.d, duration: s.d });
        }
        cursor = start + (repeat + 1) * s.d;
    }
    out
}

fn convert_segment_template(
    x: &xml::XSegmentTemplate,
    base_url: &str,
    inherited: Option<&xml::XSegmentTemplate>,
) -> Result<SegmentTemplate> {
    let media = x
        .media
        .as_deref()
        .or_else(|| inherited.and_then(|i| i.media.as_deref()))
        .ok_or_else(|| DashError::Invariant("SegmentTemplate requires @media".into()))?;
    let media_template = UrlTemplate::compile(media)?;

    let init_str = x.initialization.as_deref().or_else(|| inherited.and_then(|i| i.initialization.as_deref()));
    let initialization_template = init_str.map(UrlTemplate::compile).transpose()?;

    let timescale = x.timescale.or_else(|| inherited.and_then(|i| i.timescale)).unwrap_or(1);
    let presentation_time_offset =
        x.presentationTimeOffset.or_else(|| inherited.and_then(|i| i.presentationTimeOffset)).unwrap_or(0);
    let start_number = x.startNumber.or_else(|| inherited.and_then(|i| i.startNumber)).unwrap_or(1);
    let default_duration = x.duration.or_else(|| inherited.and_then(|i| i.duration)).unwrap_or(0) as i64;

    let timeline = match &x.SegmentTimeline {
        Some(t) => Some(expand_timeline(&t.segments)),
        None => inherited
            .and_then(|i| i.SegmentTimeline.as_ref())
            .map(|t| expand_timeline(&t.segments)),
    };

    if timeline.is_none() && default_duration <= 0 {
        return Err(DashError::Invariant("SegmentTemplate needs either a timeline or a positive @duration".into()));
    }

    let _ = base_url;
    Ok(SegmentTemplate {
        timescale,
        presentation_time_offset,
        start_number,
        default_duration,
        timeline,
        initialization_template,
        initialization_uri: None,
        media_template,
    })
}

fn convert_segment_list(x: &xml::XSegmentList, base_url: &str) -> Result<SegmentList> {
    let timescale = x.timescale.unwrap_or(1);
    let presentation_time_offset = x.presentationTimeOffset.unwrap_or(0);
    let start_number = x.startNumber.unwrap_or(1);
    let default_duration = x.duration.unwrap_or(0) as i64;
    let timeline = x.SegmentTimeline.as_ref().map(|t| expand_timeline(&t.segments));

    let initialization = match &x.initialization {
        Some(i) => Some(RangedUri::new(
            base_url,
            i.sourceURL.as_deref().unwrap_or(""),
            i.range.as_deref().map(|r| parse_range(r)).transpose()?.map(|(s, _)| s).unwrap_or(0),
            i.range.as_deref().map(|r| parse_range(r)).transpose()?.map(|(_, l)| l).unwrap_or(LENGTH_UNBOUNDED),
        )),
        None => None,
    };

    let mut media_segments = Vec::new();
    for url in x.segment_urls.as_deref().unwrap_or(&[]) {
        let (start, length) = match &url.mediaRange {
            Some(r) => parse_range(r)?,
            None => (0, LENGTH_UNBOUNDED),
        };
        media_segments.push(RangedUri::new(base_url, url.media.as_deref().unwrap_or(""), start, length));
    }

    if timeline.is_none() && default_duration <= 0 && media_segments.len() > 1 {
        return Err(DashError::Invariant("SegmentList needs either a timeline or a positive @duration".into()));
    }

    Ok(SegmentList { timescale, presentation_time_offset, start_number, default_duration, timeline, initialization, media_segments })
}

fn convert_segment_base_single(x: &xml::XSegmentBase, base_url: &str, media_sub_uri: &str) -> Result<SingleSegmentBase> {
    let timescale = x.timescale.unwrap_or(1);
    let presentation_time_offset = x.presentationTimeOffset.unwrap_or(0);
    let initialization = match &x.initialization {
        Some(i) => {
            let (start, length) = match &i.range {
                Some(r) => parse_range(r)?,
                None => (0, LENGTH_UNBOUNDED),
            };
            Some(RangedUri::new(base_url, i.sourceURL.as_deref().unwrap_or(""), start, length))
        }
        None => None,
    };
    let index_range = match &x.indexRange {
        Some(r) => {
            let (start, length) = parse_range(r)?;
            Some(RangedUri::new(base_url, "", start, length))
        }
        None => None,
    };
    let media = RangedUri::new(base_url, media_sub_uri, 0, LENGTH_UNBOUNDED);
    Ok(SingleSegmentBase { timescale, presentation_time_offset, initialization, index_range, media })
}

/// Picks the representation's own segment base, falling back to the
/// enclosing AdaptationSet's shared one (§3: "a representation either owns
/// its SegmentBase or borrows the enclosing AdaptationSet's").
fn convert_representation(
    x: &XRepresentation,
    base_url: &str,
    inherited_template: Option<&xml::XSegmentTemplate>,
    inherited_segment_base: &Option<Arc<SegmentBase>>,
    content_type_hint: ContentType,
) -> Result<(Representation, ContentType)> {
    let id = x.id.clone().unwrap_or_default();
    let own_base_url = match &x.BaseURL {
        Some(b) => resolve_base(base_url, Some(&b.base)),
        None => base_url.to_string(),
    };

    let mime_type = x.mimeType.clone().unwrap_or_else(|| match content_type_hint {
        ContentType::Video => "video/mp4".to_string(),
        ContentType::Audio => "audio/mp4".to_string(),
        _ => "application/octet-stream".to_string(),
    });
    let resolved_content_type = content_type(&mime_type);

    let segment_base: Arc<SegmentBase> = if let Some(st) = &x.SegmentTemplate {
        Arc::new(SegmentBase::Template(convert_segment_template(st, &own_base_url, inherited_template)?))
    } else if let Some(sl) = &x.SegmentList {
        Arc::new(SegmentBase::List(convert_segment_list(sl, &own_base_url)?))
    } else if let Some(sb) = &x.SegmentBase {
        Arc::new(SegmentBase::Single(convert_segment_base_single(sb, &own_base_url, "")?))
    } else if let Some(inherited_template) = inherited_template {
        Arc::new(SegmentBase::Template(convert_segment_template(inherited_template, &own_base_url, None)?))
    } else if let Some(inherited) = inherited_segment_base {
        inherited.clone()
    } else {
        Arc::new(SegmentBase::Single(SingleSegmentBase {
            timescale: 1,
            presentation_time_offset: 0,
            initialization: None,
            index_range: None,
            media: RangedUri::new(&own_base_url, "", 0, LENGTH_UNBOUNDED),
        }))
    };

    let format = Format {
        id: id.clone(),
        mime_type,
        codecs: x.codecs.clone(),
        width: x.width,
        height: x.height,
        frame_rate: None,
        max_playout_rate: x.max_playout_rate.unwrap_or(1.0).max(1.0),
        audio_channels: None,
        audio_sampling_rate: x.audioSamplingRate,
        bitrate: x.bandwidth.unwrap_or(0),
        language: None,
    };

    Ok((Representation { id, revision_id: 0, format, segment_base, content_id: None }, resolved_content_type))
}

fn convert_content_protection(x: &xml::XContentProtection) -> Result<ContentProtection> {
    let scheme_id_uri = x.schemeIdUri.clone().unwrap_or_default();
    let pssh = x.cenc_pssh.as_ref().and_then(|p| p.content.as_deref());
    let mut cp = ContentProtection::from_descriptor(scheme_id_uri, pssh)?;
    if cp.uuid.is_empty() {
        if let Some(kid) = &x.default_kid {
            if let Some(u) = Uuid::parse(kid) {
                cp.uuid = u;
            }
        }
    }
    Ok(cp)
}

fn convert_adaptation_set(
    x: &XAdaptationSet,
    base_url: &str,
    inherited_template: Option<&xml::XSegmentTemplate>,
    inherited_segment_base: &Option<Arc<SegmentBase>>,
) -> Result<AdaptationSet> {
    let own_base_url = match &x.BaseURL {
        Some(b) => resolve_base(base_url, Some(&b.base)),
        None => base_url.to_string(),
    };

    let set_segment_base: Option<Arc<SegmentBase>> = if let Some(st) = &x.SegmentTemplate {
        Some(Arc::new(SegmentBase::Template(convert_segment_template(st, &own_base_url, inherited_template)?)))
    } else if let Some(sl) = &x.SegmentList {
        Some(Arc::new(SegmentBase::List(convert_segment_list(sl, &own_base_url)?)))
    } else if let Some(sb) = &x.SegmentBase {
        Some(Arc::new(SegmentBase::Single(convert_segment_base_single(sb, &own_base_url, "")?)))
    } else {
        inherited_segment_base.clone()
    };

    let template_for_children = x.SegmentTemplate.as_ref().or(inherited_template);

    let mut declared_content_type = x
        .contentType
        .as_deref()
        .map(base_content_type)
        .or_else(|| x.mimeType.as_deref().map(content_type))
        .unwrap_or(ContentType::Unknown);

    let mut representations = Vec::new();
    for r in x.representations.as_deref().unwrap_or(&[]) {
        let (repr, resolved_ct) =
            convert_representation(r, &own_base_url, template_for_children, &set_segment_base, declared_content_type)?;
        // Content-type consistency (§4.F): reconciled after every
        // Representation; a genuine mismatch between two *known* types is a
        // fatal parse error, but an unset/Unknown set type is adopted rather
        // than rejected, matching the schema's "contentType is optional and
        // often inferred from the child representations" practice.
        if declared_content_type == ContentType::Unknown {
            declared_content_type = resolved_ct;
        } else if resolved_ct != ContentType::Unknown && resolved_ct != declared_content_type {
            return Err(DashError::Invariant(format!(
                "AdaptationSet content type mismatch: set is {declared_content_type:?}, representation {} is {resolved_ct:?}",
                r.id.clone().unwrap_or_default()
            )));
        }
        representations.push(repr);
    }

    if let Some(cc) = &x.ContentComponent {
        if let (Some(set_lang), Some(child_lang)) = (&x.lang, &cc.lang) {
            if set_lang != child_lang {
                return Err(DashError::Invariant(format!(
                    "ContentComponent@lang '{child_lang}' disagrees with AdaptationSet@lang '{set_lang}'"
                )));
            }
        }
    }

    let mut content_protections = Vec::new();
    for cp in x.content_protections.as_deref().unwrap_or(&[]) {
        content_protections.push(convert_content_protection(cp)?);
    }

    Ok(AdaptationSet {
        id: x.id.unwrap_or(0),
        content_type: declared_content_type,
        representations,
        content_protections,
        segment_base: set_segment_base,
    })
}

fn convert_period(
    x: &XPeriod,
    base_url: &str,
    implicit_start_ms: i64,
    dynamic: bool,
) -> Result<Option<Period>> {
    let start_ms = match &x.start {
        Some(s) => parse_xs_duration(s),
        None if !dynamic => implicit_start_ms,
        None => -1,
    };
    if start_ms < 0 {
        // Early access: no resolvable start in a dynamic presentation.
        return Ok(None);
    }

    let duration_ms = x.duration.as_deref().map(parse_xs_duration).unwrap_or(-1);

    let own_base_url = match &x.BaseURL {
        Some(b) => resolve_base(base_url, Some(&b.base)),
        None => base_url.to_string(),
    };

    let period_segment_base: Option<Arc<SegmentBase>> = match &x.SegmentTemplate {
        Some(st) => Some(Arc::new(SegmentBase::Template(convert_segment_template(st, &own_base_url, None)?))),
        None => None,
    };

    let mut adaptation_sets = Vec::new();
    for a in x.adaptation_sets.as_deref().unwrap_or(&[]) {
        adaptation_sets.push(convert_adaptation_set(a, &own_base_url, x.SegmentTemplate.as_ref(), &period_segment_base)?);
    }

    Ok(Some(Period { id: x.id.clone(), start_ms, duration_ms, adaptation_sets, segment_base: period_segment_base }))
}

fn convert(raw: XMpd, manifest_uri: &str) -> Result<Mpd> {
    let dynamic = raw.mpdtype.as_deref() == Some("dynamic");

    let mut base_url = manifest_uri.to_string();
    if let Some(urls) = &raw.base_urls {
        if let Some(first) = urls.first() {
            base_url = resolve_base(&base_url, Some(&first.base));
        }
    }

    let mut duration_ms = raw.mediaPresentationDuration.as_deref().map(parse_xs_duration).unwrap_or(-1);
    let min_buffer_time_ms = raw.minBufferTime.as_deref().map(parse_xs_duration).unwrap_or(0).max(0);
    let min_update_period_ms = raw.minimumUpdatePeriod.as_deref().map(parse_xs_duration).unwrap_or(-1);
    let time_shift_buffer_depth_ms = raw.timeShiftBufferDepth.as_deref().map(parse_xs_duration).unwrap_or(-1);
    let availability_start_time_ms = raw.availabilityStartTime.as_deref().map(parse_xs_date_time).unwrap_or(0);

    let mut periods = Vec::new();
    let mut implicit_start_ms = 0i64;
    let mut early_access_seen = false;
    for x in &raw.periods {
        if early_access_seen {
            // §4.F: "as soon as one early-access period is seen no later
            // period may be accepted."
            break;
        }
        match convert_period(x, &base_url, implicit_start_ms, dynamic)? {
            Some(period) => {
                // The next period's implicit start is *this* period's end
                // (start + duration), not its start — ndash
                // `dash_manifest_representation_parser.cc:141-143`. An
                // unknown duration leaves the next implicit start unresolved;
                // that period must then carry an explicit `@start`.
                implicit_start_ms =
                    if period.duration_ms >= 0 { period.start_ms + period.duration_ms } else { -1 };
                periods.push(period);
            }
            None => early_access_seen = true,
        }
    }

    if periods.is_empty() {
        return Err(DashError::Invariant("MPD has no usable periods".into()));
    }

    if duration_ms < 0 && !dynamic {
        // `mediaPresentationDuration` absent on a static MPD: derive it from
        // the last period's end, as ndash does at lines 149-153.
        if let Some(last) = periods.last() {
            if last.duration_ms >= 0 {
                duration_ms = last.start_ms + last.duration_ms;
            }
        }
    }

    Ok(Mpd {
        availability_start_time_ms,
        duration_ms,
        min_buffer_time_ms,
        dynamic,
        min_update_period_ms,
        time_shift_buffer_depth_ms,
        utc_timing_scheme_id_uri: raw.UTCTiming.as_ref().and_then(|u| u.schemeIdUri.clone()),
        utc_timing_value: raw.UTCTiming.as_ref().and_then(|u| u.value.clone()),
        location: None,
        periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_VOD: &str = r#"<?xml version="1.0"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT10S" minBufferTime="PT2S">
  <Period>
    <AdaptationSet contentType="video">
      <SegmentTemplate media="video-$Number$.m4s" initialization="video-init.m4s" startNumber="1" duration="2" timescale="1"/>
      <Representation id="v0" mimeType="video/mp4" bandwidth="500000" width="640" height="360"/>
      <Representation id="v1" mimeType="video/mp4" bandwidth="1000000" width="1280" height="720"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    #[test]
    fn parses_simple_vod_manifest() {
        let mpd = parse(SIMPLE_VOD, "http://example.test/stream.mpd").unwrap();
        assert_eq!(mpd.duration_ms, 10_000);
        assert!(!mpd.dynamic);
        assert_eq!(mpd.periods.len(), 1);
        let period = &mpd.periods[0];
        assert_eq!(period.adaptation_sets.len(), 1);
        let set = &period.adaptation_sets[0];
        assert_eq!(set.content_type, ContentType::Video);
        assert_eq!(set.representations.len(), 2);
        assert_eq!(set.representations[1].format.bitrate, 1_000_000);
    }

    #[test]
    fn mismatched_content_type_is_rejected() {
        let bad = SIMPLE_VOD.replace(r#"mimeType="video/mp4" bandwidth="1000000""#, r#"mimeType="audio/mp4" bandwidth="1000000""#);
        assert!(parse(&bad, "http://example.test/stream.mpd").is_err());
    }

    #[test]
    fn pssh_too_short_is_rejected() {
        let xml = r#"<?xml version="1.0"?>
<MPD type="static" mediaPresentationDuration="PT10S">
  <Period>
    <AdaptationSet contentType="video">
      <Representation id="v0" mimeType="video/mp4" bandwidth="1">
        <SegmentBase/>
        <ContentProtection schemeIdUri="urn:mpeg:dash:mp4protection:2011"><pssh>QUJD</pssh></ContentProtection>
      </Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;
        assert!(parse(xml, "http://example.test/stream.mpd").is_err());
    }

    #[test]
    fn second_period_implicit_start_is_previous_periods_end() {
        let xml = r#"<?xml version="1.0"?>
<MPD type="static" mediaPresentationDuration="PT40S">
  <Period duration="PT30S">
    <AdaptationSet contentType="video">
      <Representation id="v0" mimeType="video/mp4" bandwidth="1"><SegmentBase/></Representation>
    </AdaptationSet>
  </Period>
  <Period>
    <AdaptationSet contentType="video">
      <Representation id="v1" mimeType="video/mp4" bandwidth="1"><SegmentBase/></Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;
        let mpd = parse(xml, "http://example.test/stream.mpd").unwrap();
        assert_eq!(mpd.periods[0].start_ms, 0);
        assert_eq!(mpd.periods[0].duration_ms, 30_000);
        assert_eq!(mpd.periods[1].start_ms, 30_000);
    }

    #[test]
    fn static_mpd_duration_derived_from_last_period_end_when_absent() {
        let xml = r#"<?xml version="1.0"?>
<MPD type="static">
  <Period duration="PT30S">
    <AdaptationSet contentType="video">
      <Representation id="v0" mimeType="video/mp4" bandwidth="1"><SegmentBase/></Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;
        let mpd = parse(xml, "http://example.test/stream.mpd").unwrap();
        assert_eq!(mpd.duration_ms, 30_000);
    }

    #[test]
    fn bare_content_type_text_is_not_misclassified_via_mime_matcher() {
        let xml = r#"<?xml version="1.0"?>
<MPD type="static" mediaPresentationDuration="PT10S">
  <Period>
    <AdaptationSet contentType="text">
      <Representation id="t0" mimeType="application/mp4" bandwidth="1"><SegmentBase/></Representation>
    </AdaptationSet>
  </Period>
</MPD>"#;
        let mpd = parse(xml, "http://example.test/stream.mpd").unwrap();
        assert_eq!(mpd.periods[0].adaptation_sets[0].content_type, ContentType::Text);
    }
}
