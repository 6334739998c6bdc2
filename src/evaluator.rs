//! Component I: format evaluator. Picks a representation from the
//! candidate formats of an AdaptationSet given a playback-rate constraint,
//! mirroring `DemoEvaluator` (`chunk/demo_evaluator.cc`): stateless for the
//! demo configuration, extended with bandwidth/queue-depth inputs by
//! adaptive configurations layered on top.

use crate::mpd::Format;
use crate::util::mime::{content_type, ContentType};

#[derive(Debug, Clone, Default)]
pub struct FormatEvaluation {
    pub format: Option<Format>,
}

/// Picks the best [`Format`] from `formats` for the given `playback_rate`
/// magnitude:
///
/// - partition into `gte = { f : f.max_playout_rate >= r }` and the rest;
/// - if `gte` is non-empty, pick the format in `gte` maximising
///   `(max_playout_rate desc, bitrate asc, id asc)`;
/// - otherwise pick from the rest the format maximising
///   `(max_playout_rate asc, bitrate asc, id asc)`.
///
/// Text tracks (single representation by contract) always return that one
/// representation. Unknown MIME categories leave `evaluation.format` unset.
pub fn evaluate(formats: &[Format], playback_rate: f64) -> FormatEvaluation {
    if formats.is_empty() {
        return FormatEvaluation::default();
    }
    let category = content_type(&formats[0].mime_type);
    match category {
        ContentType::Text => FormatEvaluation { format: Some(formats[0].clone()) },
        ContentType::Video | ContentType::Audio => {
            FormatEvaluation { format: select_format(formats, playback_rate).cloned() }
        }
        ContentType::Unknown => {
            tracing::error!(mime_type = %formats[0].mime_type, "unsupported mime type for format evaluator");
            FormatEvaluation::default()
        }
    }
}

/// `gte`: among formats whose `max_playout_rate` already clears the
/// requested rate, the lowest such rate is "just enough" and is preferred
/// (it conserves formats with higher ceilings for stricter requests); ties
/// broken by highest bitrate, then lowest id.
///
/// `lt` (no format clears the rate): the highest `max_playout_rate`
/// available is the closest we can get; same bitrate/id tie-break order.
fn select_format(formats: &[Format], playback_rate: f64) -> Option<&Format> {
    let (gte, lt): (Vec<&Format>, Vec<&Format>) =
        formats.iter().partition(|f| f.max_playout_rate >= playback_rate);

    if !gte.is_empty() {
        pick_best(&gte, true)
    } else {
        pick_best(&lt, false)
    }
}

fn pick_best<'a>(candidates: &[&'a Format], prefer_lowest_mpr: bool) -> Option<&'a Format> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| {
            let mpr_order = if prefer_lowest_mpr {
                a.max_playout_rate.partial_cmp(&b.max_playout_rate)
            } else {
                b.max_playout_rate.partial_cmp(&a.max_playout_rate)
            }
            .unwrap_or(std::cmp::Ordering::Equal);
            mpr_order.then_with(|| b.bitrate.cmp(&a.bitrate)).then_with(|| a.id.cmp(&b.id))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(id: &str, bitrate: u64, mpr: f64) -> Format {
        Format {
            id: id.to_string(),
            mime_type: "video/mp4".to_string(),
            codecs: None,
            width: None,
            height: None,
            frame_rate: None,
            max_playout_rate: mpr,
            audio_channels: None,
            audio_sampling_rate: None,
            bitrate,
            language: None,
        }
    }

    #[test]
    fn prefers_lowest_sufficient_max_playout_rate_then_highest_bitrate() {
        let formats = vec![fmt("a", 500_000, 1.0), fmt("b", 1_000_000, 1.0), fmt("c", 200_000, 2.0)];
        let chosen = evaluate(&formats, 1.0).format.unwrap();
        // gte = {a, b, c} (all have mpr >= 1.0); among those with the
        // smallest qualifying max_playout_rate (1.0: a, b), pick highest bitrate.
        assert_eq!(chosen.id, "b");
    }

    #[test]
    fn falls_back_to_largest_max_playout_rate_when_none_qualify() {
        let formats = vec![fmt("a", 500_000, 1.0), fmt("b", 1_000_000, 1.5)];
        let chosen = evaluate(&formats, 2.0).format.unwrap();
        assert_eq!(chosen.id, "b");
    }

    #[test]
    fn unsupported_mime_type_is_unset() {
        let mut f = fmt("a", 1, 1.0);
        f.mime_type = "application/octet-stream".to_string();
        let eval = evaluate(&[f], 1.0);
        assert!(eval.format.is_none());
    }
}
