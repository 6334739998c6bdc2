//! MIME type classification used by the format evaluator and the
//! ContentType consistency check in the MPD parser.

pub const APPLICATION_RAWCC: &str = "application/x-rawcc";
pub const APPLICATION_TTML: &str = "application/ttml+xml";
pub const TEXT_VTT: &str = "text/vtt";

/// Content type of an AdaptationSet, derived from the MIME type of its
/// member Representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Audio,
    Video,
    Text,
    Unknown,
}

fn top_level_type(mime_type: &str) -> Option<&str> {
    mime_type.split_once('/').map(|(top, _)| top)
}

pub fn is_audio(mime_type: &str) -> bool {
    top_level_type(mime_type) == Some("audio")
}

pub fn is_video(mime_type: &str) -> bool {
    top_level_type(mime_type) == Some("video")
}

pub fn is_text(mime_type: &str) -> bool {
    mime_type == APPLICATION_RAWCC || mime_type == TEXT_VTT || mime_type == APPLICATION_TTML
}

pub fn content_type(mime_type: &str) -> ContentType {
    if is_video(mime_type) {
        ContentType::Video
    } else if is_audio(mime_type) {
        ContentType::Audio
    } else if is_text(mime_type) {
        ContentType::Text
    } else {
        ContentType::Unknown
    }
}

/// Classifies an AdaptationSet's bare `@contentType` attribute (`"audio"`,
/// `"video"` or `"text"`), as distinct from [`content_type`] which classifies
/// a full MIME type such as `@mimeType`. The two must not be conflated:
/// `@contentType` carries no `/`, so running it through [`content_type`]
/// always yields `Unknown`.
pub fn base_content_type(content_type: &str) -> ContentType {
    match content_type {
        "video" => ContentType::Video,
        "audio" => ContentType::Audio,
        "text" => ContentType::Text,
        _ => ContentType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_types() {
        assert_eq!(content_type("video/mp4"), ContentType::Video);
        assert_eq!(content_type("audio/mp4"), ContentType::Audio);
        assert_eq!(content_type(APPLICATION_RAWCC), ContentType::Text);
        assert_eq!(content_type("application/octet-stream"), ContentType::Unknown);
    }

    #[test]
    fn classifies_base_content_type_tokens() {
        assert_eq!(base_content_type("video"), ContentType::Video);
        assert_eq!(base_content_type("audio"), ContentType::Audio);
        assert_eq!(base_content_type("text"), ContentType::Text);
        assert_eq!(base_content_type("application"), ContentType::Unknown);
    }
}
