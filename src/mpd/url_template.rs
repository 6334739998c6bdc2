//! Compiled `$Placeholder$` substitution for `SegmentTemplate@media` and
//! `@initialization`, per ISO/IEC 23009-1 §5.3.9.4.4.

use crate::error::{DashError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    RepresentationId,
    Number,
    Bandwidth,
    Time,
}

#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Sub { placeholder: Placeholder, width: usize },
}

#[derive(Debug, Clone)]
pub struct UrlTemplate {
    pieces: Vec<Piece>,
}

impl UrlTemplate {
    /// Compiles `template`. `$$` is an escaped literal `$`.
    pub fn compile(template: &str) -> Result<Self> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let bytes = template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] != b'$' {
                literal.push(bytes[i] as char);
                i += 1;
                continue;
            }
            if template[i + 1..].starts_with('$') {
                literal.push('$');
                i += 2;
                continue;
            }
            let end = template[i + 1..]
                .find('$')
                .ok_or_else(|| DashError::UrlTemplate(format!("unterminated placeholder in {template}")))?
                + i
                + 1;
            let spec = &template[i + 1..end];
            let (name, width_str) = match spec.split_once('%') {
                Some((n, w)) => (n, Some(w)),
                None => (spec, None),
            };
            let placeholder = match name {
                "RepresentationID" => Placeholder::RepresentationId,
                "Number" => Placeholder::Number,
                "Bandwidth" => Placeholder::Bandwidth,
                "Time" => Placeholder::Time,
                other => return Err(DashError::UrlTemplate(format!("unknown placeholder ${other}$"))),
            };
            let width = match width_str {
                None => 0,
                Some(w) => {
                    // printf form is `0<width>d`; we only need the width digits.
                    w.trim_start_matches('0').trim_end_matches('d').parse().unwrap_or(0)
                }
            };
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Sub { placeholder, width });
            i = end + 1;
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(UrlTemplate { pieces })
    }

    pub fn build_uri(&self, id: &str, number: i64, bandwidth: u64, time: i64) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Sub { placeholder, width } => {
                    let rendered = match placeholder {
                        Placeholder::RepresentationId => id.to_string(),
                        Placeholder::Number => number.to_string(),
                        Placeholder::Bandwidth => bandwidth.to_string(),
                        Placeholder::Time => time.to_string(),
                    };
                    if rendered.len() < *width {
                        out.push_str(&"0".repeat(width - rendered.len()));
                    }
                    out.push_str(&rendered);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_number_and_representation_id() {
        let t = UrlTemplate::compile("seg-$RepresentationID$-$Number%05d$.m4s").unwrap();
        assert_eq!(t.build_uri("720p", 42, 0, 0), "seg-720p-00042.m4s");
    }

    #[test]
    fn substitutes_time_and_bandwidth_with_no_padding() {
        let t = UrlTemplate::compile("chunk-$Time$-$Bandwidth$.m4s").unwrap();
        assert_eq!(t.build_uri("x", 0, 128000, 9000), "chunk-9000-128000.m4s");
    }

    #[test]
    fn escaped_dollar_is_literal() {
        let t = UrlTemplate::compile("price$$-$Number$").unwrap();
        assert_eq!(t.build_uri("x", 3, 0, 0), "price$-3");
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        assert!(UrlTemplate::compile("$Nonsense$").is_err());
    }
}
