//! RFC-3986 URI resolution and query-string manipulation.
//!
//! The resolution algorithm below is index-based rather than going through a
//! generic URI-parsing library: it operates on byte offsets into the original
//! strings exactly as the reference implementation does, so that dot-segment
//! removal only ever touches the resolved path and never normalizes query or
//! fragment components it shouldn't touch.

/// Byte offsets of the four structural delimiters of a URI reference.
/// A value of `-1` for `scheme_colon` means "no scheme" (relative reference).
/// The other three fields default to `0` when the corresponding delimiter is
/// absent, matching the reference algorithm's "points at end of string"
/// convention.
#[derive(Debug, Clone, Copy)]
struct UriIndices {
    scheme_colon: i64,
    path: i64,
    query: i64,
    fragment: i64,
}

fn find_from(s: &[u8], needle: u8, from: usize) -> Option<usize> {
    s[from..].iter().position(|&b| b == needle).map(|p| p + from)
}

fn get_uri_indices(uri: &str) -> UriIndices {
    let bytes = uri.as_bytes();
    if bytes.is_empty() {
        return UriIndices { scheme_colon: -1, path: 0, query: 0, fragment: 0 };
    }
    let length = bytes.len() as i64;

    let fragment_index = bytes.iter().position(|&b| b == b'#').map(|p| p as i64).unwrap_or(length);
    let mut query_index = bytes.iter().position(|&b| b == b'?').map(|p| p as i64).unwrap_or(-1);
    if query_index == -1 || query_index > fragment_index {
        query_index = fragment_index;
    }

    let mut scheme_index_limit = bytes.iter().position(|&b| b == b'/').map(|p| p as i64).unwrap_or(-1);
    if scheme_index_limit == -1 || scheme_index_limit > query_index {
        scheme_index_limit = query_index;
    }
    let mut scheme_index = bytes.iter().position(|&b| b == b':').map(|p| p as i64).unwrap_or(-1);
    if scheme_index > scheme_index_limit {
        scheme_index = -1;
    }

    let has_authority = scheme_index + 2 < query_index
        && bytes.get((scheme_index + 1) as usize) == Some(&b'/')
        && bytes.get((scheme_index + 2) as usize) == Some(&b'/');

    let path_index = if has_authority {
        let from = (scheme_index + 3).max(0) as usize;
        let mut p = find_from(bytes, b'/', from.min(bytes.len())).map(|p| p as i64).unwrap_or(-1);
        if p == -1 || p > query_index {
            p = query_index;
        }
        p
    } else {
        scheme_index + 1
    };

    UriIndices { scheme_colon: scheme_index, path: path_index, query: query_index, fragment: fragment_index }
}

/// Removes `.`/`..` dot-segments from `uri[offset..limit]` in place, returning the
/// rewritten string. Only the slice delimited by `[offset, limit)` is touched.
fn remove_dot_segments(uri: String, offset: i64, limit: i64) -> String {
    if offset >= limit {
        return uri;
    }
    let mut uri: Vec<u8> = uri.into_bytes();
    let mut offset = offset;
    let mut limit = limit;
    if uri[offset as usize] == b'/' {
        offset += 1;
    }
    let mut segment_start = offset;
    let mut i = offset;
    while i <= limit {
        let next_segment_start;
        if i == limit {
            next_segment_start = i;
        } else if uri[i as usize] == b'/' {
            next_segment_start = i + 1;
        } else {
            i += 1;
            continue;
        }

        if i == segment_start + 1 && uri[segment_start as usize] == b'.' {
            let start = segment_start as usize;
            let end = next_segment_start as usize;
            uri.drain(start..end);
            limit -= next_segment_start - segment_start;
            i = segment_start;
        } else if i == segment_start + 2
            && uri[segment_start as usize] == b'.'
            && uri[(segment_start + 1) as usize] == b'.'
        {
            let prev = &uri[..(segment_start - 2) as usize];
            let prev_segment_start = prev.iter().rposition(|&b| b == b'/').map(|p| p as i64 + 1).unwrap_or(0);
            let remove_from = prev_segment_start.max(offset);
            let start = remove_from as usize;
            let end = next_segment_start as usize;
            uri.drain(start..end);
            limit -= next_segment_start - remove_from;
            segment_start = prev_segment_start;
            i = prev_segment_start;
        } else {
            i += 1;
            segment_start = i;
        }
    }
    String::from_utf8(uri).expect("dot-segment removal preserves UTF-8 boundaries on ASCII delimiters")
}

/// Resolves `reference` against `base` per RFC 3986 §5.3.
pub fn resolve(base: &str, reference: &str) -> String {
    let ref_indices = get_uri_indices(reference);

    if ref_indices.scheme_colon != -1 {
        // The reference is absolute.
        return remove_dot_segments(reference.to_string(), ref_indices.path, ref_indices.query);
    }

    let base_indices = get_uri_indices(base);

    if ref_indices.fragment == 0 {
        let no_frag = &base[..base_indices.fragment as usize];
        return format!("{no_frag}{reference}");
    }

    if ref_indices.query == 0 {
        let no_query = &base[..base_indices.query as usize];
        return format!("{no_query}{reference}");
    }

    if ref_indices.path != 0 {
        let base_limit = (base_indices.scheme_colon + 1) as usize;
        let prefix = &base[..base_limit];
        let uri = format!("{prefix}{reference}");
        return remove_dot_segments(
            uri,
            base_limit as i64 + ref_indices.path,
            base_limit as i64 + ref_indices.query,
        );
    }

    if ref_indices.path != ref_indices.query && reference.as_bytes()[ref_indices.path as usize] == b'/' {
        let prefix = &base[..base_indices.path as usize];
        let uri = format!("{prefix}{reference}");
        return remove_dot_segments(uri, base_indices.path, base_indices.path + ref_indices.query);
    }

    if base_indices.scheme_colon + 2 < base_indices.path && base_indices.path == base_indices.query {
        let prefix = &base[..base_indices.path as usize];
        let uri = format!("{prefix}/{reference}");
        return remove_dot_segments(uri, base_indices.path, base_indices.path + ref_indices.query + 1);
    }

    let query_prefix = &base[..base_indices.query as usize];
    let last_slash = query_prefix.as_bytes().iter().rposition(|&b| b == b'/');
    let base_limit = last_slash.map(|p| p as i64 + 1).unwrap_or(base_indices.path);
    let prefix = &base[..base_limit as usize];
    let uri = format!("{prefix}{reference}");
    remove_dot_segments(uri, base_indices.path, base_limit + ref_indices.query)
}

fn find_pieces(uri: &str) -> (&str, &str, &str) {
    let indices = get_uri_indices(uri);
    let mut query_start = indices.query;
    let query_end = indices.fragment;
    if query_start == 0 {
        return ("", uri, "");
    }
    query_start += 1;
    let query = &uri[query_start as usize..query_end as usize];
    let scheme_and_path = &uri[..query_start as usize];
    let fragment = &uri[query_end as usize..];
    (query, scheme_and_path, fragment)
}

/// Returns the raw (not percent-decoded) value of query parameter `name`, or
/// `None` if absent. Honours first-match-wins semantics for repeated names,
/// as the reference implementation does.
pub fn get_query_param<'a>(uri: &'a str, name: &str) -> Option<&'a str> {
    let (query, _, _) = find_pieces(uri);
    for pair in query.split('&') {
        if let Some((k, v)) = pair.split_once('=') {
            if k == name {
                return Some(v);
            }
        }
    }
    None
}

/// Removes query parameter `name` from `uri`, preserving the order and raw
/// encoding of the surviving parameters. Idempotent.
pub fn remove_query_param(uri: &str, name: &str) -> String {
    let (query, scheme_and_path, fragment) = find_pieces(uri);
    let mut out = String::from(scheme_and_path);
    let mut need_amp = false;
    for pair in query.split('&') {
        if query.is_empty() {
            break;
        }
        let key = pair.split_once('=').map(|(k, _)| k).unwrap_or(pair);
        if key != name {
            if need_amp {
                out.push('&');
            }
            need_amp = true;
            out.push_str(pair);
        }
    }
    out.push_str(fragment);
    out
}

/// Decodes `+` to space and `%XX` hex escapes in a query-string component.
pub fn decode_query_component(s: &str) -> String {
    let replaced = s.replace('+', " ");
    let bytes = replaced.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_basics() {
        assert_eq!(resolve("http://h", "a"), "http://h/a");
        assert_eq!(resolve("http://h/", "a"), "http://h/a");
        assert_eq!(resolve("http://h/x", ""), "http://h/x");
        assert_eq!(resolve("http://h/x#f", ""), "http://h/x");
        assert_eq!(resolve("http://h/x?a=1", "#y"), "http://h/x?a=1#y");
        assert_eq!(resolve("http://h/x#old", "#y"), "http://h/x#y");
        assert_eq!(resolve("http://h/x?a=1", "?b=2"), "http://h/x?b=2");
        assert_eq!(resolve("http://h/x", "//other/p"), "http://other/p");
        assert_eq!(resolve("http://h/x/y", "/p"), "http://h/p");
    }

    #[test]
    fn resolve_dot_segments() {
        assert_eq!(resolve("http://h/a/b/c", "../d"), "http://h/a/d");
        assert_eq!(resolve("http://h/a/b/", "./c"), "http://h/a/b/c");
    }

    #[test]
    fn query_param_roundtrip() {
        let uri = "http://h/p?a=1&b=2&c=3";
        assert_eq!(get_query_param(uri, "b"), Some("2"));
        assert_eq!(remove_query_param(uri, "b"), "http://h/p?a=1&c=3");
        // Idempotent: removing an absent param is a no-op.
        let once = remove_query_param(uri, "b");
        assert_eq!(remove_query_param(&once, "b"), once);
    }

    #[test]
    fn decode_plus_and_percent() {
        assert_eq!(decode_query_component("a+b%20c"), "a b c");
    }
}
