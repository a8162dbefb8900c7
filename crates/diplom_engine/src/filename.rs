use encoding_rs::Encoding;
use percent_encoding::percent_decode_str;

/// Name used when the server does not suggest one.
pub const DEFAULT_DOCUMENT_FILENAME: &str = "diplom-structure.docx";

/// Windows-safe download filename taken from a `Content-Disposition` header.
pub fn document_filename(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(disposition_filename)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_FILENAME.to_string())
}

/// Prefers the RFC 5987 `filename*` parameter over plain `filename`.
fn disposition_filename(header: &str) -> Option<String> {
    let params = disposition_params(header);
    let extended = params
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case("filename*"))
        .find_map(|(_, value)| decode_extended_value(value));
    extended
        .or_else(|| {
            params
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("filename"))
                .map(|(_, value)| value.clone())
        })
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parameters after the disposition type. Quoted values may contain `;` and
/// backslash-escaped characters.
fn disposition_params(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = header.chars().peekable();
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
    }

    while chars.peek().is_some() {
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c == ';' {
                break;
            }
            key.push(c);
            chars.next();
        }

        let mut value = String::new();
        if chars.next_if_eq(&'=').is_some() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if chars.next_if_eq(&'"').is_some() {
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => value.extend(chars.next()),
                        '"' => break,
                        _ => value.push(c),
                    }
                }
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
            } else {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                    value.push(c);
                }
                value = value.trim().to_string();
            }
        } else {
            chars.next();
        }

        let key = key.trim();
        if !key.is_empty() {
            params.push((key.to_string(), value));
        }
    }
    params
}

/// Decodes `charset'language'percent-encoded-bytes`.
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?.trim();
    let _language = parts.next()?;
    let bytes: Vec<u8> = percent_decode_str(parts.next()?).collect();
    let encoding = Encoding::for_label(charset.as_bytes())?;
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    (!had_errors).then(|| text.into_owned())
}

fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }

    let (stem, extension) = match compacted.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_string())),
        _ => (compacted.clone(), None),
    };
    let mut stem: String = stem.chars().take(80).collect();
    if stem.is_empty() {
        return String::new();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
