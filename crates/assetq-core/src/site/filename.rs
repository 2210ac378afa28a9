//! Local file names for download links.

/// Picks the file name for a download link: the `file` query parameter when
/// present (catalog sites often serve `get?file=Name.zip`), else the last path
/// segment. The result is sanitized; `None` if nothing usable remains.
pub fn filename_for_link(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    let from_query = parsed
        .query_pairs()
        .find(|(k, _)| k == "file")
        .map(|(_, v)| v.into_owned());
    let candidate = match from_query {
        Some(v) => v,
        None => parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
    };
    let name = sanitize_filename(&candidate);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

/// Sanitizes a candidate file name for the local filesystem.
///
/// - Replaces NUL, `/`, `\`, Windows-reserved punctuation, and control characters with `_`
/// - Trims leading/trailing spaces, dots, and underscores
/// - Collapses consecutive underscores
/// - Limits length to 255 bytes
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = match c {
            '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '\t' => '_',
            c if c.is_control() => '_',
            c => c,
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
