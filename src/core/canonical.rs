//! # URL Canonicalization
//!
//! Every same-page check in the router is a plain string comparison, so two
//! spellings of one page must canonicalize to the same string:
//!
//! ```text
//! https://ex.com/about        →  https://ex.com/about/
//! https://ex.com/about/       →  https://ex.com/about/
//! https://ex.com/feed.xml     →  https://ex.com/feed.xml     (file extension)
//! https://ex.com/docs#intro   →  https://ex.com/docs#intro   (fragment)
//! https://ex.com/search?q=1   →  https://ex.com/search/?q=1
//! ```

use url::{ParseError, Url};

/// Resolves `url` against `location` (or takes `location` itself when absent)
/// and applies the trailing-slash rule.
pub fn canonicalize(url: Option<&str>, location: &Url) -> Result<String, ParseError> {
    let mut resolved = match url {
        Some(raw) => location.join(raw)?,
        None => location.clone(),
    };

    if !resolved.cannot_be_a_base() && !keeps_path(&resolved) {
        let path = format!("{}/", resolved.path());
        resolved.set_path(&path);
    }

    Ok(resolved.into())
}

/// True when the path is left alone: it already ends in `/`, has a dotted
/// segment, or the URL carries a fragment.
fn keeps_path(url: &Url) -> bool {
    url.path().ends_with('/')
        || url.fragment().is_some()
        || url
            .path_segments()
            .is_some_and(|mut segments| segments.any(|segment| segment.contains('.')))
}

/// Host comparison as the platform does it: hostname plus explicit port.
/// Scheme is not part of the host, so `http://` and `https://` on the same
/// name count as the same host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

/// Extracts the first `#fragment` from a raw href, `#` included, for
/// scrolling after navigation.
pub fn scroll_target(href: &str) -> Option<String> {
    let (_, rest) = href.split_once('#')?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '\''))
        .collect();
    // The id has to end on a word character.
    let id = id.trim_end_matches(['-', '\'']);
    (!id.is_empty()).then(|| format!("#{id}"))
}
