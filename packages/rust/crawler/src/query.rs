//! Position query building.

use url::{ParseError, Url};

use jobscout_shared::Position;

/// Set `param=position` on `base`, replacing any existing value.
///
/// Absolute URLs are rewritten through their query pairs; anything else is
/// treated as a bare `a=b&c=d` query string.
pub fn build_query(base: &str, param: &str, position: Position) -> String {
    let position = position.to_string();

    if let Ok(mut url) = Url::parse(base) {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != param)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(param, &position);
        return url.to_string();
    }

    let pair = format!("{param}={position}");
    let mut parts: Vec<&str> = base
        .trim_start_matches('?')
        .split('&')
        .filter(|part| !part.is_empty() && part.split('=').next() != Some(param))
        .collect();
    parts.push(&pair);
    parts.join("&")
}

/// Resolve a navigation target against the listing base.
///
/// Absolute URLs pass through. A bare `a=b&c=d` string becomes the query of
/// `base`; a relative path is joined onto it.
pub fn resolve_location(base: Option<&Url>, location: &str) -> Result<Url, ParseError> {
    match Url::parse(location) {
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or(ParseError::RelativeUrlWithoutBase)?;
            if location.contains('/') {
                return base.join(location);
            }
            let query = location.trim_start_matches('?');
            let mut url = base.clone();
            url.set_query((!query.is_empty()).then_some(query));
            Ok(url)
        }
        other => other,
    }
}
