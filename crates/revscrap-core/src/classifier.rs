use revscrap_models::{AppRef, StoreTarget};
use tracing::debug;
use url::{ParseError, Url};

const GOOGLE_PLAY_HOST: &str = "play.google.com";
const GOOGLE_PLAY_DETAILS_PATH: &str = "/store/apps/details";
const APP_STORE_HOSTS: [&str; 2] = ["apps.apple.com", "itunes.apple.com"];

/// Work out which store a submitted URL points at.
///
/// Recognized shapes:
/// - `https://play.google.com/store/apps/details?id=<package>[&hl=<lang>][&gl=<country>]`
/// - `https://apps.apple.com[/<cc>]/app[/<slug>]/id<digits>`
///
/// A missing scheme is tolerated (`play.google.com/...`). Anything else is `Invalid`.
pub fn classify(input: &str) -> StoreTarget {
    let url = match parse_lenient(input.trim()) {
        Some(url) => url,
        None => {
            debug!(input = %input, "Rejecting unparsable URL");
            return StoreTarget::Invalid;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        return StoreTarget::Invalid;
    }

    let host = match url.host_str() {
        Some(host) => host.strip_prefix("www.").unwrap_or(host),
        None => return StoreTarget::Invalid,
    };

    if host == GOOGLE_PLAY_HOST {
        classify_google_play(&url)
    } else if APP_STORE_HOSTS.contains(&host) {
        classify_app_store(&url)
    } else {
        StoreTarget::Invalid
    }
}

fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", input)).ok(),
        Err(_) => None,
    }
}

fn classify_google_play(url: &Url) -> StoreTarget {
    if url.path().trim_end_matches('/') != GOOGLE_PLAY_DETAILS_PATH {
        return StoreTarget::Invalid;
    }

    let mut app_id = None;
    let mut lang = None;
    let mut country = None;
    for (key, value) in url.query_pairs() {
        match &*key {
            "id" => app_id = Some(value.into_owned()),
            "hl" if !value.is_empty() => lang = Some(value.into_owned()),
            "gl" if !value.is_empty() => country = Some(value.into_owned()),
            _ => {}
        }
    }

    match app_id {
        Some(id) if is_package_name(&id) => {
            StoreTarget::GooglePlay(AppRef::new(id).with_lang(lang).with_country(country))
        }
        _ => StoreTarget::Invalid,
    }
}

fn classify_app_store(url: &Url) -> StoreTarget {
    let segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
        None => return StoreTarget::Invalid,
    };

    let (country, rest) = match segments.split_first() {
        Some((first, rest)) if is_country_code(first) => (Some(first.to_ascii_lowercase()), rest),
        _ => (None, segments.as_slice()),
    };

    let (slug, id_segment) = match rest {
        ["app", id] => (None, *id),
        ["app", slug, id] => (Some(slug.to_string()), *id),
        _ => return StoreTarget::Invalid,
    };

    match id_segment.strip_prefix("id") {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            StoreTarget::AppStore(AppRef::new(digits).with_slug(slug).with_country(country))
        }
        _ => StoreTarget::Invalid,
    }
}

fn is_package_name(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn is_country_code(segment: &str) -> bool {
    segment.len() == 2 && segment.chars().all(|c| c.is_ascii_alphabetic())
}
