use revscrap_models::{Rating, ReviewRecord};
use revscrap_sources::{AppStoreReview, PlayReview, RawReview};
use tracing::warn;

/// Normalize raw store reviews lazily, preserving source order.
///
/// Reviews whose rating is outside 1-5 (or not a number) are dropped, not clamped.
pub fn normalize_all(raw: Vec<RawReview>) -> impl Iterator<Item = ReviewRecord> {
    raw.into_iter().filter_map(normalize)
}

pub fn normalize(raw: RawReview) -> Option<ReviewRecord> {
    match raw {
        RawReview::GooglePlay(review) => normalize_play(review),
        RawReview::AppStore(review) => normalize_app_store(review),
    }
}

fn normalize_play(review: PlayReview) -> Option<ReviewRecord> {
    let rating = match Rating::new(review.score) {
        Ok(rating) => rating,
        Err(e) => {
            warn!(review_id = %review.review_id, "Dropping Google Play review: {}", e);
            return None;
        }
    };

    let text = join_title_body(review.title.as_deref().unwrap_or(""), &review.content);
    let reply = review.reply_content.as_deref().map(clean_text).unwrap_or_default();

    Some(
        ReviewRecord::new(review.at.date_naive(), clean_text(&review.user_name), text, rating)
            .with_reply(reply, review.replied_at.map(|d| d.date_naive()))
            .with_thumbs_up(review.thumbs_up_count),
    )
}

fn normalize_app_store(review: AppStoreReview) -> Option<ReviewRecord> {
    let rating = match Rating::parse(&review.rating) {
        Ok(rating) => rating,
        Err(e) => {
            warn!(review_id = %review.id, "Dropping App Store review: {}", e);
            return None;
        }
    };

    let text = join_title_body(&review.title, &review.review);
    let (reply, reply_date) = match &review.developer_response {
        Some(response) => (clean_text(&response.body), Some(response.modified.date_naive())),
        None => (String::new(), None),
    };

    Some(
        ReviewRecord::new(review.date.date_naive(), clean_text(&review.user_name), text, rating)
            .with_reply(reply, reply_date),
    )
}

/// Title and body joined by a single space, skipping whichever is empty
fn join_title_body(title: &str, body: &str) -> String {
    let title = clean_text(title);
    let body = clean_text(body);
    match (title.is_empty(), body.is_empty()) {
        (true, _) => body,
        (false, true) => title,
        (false, false) => format!("{} {}", title, body),
    }
}

/// Flatten line breaks so every review stays on one spreadsheet row
fn clean_text(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
