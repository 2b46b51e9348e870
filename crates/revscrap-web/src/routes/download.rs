use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use revscrap_core::{classify, CsvExport, ErrorKind, ScrapeError};
use serde::Deserialize;
use tracing::{info, warn};
use crate::app::AppState;
use crate::page::render_page;
use crate::state::{FormEvent, FormState, Submission};

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub url: String,
}

/// Run one submission: classify, fetch, serialize, and answer with the CSV or the page in error state
pub async fn download_handler(State(state): State<AppState>, Form(form): Form<DownloadForm>) -> Response {
    let url = form.url.trim();
    let mut submission = Submission::new();
    submission.apply(FormEvent::Submit);

    let target = classify(url);
    if !target.is_valid() {
        info!(url = %url, "Rejected submission with unrecognized URL");
        submission.apply(FormEvent::UrlRejected);
        return error_page(submission.state(), url);
    }
    submission.apply(FormEvent::TargetFound);

    let result = match state.fetcher.fetch_target(&target).await {
        Ok(fetched) => CsvExport::from_reviews(&fetched).map_err(ScrapeError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(export) => {
            submission.apply(FormEvent::CsvReady);
            info!(filename = %export.filename, reviews = export.review_count, "Serving CSV download");
            csv_response(export)
        }
        Err(e) => {
            warn!(url = %url, kind = ?e.kind(), "Submission failed: {}", e);
            submission.apply(FormEvent::FetchFailed(e.kind()));
            error_page(submission.state(), url)
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidUrl => StatusCode::BAD_REQUEST,
        ErrorKind::AppNotFound => StatusCode::NOT_FOUND,
        ErrorKind::FetchTransient => StatusCode::BAD_GATEWAY,
    }
}

fn error_page(state: FormState, url: &str) -> Response {
    let status = match state {
        FormState::Error(kind) => status_for(kind),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(render_page(state, url))).into_response()
}

fn csv_response(export: CsvExport) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    )
        .into_response()
}
