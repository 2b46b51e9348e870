use axum::response::Html;
use crate::page::render_page;
use crate::state::FormState;

pub async fn index_handler() -> Html<String> {
    Html(render_page(FormState::Idle, ""))
}
