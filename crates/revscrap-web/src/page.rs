use crate::state::FormState;

/// Render the single page, reflecting `state` and keeping the submitted URL in the input
pub fn render_page(state: FormState, url: &str) -> String {
    let message = state.message().map(escape_html).unwrap_or_default();
    let message_class = match state {
        FormState::Error(_) => "message error",
        FormState::Ready => "message ready",
        _ => "message",
    };
    let loading_hidden = if state.is_busy() { "" } else { " hidden" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Revscrap</title>
<style>{style}</style>
</head>
<body>
<main>
<h1>REVIEW SCRAPER</h1>
<form id="scrape-form" method="post" action="/download" data-state="{state}">
<input id="url" name="url" type="text" placeholder="Enter app url..." value="{url}" autocomplete="off" required>
<button id="search" type="submit">Search</button>
</form>
<div id="loading" class="loading"{loading_hidden}>Fetching reviews, this can take a while...</div>
<p id="error-message" class="{message_class}" role="alert">{message}</p>
</main>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        state = state,
        url = escape_html(url),
        loading_hidden = loading_hidden,
        message_class = message_class,
        message = message,
        script = SCRIPT,
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f5f6f8; margin: 0; }
main { max-width: 640px; margin: 10vh auto; padding: 0 1rem; text-align: center; }
h1 { letter-spacing: 0.2em; }
form { display: flex; gap: 0.5rem; }
input { flex: 1; padding: 0.6rem; font-size: 1rem; }
button { padding: 0.6rem 1.2rem; font-size: 1rem; cursor: pointer; }
.loading { margin-top: 1rem; color: #555; }
.message { min-height: 1.5rem; margin-top: 1rem; }
.message.error { color: #b00020; }
.message.ready { color: #1b7f3a; }
"#;

// Mirrors FormState transitions in the browser and downloads the CSV without leaving the page.
const SCRIPT: &str = r#"
(function () {
  const form = document.getElementById("scrape-form");
  const input = document.getElementById("url");
  const button = document.getElementById("search");
  const loading = document.getElementById("loading");
  const message = document.getElementById("error-message");

  function setState(state, text) {
    form.dataset.state = state;
    const busy = state === "validating" || state === "fetching";
    loading.hidden = !busy;
    button.disabled = busy;
    message.textContent = text || "";
    message.className = "message" + (state === "error" ? " error" : state === "ready" ? " ready" : "");
  }

  function filenameFrom(response) {
    const disposition = response.headers.get("Content-Disposition") || "";
    const match = /filename="([^"]+)"/.exec(disposition);
    return match ? match[1] : "reviews.csv";
  }

  input.addEventListener("input", function () {
    const state = form.dataset.state;
    if (state === "error" || state === "ready" || state === "idle") {
      setState("idle");
    }
  });

  form.addEventListener("submit", async function (event) {
    event.preventDefault();
    if (form.dataset.state === "error" || form.dataset.state === "ready") {
      setState("idle");
    }
    setState("validating");
    setState("fetching");
    try {
      const response = await fetch(form.action, {
        method: "POST",
        body: new URLSearchParams(new FormData(form)),
      });
      const type = response.headers.get("Content-Type") || "";
      if (response.ok && type.startsWith("text/csv")) {
        const blob = await response.blob();
        const link = document.createElement("a");
        link.href = URL.createObjectURL(blob);
        link.download = filenameFrom(response);
        document.body.appendChild(link);
        link.click();
        link.remove();
        URL.revokeObjectURL(link.href);
        setState("ready", "Reviews downloaded.");
      } else {
        const html = await response.text();
        const page = new DOMParser().parseFromString(html, "text/html");
        const error = page.getElementById("error-message");
        setState("error", error && error.textContent ? error.textContent : "Something went wrong, please try again.");
      }
    } catch (err) {
      setState("error", "Could not reach the server. Please try again.");
    }
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use revscrap_core::ErrorKind;

    #[test]
    fn test_idle_page() {
        let html = render_page(FormState::Idle, "");
        assert!(html.contains("<title>Revscrap</title>"));
        assert!(html.contains("REVIEW SCRAPER"));
        assert!(html.contains("placeholder=\"Enter app url...\""));
        assert!(html.contains("data-state=\"idle\""));
        assert!(html.contains("class=\"loading\" hidden"));
    }

    #[test]
    fn test_error_page_shows_message_and_keeps_url() {
        let html = render_page(FormState::Error(ErrorKind::AppNotFound), "https://example.com/?a=1&b=\"2\"");
        assert!(html.contains(&escape_html(ErrorKind::AppNotFound.message())));
        assert!(html.contains("class=\"message error\""));
        assert!(html.contains("value=\"https://example.com/?a=1&amp;b=&quot;2&quot;\""));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>'x' & \"y\"</script>"), "&lt;script&gt;&#39;x&#39; &amp; &quot;y&quot;&lt;/script&gt;");
    }
}
