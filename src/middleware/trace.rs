// src/middleware/trace.rs

use axum::http::{Request, Uri};
use tower_http::trace::MakeSpan;
use tracing::Span;

const REDACTED: &str = "[REDACTED]";

// Rotas cujo último segmento é um token de convite
const TOKEN_PATH_PREFIX: &str = "/api/invitations/";

/// Span por requisição sem tokens de convite na URI.
#[derive(Clone, Debug, Default)]
pub struct RedactedMakeSpan;

impl<B> MakeSpan<B> for RedactedMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %redact_uri(request.uri()),
        )
    }
}

fn redact_uri(uri: &Uri) -> String {
    let path = match uri.path().strip_prefix(TOKEN_PATH_PREFIX) {
        Some(rest) if !rest.is_empty() => format!("{TOKEN_PATH_PREFIX}{REDACTED}"),
        _ => uri.path().to_string(),
    };

    let Some(query) = uri.query() else {
        return path;
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.eq_ignore_ascii_case("token") => format!("{key}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{path}?{query}")
}
