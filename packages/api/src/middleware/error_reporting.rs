use axum::{extract::Request, middleware::Next, response::Response};

use crate::{error::ErrorReport, middleware::session::AppUser};

const MAX_SUMMARY_LEN: usize = 4 * 1024;

fn redact_bearer(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while let Some(pos) = input[i..].find("Bearer ") {
        let abs = i + pos;
        out.push_str(&input[i..abs]);
        out.push_str("Bearer [REDACTED]");
        let token_start = abs + "Bearer ".len();
        i = input[token_start..]
            .find(char::is_whitespace)
            .map(|p| token_start + p)
            .unwrap_or(input.len());
    }
    out.push_str(&input[i..]);
    out
}

fn redact_kv(input: &str, key: &str) -> String {
    let mut out = input.to_string();
    let needle = format!("{key}=");
    let mut search_start = 0;
    while let Some(pos) = out[search_start..].find(&needle) {
        let value_start = search_start + pos + needle.len();
        let value_end = out[value_start..]
            .find(|c: char| c == '&' || c == ';' || c.is_whitespace())
            .map(|p| value_start + p)
            .unwrap_or(out.len());
        out.replace_range(value_start..value_end, "[REDACTED]");
        search_start = value_start + "[REDACTED]".len();
    }
    out
}

fn sanitize(input: &str) -> String {
    let mut out = redact_bearer(input);
    for key in ["password", "secret", "token", "apikey", "access_token"] {
        out = redact_kv(&out, key);
    }

    if out.len() > MAX_SUMMARY_LEN {
        let mut cut = MAX_SUMMARY_LEN;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
    }
    out
}

/// Logs the cause behind every reported error response, keyed by the error id
/// the client received.
pub async fn error_reporting_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let user_id = request.extensions().get::<AppUser>().and_then(|user| match user {
        AppUser::Authenticated(session) => Some(session.user.id.clone()),
        AppUser::Anonymous => None,
    });

    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    tracing::error!(
        error_id = %report.id,
        status = report.status_code,
        code = %report.public_code,
        method = %method,
        path = %path,
        user = user_id.as_deref().unwrap_or("-"),
        summary = %sanitize(&report.summary),
        "Request failed"
    );

    response
}
