use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use vitrine_storage::StorageError;

use crate::auth::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportPolicy {
    Ignore,
    Report,
}

/// Attached to reportable responses so outer layers can pick the cause up
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub id: String,
    pub status_code: u16,
    pub public_code: String,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    public_code: String,
    public_message: Option<String>,
    report_policy: ReportPolicy,
    report_summary: Option<String>,
}

impl ApiError {
    fn new(
        status: StatusCode,
        public_code: impl Into<String>,
        public_message: Option<String>,
        report_policy: ReportPolicy,
    ) -> Self {
        Self {
            status,
            public_code: public_code.into(),
            public_message,
            report_policy,
            report_summary: None,
        }
    }

    fn with_report(mut self, summary: impl Into<String>) -> Self {
        self.report_summary = Some(summary.into());
        self
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!("Internal error: {}", msg);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            None,
            ReportPolicy::Report,
        )
        .with_report(msg)
    }

    /// A storage failure surfaced with a user-facing message; the cause is only logged.
    pub fn storage(public_message: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind, id } => {
                Self::not_found(format!("Registro não encontrado ({kind} {id})"))
            }
            StorageError::InvalidRecord(reason) => {
                tracing::warn!("Invalid record: {}", reason);
                Self::bad_request(public_message)
            }
            other => {
                tracing::error!("Storage error: {:?}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    Some(public_message.to_string()),
                    ReportPolicy::Report,
                )
                .with_report(other.to_string())
            }
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Not found: {}", msg);
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            Some(msg),
            ReportPolicy::Ignore,
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Bad request: {}", msg);
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            Some(msg),
            ReportPolicy::Ignore,
        )
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Unauthorized: {}", msg);
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            Some(msg),
            ReportPolicy::Ignore,
        )
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Forbidden: {}", msg);
        Self::new(
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            Some(msg),
            ReportPolicy::Ignore,
        )
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Conflict: {}", msg);
        Self::new(
            StatusCode::CONFLICT,
            "CONFLICT",
            Some(msg),
            ReportPolicy::Ignore,
        )
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!("Upstream failure: {}", msg);
        Self::new(
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_ERROR",
            Some("Serviço de autenticação indisponível".to_string()),
            ReportPolicy::Report,
        )
        .with_report(msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope<'a> {
            error: ErrorBody<'a>,
        }

        #[derive(Serialize)]
        struct ErrorBody<'a> {
            code: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            id: Option<&'a str>,
            message: &'a str,
        }

        let code = self.public_code.as_str();

        let public_message = self
            .public_message
            .as_deref()
            .unwrap_or_else(|| self.status.canonical_reason().unwrap_or("Error"));

        let mut error_id: Option<String> = None;
        if self.report_policy == ReportPolicy::Report {
            error_id = Some(vitrine_types::create_id());
        }

        let mut response = (
            self.status,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    code,
                    id: error_id.as_deref(),
                    message: public_message,
                },
            }),
        )
            .into_response();

        if let Some(id) = error_id.as_deref() {
            if let Ok(v) = HeaderValue::from_str(id) {
                response.headers_mut().insert("x-error-id", v);
            }

            let report = ErrorReport {
                id: id.to_string(),
                status_code: self.status.as_u16(),
                public_code: code.to_string(),
                summary: self
                    .report_summary
                    .clone()
                    .unwrap_or_else(|| public_message.to_string()),
            };
            response.extensions_mut().insert(report);
        }

        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                Some(err.to_string()),
                ReportPolicy::Ignore,
            ),
            AuthError::SessionExpired => Self::unauthorized(err.to_string()),
            AuthError::AlreadyRegistered(_) => Self::conflict(err.to_string()),
            AuthError::Provider(reason) => Self::bad_gateway(reason),
            AuthError::Storage(err) => Self::storage("Erro ao carregar dados do usuário", err),
            AuthError::Token(err) => {
                tracing::warn!("JWT error: {:?}", err);
                Self::unauthorized("Sessão inválida")
            }
            AuthError::Hash(err) => Self::internal(format!("Password hashing failed: {err}")),
        }
    }
}

impl std::error::Error for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.public_code.as_str())
    }
}
