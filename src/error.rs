use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const INTERNAL_MESSAGE: &str = "Erro interno do servidor";
pub const BODY_TOO_LARGE: &str = "Corpo da requisição muito grande";

/// Every failure a handler can answer with. The message is shown to the user as-is.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(BODY_TOO_LARGE.to_string())
        } else {
            AppError::Internal(anyhow::anyhow!(rejection.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mensagem = match &self {
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "erro": true, "mensagem": mensagem }))).into_response()
    }
}

/// Success envelope: `{erro: false, mensagem, ...dados}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub erro: bool,
    pub mensagem: String,
    #[serde(flatten)]
    pub dados: T,
}

/// Payload for responses that carry only the message.
#[derive(Debug, Serialize)]
pub struct NoData {}

pub fn reply<T: Serialize>(
    status: StatusCode,
    mensagem: impl Into<String>,
    dados: T,
) -> (StatusCode, Json<Envelope<T>>) {
    (
        status,
        Json(Envelope {
            erro: false,
            mensagem: mensagem.into(),
            dados,
        }),
    )
}

/// Handler fallback for unknown routes and unsupported methods.
pub async fn route_not_found() -> AppError {
    AppError::not_found("Rota não encontrada")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn errors_map_to_status_and_envelope() {
        let cases = [
            (AppError::validation("bad"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("who"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("nope"), StatusCode::FORBIDDEN),
            (AppError::not_found("gone"), StatusCode::NOT_FOUND),
            (AppError::conflict("dup"), StatusCode::CONFLICT),
            (
                AppError::PayloadTooLarge(BODY_TOO_LARGE.into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
        ];
        for (err, status) in cases {
            let msg = err.to_string();
            let res = err.into_response();
            assert_eq!(res.status(), status);
            let body = body_json(res).await;
            assert_eq!(body["erro"], true);
            assert_eq!(body["mensagem"], msg);
        }
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let res = AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["mensagem"], INTERNAL_MESSAGE);
        assert!(!body.to_string().contains("connection refused"));
    }

    #[test]
    fn envelope_flattens_payload() {
        #[derive(Serialize)]
        struct Payload {
            quantidade: usize,
        }
        let env = Envelope {
            erro: false,
            mensagem: "ok".into(),
            dados: Payload { quantidade: 3 },
        };
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v, json!({ "erro": false, "mensagem": "ok", "quantidade": 3 }));

        let empty = serde_json::to_value(Envelope {
            erro: false,
            mensagem: "ok".into(),
            dados: NoData {},
        })
        .unwrap();
        assert_eq!(empty, json!({ "erro": false, "mensagem": "ok" }));
    }
}
