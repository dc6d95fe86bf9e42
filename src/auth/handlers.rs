use axum::{
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            is_valid_email, non_blank, normalize_email, AuthPayload, LoginRequest, PublicUser,
            RegisterRequest,
        },
        password::{hash_password_blocking, verify_password_blocking},
        repo::EMAIL_TAKEN,
        repo_types::NewUser,
    },
    error::{reply, route_not_found, AppError, Envelope},
    json::parse_body,
    state::AppState,
};

pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/auth/registrar",
            post(register).fallback(route_not_found),
        )
        .route("/api/auth/login", post(login).fallback(route_not_found))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Envelope<AuthPayload>>), AppError> {
    let payload: RegisterRequest = parse_body(&body?)?;

    let (Some(nome), Some(email), Some(senha)) = (
        non_blank(payload.nome.as_deref()),
        non_blank(payload.email.as_deref()),
        payload.senha.filter(|s| !s.is_empty()),
    ) else {
        warn!("registration with missing fields");
        return Err(AppError::validation(
            "Todos os campos são obrigatórios: nome, email e senha",
        ));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("E-mail inválido"));
    }

    // Ensure email is not taken; the unique index catches any race after this.
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::conflict(EMAIL_TAKEN));
    }

    let password_hash = hash_password_blocking(senha).await?;

    let user = state
        .users
        .create(NewUser {
            nome: nome.to_string(),
            email,
            password_hash,
        })
        .await?;

    let token = state.jwt.issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(reply(
        StatusCode::CREATED,
        "Usuário registrado com sucesso",
        AuthPayload {
            usuario: PublicUser::from(user),
            token,
        },
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Envelope<AuthPayload>>), AppError> {
    let payload: LoginRequest = parse_body(&body?)?;

    let (Some(email), Some(senha)) = (
        non_blank(payload.email.as_deref()),
        payload.senha.filter(|s| !s.is_empty()),
    ) else {
        warn!("login with missing fields");
        return Err(AppError::validation("Email e senha são obrigatórios"));
    };
    let email = normalize_email(email);

    let user = state.users.find_by_email(&email).await?;
    let hash = user.as_ref().map(|u| u.password_hash.clone());
    let ok = verify_password_blocking(senha, hash).await?;

    let user = match user {
        Some(u) if ok => u,
        Some(u) => {
            warn!(email = %email, user_id = %u.id, "login invalid password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let token = state.jwt.issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(reply(
        StatusCode::OK,
        "Login realizado com sucesso",
        AuthPayload {
            usuario: PublicUser::from(user),
            token,
        },
    ))
}
