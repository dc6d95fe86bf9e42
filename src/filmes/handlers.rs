use axum::{
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateFilmeRequest, FilmeListPayload, FilmePayload, UpdateFilmeRequest};
use super::repo_types::Filme;
use crate::{
    auth::AuthUser,
    error::{reply, route_not_found, AppError, Envelope, NoData},
    json::parse_body,
    state::AppState,
};

pub const FILME_NOT_FOUND: &str = "Filme não encontrado";
pub const FILME_FORBIDDEN: &str = "Você não tem permissão para acessar este filme";

type Reply<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

pub fn filme_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/filmes",
            get(list_filmes)
                .post(create_filme)
                .fallback(route_not_found),
        )
        .route(
            "/api/filmes/:id",
            get(get_filme)
                .put(update_filme)
                .delete(delete_filme)
                .fallback(route_not_found),
        )
}

type IdParam = Result<Path<String>, PathRejection>;

/// Loads a movie and checks the caller owns it. An id that does not decode or
/// parse is just an unknown id.
async fn load_owned(state: &AppState, user: &AuthUser, raw_id: IdParam) -> Result<Filme, AppError> {
    let id = raw_id
        .ok()
        .and_then(|Path(raw)| Uuid::parse_str(&raw).ok())
        .ok_or_else(|| AppError::not_found(FILME_NOT_FOUND))?;

    let filme = state
        .filmes
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(FILME_NOT_FOUND))?;

    if filme.user_id != user.id {
        warn!(user_id = %user.id, filme_id = %id, owner = %filme.user_id, "access to foreign filme");
        return Err(AppError::forbidden(FILME_FORBIDDEN));
    }
    Ok(filme)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_filmes(State(state): State<AppState>, user: AuthUser) -> Reply<FilmeListPayload> {
    let filmes = state.filmes.list_by_owner(user.id).await?;
    Ok(reply(
        StatusCode::OK,
        "Filmes listados com sucesso",
        FilmeListPayload {
            quantidade: filmes.len(),
            filmes,
        },
    ))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_filme(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Bytes, BytesRejection>,
) -> Reply<FilmePayload> {
    let payload: CreateFilmeRequest = parse_body(&body?)?;
    let new = payload.validate()?;

    let filme = state.filmes.create(user.id, new).await?;

    info!(filme_id = %filme.id, "filme created");
    Ok(reply(
        StatusCode::CREATED,
        "Filme cadastrado com sucesso",
        FilmePayload { filme },
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_filme(
    State(state): State<AppState>,
    user: AuthUser,
    id: IdParam,
) -> Reply<FilmePayload> {
    let filme = load_owned(&state, &user, id).await?;
    Ok(reply(StatusCode::OK, "Filme encontrado", FilmePayload { filme }))
}

#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_filme(
    State(state): State<AppState>,
    user: AuthUser,
    id: IdParam,
    body: Result<Bytes, BytesRejection>,
) -> Reply<FilmePayload> {
    let current = load_owned(&state, &user, id).await?;

    let mut changes: UpdateFilmeRequest = parse_body(&body?)?;
    if changes.strip_owner() {
        warn!(filme_id = %current.id, "ignoring attempt to change owner");
    }
    if changes.is_empty() {
        return Err(AppError::validation("Nenhum dado fornecido para atualização"));
    }
    let merged = changes.apply(current)?;

    let filme = state
        .filmes
        .update(&merged)
        .await?
        .ok_or_else(|| AppError::not_found(FILME_NOT_FOUND))?;

    info!(filme_id = %filme.id, "filme updated");
    Ok(reply(
        StatusCode::OK,
        "Filme atualizado com sucesso",
        FilmePayload { filme },
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_filme(
    State(state): State<AppState>,
    user: AuthUser,
    id: IdParam,
) -> Reply<NoData> {
    let filme = load_owned(&state, &user, id).await?;

    if !state.filmes.delete(filme.id, user.id).await? {
        return Err(AppError::not_found(FILME_NOT_FOUND));
    }

    info!(filme_id = %filme.id, "filme deleted");
    Ok(reply(StatusCode::OK, "Filme removido com sucesso", NoData {}))
}
