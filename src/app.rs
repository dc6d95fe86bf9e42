use std::net::SocketAddr;

use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{reply, route_not_found, Envelope};
use crate::state::AppState;
use crate::{auth, cors, filmes};

#[derive(Debug, Serialize)]
pub struct Banner {
    pub versao: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub async fn banner() -> (StatusCode, Json<Envelope<Banner>>) {
    reply(
        StatusCode::OK,
        "API de filmes funcionando",
        Banner {
            versao: env!("CARGO_PKG_VERSION"),
            endpoints: vec![
                "/api/auth/registrar - POST - Registrar novo usuário",
                "/api/auth/login - POST - Fazer login",
                "/api/filmes - GET - Listar seus filmes",
                "/api/filmes - POST - Cadastrar filme",
                "/api/filmes/:id - GET - Detalhar filme",
                "/api/filmes/:id - PUT - Atualizar filme",
                "/api/filmes/:id - DELETE - Remover filme",
            ],
        },
    )
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(banner).fallback(route_not_found))
        .merge(auth::router())
        .merge(filmes::router())
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(cors::cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
