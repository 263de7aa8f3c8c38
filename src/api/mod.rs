//! HTTP surface: shared state, route table and fallbacks.

pub mod extract;
pub mod response;

use axum::{
    extract::{FromRef, State},
    middleware,
    response::Json,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::audit::{log_transaction, AuditStore, SensitiveDataMasker, TransactionLogger};
use crate::auth::{require_auth, PasswordHasher, TokenIssuer, TokenVerifier};
use crate::config::AppConfig;
use crate::database::Database;
use crate::error::AppError;
use crate::features::guru::{handlers as guru, GuruService, SqlGuruRepository};
use crate::features::kelas::{handlers as kelas, KelasService, SqlKelasRepository};
use crate::features::login::{handlers as login, LoginService};
use crate::features::mapel::{handlers as mapel, MapelService, SqlMapelRepository};
use crate::features::siswa::{handlers as siswa, SiswaService, SqlSiswaRepository};
use crate::features::users::{handlers as users, SqlUserRepository, UserService};
use crate::validation::{ReferenceLookup, SqlReferenceTable};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub login: Arc<LoginService>,
    pub guru: Arc<GuruService>,
    pub kelas: Arc<KelasService>,
    pub siswa: Arc<SiswaService>,
    pub mapel: Arc<MapelService>,
    pub verifier: TokenVerifier,
    pub database: Database,
}

impl AppState {
    /// Wire repositories and services over `database`. Fails on an unusable
    /// signing secret.
    pub fn new(config: &AppConfig, database: Database) -> Result<Self, AppError> {
        let pool = database.pool().clone();
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        let verifier = TokenVerifier::from_secret(&config.jwt_secret)?;
        let issuer =
            TokenIssuer::from_secret(&config.jwt_secret, Duration::hours(config.token_ttl_hours))?;

        let user_repo = Arc::new(SqlUserRepository::new(pool.clone()));
        let guru_table: Arc<dyn ReferenceLookup> = Arc::new(SqlReferenceTable::guru(pool.clone()));
        let kelas_table: Arc<dyn ReferenceLookup> =
            Arc::new(SqlReferenceTable::kelas(pool.clone()));

        Ok(Self {
            users: Arc::new(UserService::new(user_repo.clone(), hasher)),
            login: Arc::new(LoginService::new(user_repo.clone(), hasher, issuer)),
            guru: Arc::new(GuruService::new(
                Arc::new(SqlGuruRepository::new(pool.clone())),
                user_repo,
            )),
            kelas: Arc::new(KelasService::new(
                Arc::new(SqlKelasRepository::new(pool.clone())),
                guru_table.clone(),
            )),
            siswa: Arc::new(SiswaService::new(
                Arc::new(SqlSiswaRepository::new(pool.clone())),
                kelas_table.clone(),
            )),
            mapel: Arc::new(MapelService::new(
                Arc::new(SqlMapelRepository::new(pool)),
                guru_table,
                kelas_table,
            )),
            verifier,
            database,
        })
    }
}

/// Audit logger backed by the `transaction_logs` table.
pub fn default_logger(config: &AppConfig, state: &AppState) -> TransactionLogger {
    let pool = state.database.pool().clone();
    TransactionLogger::new(
        state.verifier.clone(),
        Arc::new(SqlUserRepository::new(pool.clone())),
        Arc::new(AuditStore::new(pool)),
        SensitiveDataMasker::new(PasswordHasher::new(config.bcrypt_cost)),
        config.device_name.clone(),
        config.body_limit_bytes,
    )
}

pub fn build_app(config: &AppConfig, database: Database) -> Result<Router, AppError> {
    let state = AppState::new(config, database)?;
    let logger = default_logger(config, &state);
    Ok(router(state, logger))
}

fn allow(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

pub fn router(state: AppState, logger: TransactionLogger) -> Router {
    let protected = Router::new()
        .route("/users", allow(get(users::list_users)))
        .route("/users/userbyid", allow(get(users::user_by_id).put(users::user_by_id)))
        .route("/users/update", allow(post(users::update_user).put(users::update_user)))
        .route("/users/deleted", allow(delete(users::delete_user).put(users::delete_user)))
        .route("/guru", allow(get(guru::list_guru)))
        .route("/guru/tambah", allow(post(guru::insert_guru)))
        .route("/guru/gurubyid", allow(get(guru::guru_by_id)))
        .route("/guru/update", allow(post(guru::update_guru).put(guru::update_guru)))
        .route("/guru/deleted", allow(delete(guru::delete_guru).put(guru::delete_guru)))
        .route("/kelas", allow(get(kelas::list_kelas)))
        .route("/kelas/tambah", allow(post(kelas::insert_kelas)))
        .route("/kelas/kelasbyid", allow(get(kelas::kelas_by_id)))
        .route("/kelas/update", allow(post(kelas::update_kelas).put(kelas::update_kelas)))
        .route("/kelas/deleted", allow(delete(kelas::delete_kelas).put(kelas::delete_kelas)))
        .route("/siswa", allow(get(siswa::list_siswa)))
        .route("/siswa/tambah", allow(post(siswa::insert_siswa)))
        .route("/siswa/siswabyid", allow(get(siswa::siswa_by_id)))
        .route("/siswa/update", allow(post(siswa::update_siswa).put(siswa::update_siswa)))
        .route("/siswa/deleted", allow(delete(siswa::delete_siswa).put(siswa::delete_siswa)))
        .route("/mapel", allow(get(mapel::list_mapel)))
        .route("/mapel/tambah", allow(post(mapel::insert_mapel)))
        .route("/mapel/mapelbyid", allow(get(mapel::mapel_by_id)))
        .route("/mapel/update", allow(post(mapel::update_mapel).put(mapel::update_mapel)))
        .route("/mapel/deleted", allow(delete(mapel::delete_mapel).put(mapel::delete_mapel)))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_auth,
        ));

    let public = Router::new()
        .route("/health", allow(get(health_check)))
        .route("/login", allow(post(login::login)))
        .route("/users/tambah", allow(post(users::register_user)));

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(logger, log_transaction))
                .into_inner(),
        )
        .with_state(state)
}

async fn health_check(State(database): State<Database>) -> Json<serde_json::Value> {
    let database_status = if database.ping().await { "healthy" } else { "error" };
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sekolah-api",
        "timestamp": chrono::Utc::now(),
        "database": database_status
    }))
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_state_requires_secret() {
        let database = Database::new_in_memory().await.unwrap();
        let config = AppConfig::default();
        assert!(matches!(
            AppState::new(&config, database),
            Err(AppError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_fallback_statuses() {
        assert_eq!(not_found().await.status(), StatusCode::NOT_FOUND);
        assert_eq!(method_not_allowed().await.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
