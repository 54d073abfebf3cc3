use std::sync::Arc;

use crate::config::Config;
use derivatex_core::{
    derivatives::{DerivativeService, DerivativeServiceTrait},
    users::UserRepositoryTrait,
    utils::time_utils::SystemClock,
};
use derivatex_storage_sqlite::{
    actions::ActionRepository,
    db::{self, write_actor},
    derivatives::DerivativeRepository,
    users::UserRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub derivative_service: Arc<dyn DerivativeServiceTrait + Send + Sync>,
    pub user_repository: Arc<dyn UserRepositoryTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("DX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let derivative_repository = Arc::new(DerivativeRepository::new(pool.clone()));
    let action_repository = Arc::new(ActionRepository::new(pool.clone()));
    let derivative_service: Arc<dyn DerivativeServiceTrait + Send + Sync> =
        Arc::new(DerivativeService::new(
            derivative_repository,
            action_repository,
            writer.clone(),
            Arc::new(SystemClock),
        ));

    let user_repository: Arc<dyn UserRepositoryTrait + Send + Sync> =
        Arc::new(UserRepository::new(pool.clone(), writer));

    Ok(Arc::new(AppState {
        derivative_service,
        user_repository,
    }))
}
