use crate::config::environment::AppConfig;
use crate::infra::InfraClients;
use crate::module::step_entry::crud::LedgerStore;
use crate::service::ocr_service::{HttpOcrEngine, OcrEngine};
use axum::http::Method;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<LedgerStore>,
    pub infra: Option<InfraClients>,
    pub ocr: Option<Arc<dyn OcrEngine>>,
}

impl AppState {
    pub fn new(config: AppConfig, infra: Option<InfraClients>) -> Self {
        let ocr: Option<Arc<dyn OcrEngine>> = config
            .ocr_base_url
            .as_deref()
            .map(|base| Arc::new(HttpOcrEngine::new(base)) as Arc<dyn OcrEngine>);
        Self {
            config,
            store: Arc::new(LedgerStore::default()),
            infra,
            ocr,
        }
    }

    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    crate::module::step_entry::route::register_routes(state.clone())
        .merge(crate::module::participant::route::register_routes(state))
        .layer(cors)
}
