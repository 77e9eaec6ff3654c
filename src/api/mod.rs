use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::info;
use std::sync::Arc;

use crate::config::HttpdConfig;
use crate::metrics::SnapshotStore;

pub struct ApiManager {
    config: HttpdConfig,
    store: Arc<SnapshotStore>,
}

// GET handler returning the latest meter values. Whatever happens to the
// ingestion, this answers with the last snapshot.
async fn get_data(store: web::Data<SnapshotStore>) -> impl Responder {
    let snapshot = store.get();
    HttpResponse::Ok().json(&*snapshot)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/data", web::get().to(get_data));
}

impl ApiManager {
    pub fn new(config: &HttpdConfig, store: Arc<SnapshotStore>) -> Self {
        return ApiManager {
            config: config.clone(),
            store,
        };
    }

    pub async fn start_thread(&self) -> std::io::Result<()> {
        let data = web::Data::from(Arc::clone(&self.store));

        info!("Serving meter data on port {}", self.config.port);
        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .configure(configure_routes)
        })
        .bind(("0.0.0.0", self.config.port))?
        .run()
        .await
    }
}
