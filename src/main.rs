use p1meter::{ApiManager, Config, MeterReader, MetricsSnapshot, SnapshotStore};
use std::sync::Arc;
use log::{error, info};


#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let default_filter = std::env::var("P1_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("Starting with usb device {}", config.serial.device);

    // one store, written by the reader and read by the api
    let store = Arc::new(SnapshotStore::new(MetricsSnapshot::new()));

    let mut reader = MeterReader::new(&config, Arc::clone(&store));
    tokio::spawn(async move {
        /* The reader logs why it stopped, the api keeps serving the last values */
        let _ = reader.start_thread().await;
    });

    let api = ApiManager::new(&config.httpd, store);
    api.start_thread().await
}
