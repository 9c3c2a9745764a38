#[macro_use]
extern crate log;

use actix_web::{web, App, HttpServer};
use tokio::runtime::Runtime;

use stocklens::{
    api::{self, ApiState},
    config::Config,
    error::Error,
};

#[cfg(all(feature = "camera", feature = "qr"))]
use std::sync::atomic::Ordering;
#[cfg(all(feature = "camera", feature = "qr"))]
use stocklens::{
    api::ApiNavigator,
    cameras::{CaptureDevice, StreamRequest, Webcam},
    qr::QrDecoder,
    scan::{self, Pacer, Scanner},
};

const CONFIG_PATH: &str = "stocklens.toml";

fn main() -> Result<(), Error> {
    env_logger::init();

    info!("stocklens starting up...");

    let config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(Error::FailedToReadConfig) => {
            warn!("no config at {CONFIG_PATH}, using defaults");
            Config::default()
        }
        Err(err) => return Err(err),
    };

    let rt = Runtime::new().unwrap();

    rt.block_on(async move {
        let state = ApiState::shared(config.scan.target());

        #[cfg(all(feature = "camera", feature = "qr"))]
        let _scan = {
            let mut device = Webcam::new();
            match device.open(&StreamRequest::from_config(&config.camera)) {
                Ok(session) => {
                    state.scanning.store(true, Ordering::Relaxed);
                    let scanner = Scanner::new(session, QrDecoder, config.scan.target());
                    Some(scan::start(
                        scanner,
                        ApiNavigator::new(state.clone()),
                        Pacer::refresh(&config.scan.refresh_rate),
                    ))
                }
                Err(err) => {
                    error!("camera path unavailable, manual entry only: {err}");
                    None
                }
            }
        };
        #[cfg(not(all(feature = "camera", feature = "qr")))]
        info!("built without camera capture, manual entry only");

        let data = web::Data::from(state);
        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .service(api::info)
                .service(api::status)
                .service(api::manual)
                .service(api::openapi)
        })
        .bind(("0.0.0.0", config.server.port))
        .unwrap()
        .run()
        .await
        .unwrap();
    });

    Ok(())
}
