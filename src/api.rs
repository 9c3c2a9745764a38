use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use actix_web::{get, http::header, web, HttpResponse, Responder};
use utoipa::OpenApi;

use crate::nav::{manual_entry, Navigator, ScanTarget};

/// Shared state behind the HTTP surface
pub struct ApiState {
    pub target: ScanTarget,
    pub scanning: AtomicBool,
    pub last_target: RwLock<Option<String>>,
}

impl ApiState {
    pub fn shared(target: ScanTarget) -> Arc<Self> {
        Arc::new(Self {
            target,
            scanning: AtomicBool::new(false),
            last_target: RwLock::new(None),
        })
    }
}

/// A navigator that records the redirect in the API state
pub struct ApiNavigator {
    state: Arc<ApiState>,
}

impl ApiNavigator {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

impl Navigator for ApiNavigator {
    fn navigate(&mut self, target: String) {
        *self.state.last_target.write().unwrap() = Some(target);
        self.state.scanning.store(false, Ordering::Relaxed);
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct Info {
    pub version: &'static str,
}

/// stocklens version and info
#[utoipa::path(
    responses(
        (status = 200, body = Info),
    ),
)]
#[get("/api/info")]
pub async fn info() -> impl Responder {
    web::Json(Info {
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct Status {
    /// Whether a scan loop is currently live
    pub scanning: bool,
    /// The navigation target of the most recent successful scan
    pub last_target: Option<String>,
}

/// Scan loop status
#[utoipa::path(
    responses(
        (status = 200, body = Status),
    ),
)]
#[get("/api/status")]
pub async fn status(state: web::Data<ApiState>) -> impl Responder {
    web::Json(Status {
        scanning: state.scanning.load(Ordering::Relaxed),
        last_target: state.last_target.read().unwrap().clone(),
    })
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ManualEntry {
    /// The user-typed code
    pub code: String,
}

/// Manual fallback: redirect straight to the scan target for a typed code
#[utoipa::path(
    params(ManualEntry),
    responses(
        (status = 303, description = "Redirect to the scan target"),
    ),
)]
#[get("/manual")]
pub async fn manual(
    state: web::Data<ApiState>,
    query: web::Query<ManualEntry>,
) -> impl Responder {
    let target = manual_entry(&state.target, &query.code);
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, target))
        .finish()
}

mod doc {
    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        paths(super::info, super::status, super::manual),
        components(schemas(super::Info, super::Status)),
    )]
    pub struct ApiDoc;
}
pub use doc::ApiDoc;

/// The OpenAPI description of this surface
#[get("/api/openapi.json")]
pub async fn openapi() -> impl Responder {
    web::Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};

    use super::*;

    #[actix_web::test]
    async fn manual_entry_redirects_with_encoded_code() {
        let state = ApiState::shared(ScanTarget::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .service(manual),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/manual?code=12345")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/scan/?code=12345"
        );
    }

    #[actix_web::test]
    async fn responses_serialize_the_expected_json_shape() {
        let state = ApiState::shared(ScanTarget::default());
        state.scanning.store(true, Ordering::Relaxed);
        *state.last_target.write().unwrap() = Some(String::from("/scan/?code=ABC-001"));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(state))
                .service(info)
                .service(status),
        )
        .await;

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/api/status").to_request(),
        )
        .await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["scanning"], true);
        assert_eq!(json["last_target"], "/scan/?code=ABC-001");

        let body = test::call_and_read_body(
            &app,
            test::TestRequest::get().uri("/api/info").to_request(),
        )
        .await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn status_reflects_navigator_hits() {
        let state = ApiState::shared(ScanTarget::default());
        state.scanning.store(true, Ordering::Relaxed);

        let mut navigator = ApiNavigator::new(state.clone());
        navigator.navigate(String::from("/scan/?code=ABC-001"));

        assert!(!state.scanning.load(Ordering::Relaxed));
        assert_eq!(
            state.last_target.read().unwrap().as_deref(),
            Some("/scan/?code=ABC-001")
        );
    }
}
