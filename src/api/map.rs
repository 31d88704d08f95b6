use actix_web::{HttpRequest, HttpResponse, http::StatusCode, http::header, web};
use futures_util::TryStreamExt;
use log::{debug, error, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Instant;

use crate::error::{ErrorBody, ProxyError};
use crate::mapbox::{CanvasMode, CredentialPool, static_map_url};
use crate::referer::RefererDecision;
use crate::state::AppState;

// ASCII digits only; `\d` would also admit other Unicode digits.
static COORDINATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("coordinate pattern"));
static LANGUAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{2}$").expect("language pattern"));

/// Upstream headers relayed to the caller alongside the status code.
const FORWARDED_HEADERS: [&str; 3] = ["content-type", "cache-control", "etag"];

#[derive(Debug, Deserialize)]
pub struct MapQueryParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "CanvasMode")]
    pub canvas_mode: Option<String>,
}

#[derive(Debug)]
struct MapRequest<'a> {
    latitude: &'a str,
    longitude: &'a str,
    language: &'a str,
    mode: CanvasMode,
}

fn validate(qp: &MapQueryParams) -> Result<MapRequest<'_>, ProxyError> {
    let latitude = qp.latitude.as_deref().unwrap_or_default();
    let longitude = qp.longitude.as_deref().unwrap_or_default();
    let language = qp.language.as_deref().unwrap_or_default();
    let mode = qp.canvas_mode.as_deref().and_then(|m| m.parse::<CanvasMode>().ok());

    let (true, true, true, Some(mode)) = (
        COORDINATE_RE.is_match(latitude),
        COORDINATE_RE.is_match(longitude),
        LANGUAGE_RE.is_match(language),
        mode,
    ) else {
        return Err(ProxyError::InvalidRequest);
    };

    // Unreachable after the patterns above; kept as the explicit required-field check.
    if latitude.is_empty() || longitude.is_empty() || language.is_empty() {
        return Err(ProxyError::MissingParameters);
    }

    Ok(MapRequest { latitude, longitude, language, mode })
}

fn referer_header(req: &HttpRequest) -> Result<Option<&str>, ProxyError> {
    match req.headers().get(header::REFERER) {
        Some(value) => value.to_str().map(Some).map_err(|_| ProxyError::RefererDenied),
        None => Ok(None),
    }
}

#[utoipa::path(
    get,
    path = "/api/map",
    tag = "Map",
    params(
        ("latitude" = String, Query, description = "Signed decimal latitude, e.g. 40.0"),
        ("longitude" = String, Query, description = "Signed decimal longitude, e.g. -73.5"),
        ("language" = String, Query, description = "Two lowercase letters, e.g. en"),
        ("CanvasMode" = CanvasMode, Query, description = "Theme mapped to a Mapbox style"),
        ("Referer" = String, Header, description = "Page embedding the map; must be on the allow-list"),
    ),
    responses(
        (status = 200, description = "Static map image streamed from Mapbox"),
        (status = 400, description = "Malformed or missing parameter", body = ErrorBody),
        (status = 403, description = "Referer missing or not allowed", body = ErrorBody),
        (status = 500, description = "No credentials configured or upstream failure", body = ErrorBody),
    )
)]
pub async fn get_static_map(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, ProxyError> {
    let started = Instant::now();

    let referer = referer_header(&req).inspect_err(|_| warn!("Rejected non-UTF-8 referer"))?;
    match state.referers.check(referer) {
        RefererDecision::Allowed => {}
        RefererDecision::Missing => {
            warn!("Rejected map request without referer");
            return Err(ProxyError::MissingReferer);
        }
        RefererDecision::Denied => {
            warn!("Rejected map request from referer '{}'", referer.unwrap_or_default());
            return Err(ProxyError::RefererDenied);
        }
    }

    let qp = web::Query::<MapQueryParams>::from_query(req.query_string())
        .map_err(|e| {
            warn!("Unparseable map query '{}': {}", req.query_string(), e);
            ProxyError::InvalidRequest
        })?
        .into_inner();
    let map_req = validate(&qp).inspect_err(|e| warn!("Map request rejected ({}): {:?}", e, qp))?;
    debug!("Map request: {:?}", map_req);

    let pool = CredentialPool::parse(&state.credentials.read());
    let token = pool.choose(&mut rand::rng()).ok_or_else(|| {
        error!("Credential pool is empty, cannot call Mapbox");
        ProxyError::NoCredentials
    })?;

    let url = static_map_url(&state.api_base, map_req.mode, map_req.longitude, map_req.latitude, token);
    let upstream = state.http_client.get(&url).send().await.map_err(|e| {
        let e = ProxyError::upstream(e);
        error!("Mapbox request failed after {:?}: {}", started.elapsed(), e);
        e
    })?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut resp = HttpResponse::build(status);
    for name in FORWARDED_HEADERS {
        if let Some(value) = upstream.headers().get(name).and_then(|v| v.to_str().ok()) {
            resp.insert_header((name, value.to_string()));
        }
    }
    debug!(
        "Relaying Mapbox {} for mode={} lang={} (pool size {}) after {:?}",
        status,
        map_req.mode,
        map_req.language,
        pool.len(),
        started.elapsed()
    );

    let body = upstream.bytes_stream().map_err(|e| {
        let e = e.without_url();
        error!("Mapbox body stream aborted: {}", crate::error::error_chain(&e));
        e
    });
    Ok(resp.streaming(body))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/map").route(web::route().to(get_static_map)));
}
