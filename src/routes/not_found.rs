use crate::error::ProxyError;
use actix_web::HttpRequest;
use log::debug;

pub async fn not_found(req: HttpRequest) -> Result<&'static str, ProxyError> {
    debug!("No route for {} {}", req.method(), req.path());
    Err(ProxyError::NotFound)
}
