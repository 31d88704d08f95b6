use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::mapbox::CanvasMode;

#[derive(OpenApi)]
#[openapi(
    info(title = "Static map proxy", description = "Relays Mapbox static map images to allow-listed sites"),
    paths(super::map::get_static_map),
    components(schemas(ErrorBody, CanvasMode)),
    tags((name = "Map", description = "Static map images"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_map_endpoint() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["paths"]["/api/map"]["get"].is_object());
        assert!(json["components"]["schemas"]["CanvasMode"].is_object());
    }
}
