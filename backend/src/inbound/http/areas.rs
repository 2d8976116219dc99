//! Area hierarchy lookup.
//!
//! ```text
//! GET /api/v1/areas/{class20_id}
//! ```

use actix_web::{get, web};

use crate::domain::{Error, HierarchyArea};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Resolve a class20 id to its full chain.
#[utoipa::path(
    get,
    path = "/api/v1/areas/{class20_id}",
    params(("class20_id" = String, Path, description = "Seven digit class20 id")),
    responses(
        (status = 200, description = "Hierarchy from center to class20", body = HierarchyArea),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown or incomplete chain", body = Error),
        (status = 503, description = "Area store unavailable", body = Error)
    ),
    tags = ["areas"],
    operation_id = "getAreaHierarchy"
)]
#[get("/areas/{class20_id}")]
pub async fn get_area_hierarchy(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<HierarchyArea>> {
    let hierarchy = state.areas.hierarchy(&path.into_inner()).await?;
    Ok(web::Json(hierarchy))
}
