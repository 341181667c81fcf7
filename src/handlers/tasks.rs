use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::models::ParseTasksRequest;
use crate::services::TasksParser;

/// Parse tasks markdown sent by the editor preview. Not cached: the text is
/// arbitrary client input and parsing it is cheap.
pub async fn parse_tasks(
    body: web::Json<ParseTasksRequest>,
    parser: web::Data<TasksParser>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(parser.parse(&body.content)))
}
