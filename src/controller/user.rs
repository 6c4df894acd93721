use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse};

use chrono::NaiveDate;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::auth::Employee;
use crate::domain::ExitAnswer;
use crate::error::{RestError, RestResult};
use crate::store::{Resignation, ResignationStatus, Store};

use super::MessageBody;

#[derive(Debug, Deserialize)]
pub struct ResignBody {
    lwd: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResignResponse {
    pub resignation_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ResponsesBody {
    responses: Vec<ExitAnswer>,
}

#[tracing::instrument(name = "Submit a resignation", skip(store))]
#[post("/resign")]
async fn resign(
    employee: Employee,
    store: web::Data<dyn Store>,
    body: web::Json<ResignBody>,
) -> RestResult<web::Json<ResignResponse>> {
    let resignation_id = store
        .insert_resignation(employee.id(), body.lwd)
        .await
        .map_err(|e| RestError::on_conflict(e, "Resignation already submitted"))?;

    tracing::info!(%resignation_id, "Resignation submitted");

    Ok(web::Json(ResignResponse { resignation_id }))
}

#[tracing::instrument(name = "Fetch own resignation", skip(store))]
#[get("/resignation")]
async fn resignation(
    employee: Employee,
    store: web::Data<dyn Store>,
) -> RestResult<web::Json<Resignation>> {
    store
        .fetch_latest_resignation(employee.id())
        .await?
        .map(web::Json)
        .ok_or_else(|| RestError::NotFound("No resignation submitted".into()))
}

#[tracing::instrument(name = "Submit exit questionnaire", skip(store, body))]
#[post("/responses")]
async fn submit_responses(
    employee: Employee,
    store: web::Data<dyn Store>,
    body: web::Json<ResponsesBody>,
) -> RestResult<HttpResponse> {
    let ResponsesBody { responses } = body.into_inner();
    ExitAnswer::validate_all(&responses).map_err(RestError::ParseError)?;

    let approved = store
        .fetch_latest_resignation(employee.id())
        .await?
        .map_or(false, |r| r.status == ResignationStatus::Approved);
    if !approved {
        return Err(RestError::Conflict(
            "Resignation has not been approved".into(),
        ));
    }

    store
        .insert_exit_response(employee.id(), &responses)
        .await
        .map_err(|e| RestError::on_conflict(e, "Exit questionnaire already submitted"))?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Responses submitted successfully")))
}

/// Employee API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/user")
        .service(resign)
        .service(resignation)
        .service(submit_responses)
}
