use actix_web::dev::HttpServiceFactory;
use actix_web::{get, put, web, HttpResponse};

use chrono::NaiveDate;

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::auth::Administrator;
use crate::domain::ExitAnswer;
use crate::error::{RestError, RestResult};
use crate::store::{Conclusion, ExitResponse, Resignation, ResignationStatus, Store};

use super::MessageBody;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcludeBody {
    resignation_id: Uuid,
    approved: bool,
    /// Final last working day; defaults to the one the employee asked for
    lwd: Option<NaiveDate>,
}

/// Listing entry: the id to conclude by and the requested last working day
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResignationSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub lwd: NaiveDate,
}

impl From<Resignation> for ResignationSummary {
    fn from(r: Resignation) -> Self {
        Self {
            id: r.id,
            lwd: r.lwd,
        }
    }
}

/// Listing entry: the submitted answers, in submission order
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExitResponseSummary {
    pub responses: Vec<ExitAnswer>,
}

impl From<ExitResponse> for ExitResponseSummary {
    fn from(response: ExitResponse) -> Self {
        Self {
            responses: response.responses,
        }
    }
}

#[tracing::instrument(name = "List resignations", skip(store))]
#[get("/resignations")]
async fn resignations(
    _admin: Administrator,
    store: web::Data<dyn Store>,
) -> RestResult<web::Json<Vec<ResignationSummary>>> {
    let resignations = store.fetch_all_resignations().await?;
    Ok(web::Json(
        resignations.into_iter().map(ResignationSummary::from).collect(),
    ))
}

#[tracing::instrument(name = "Fetch resignation details", skip(store))]
#[get("/resignations/{resignation_id}")]
async fn resignation(
    _admin: Administrator,
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid,)>,
) -> RestResult<web::Json<Resignation>> {
    let (resignation_id,) = path.into_inner();
    store
        .fetch_resignation(resignation_id)
        .await?
        .map(web::Json)
        .ok_or_else(|| RestError::NotFound("Resignation not found".into()))
}

#[tracing::instrument(name = "Conclude a resignation", skip(store))]
#[put("/conclude_resignation")]
async fn conclude_resignation(
    admin: Administrator,
    store: web::Data<dyn Store>,
    body: web::Json<ConcludeBody>,
) -> RestResult<HttpResponse> {
    let body = body.into_inner();

    let existing = store
        .fetch_resignation(body.resignation_id)
        .await?
        .ok_or_else(|| RestError::NotFound("Resignation not found".into()))?;
    if existing.status != ResignationStatus::Pending {
        return Err(RestError::Conflict("Resignation already concluded".into()));
    }

    let conclusion = if body.approved {
        Conclusion::Approve {
            lwd: body.lwd.unwrap_or(existing.lwd),
        }
    } else {
        Conclusion::Reject
    };

    // Another admin may have concluded it between the read and this write
    store
        .conclude_resignation(existing.id, &conclusion)
        .await?
        .ok_or_else(|| RestError::Conflict("Resignation already concluded".into()))?;

    tracing::info!(
        admin_id = %admin.id(),
        resignation_id = %existing.id,
        status = %conclusion.status(),
        "Resignation concluded"
    );

    let message = match conclusion {
        Conclusion::Approve { .. } => "Resignation approved",
        Conclusion::Reject => "Resignation rejected",
    };
    Ok(HttpResponse::Ok().json(MessageBody::new(message)))
}

#[tracing::instrument(name = "List exit questionnaire responses", skip(store))]
#[get("/exit_responses")]
async fn exit_responses(
    _admin: Administrator,
    store: web::Data<dyn Store>,
) -> RestResult<web::Json<Vec<ExitResponseSummary>>> {
    let responses = store.fetch_all_exit_responses().await?;
    Ok(web::Json(
        responses.into_iter().map(ExitResponseSummary::from).collect(),
    ))
}

/// Administrator API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/admin")
        .service(resignations)
        .service(resignation)
        .service(conclude_resignation)
        .service(exit_responses)
}
