//! University administration: club provisioning and university registry.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::Deserialize;

use crate::domain::{
    Club, ClubDetails, ClubId, Email, Error, NewClubRequest, Password, University, UniversityId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Requester;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, map_club_error, map_university_error, parse_id,
};

/// Body for `POST /university/clubs`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClubBody {
    /// Club name, 3 to 80 characters.
    pub name: String,
    /// Club description.
    #[serde(default)]
    pub description: String,
    /// University the club belongs to.
    pub university_id: String,
    /// Email of the admin account created with the club.
    pub admin_email: String,
    /// Initial password of that account.
    pub admin_password: String,
}

impl NewClubBody {
    fn into_request(self) -> Result<NewClubRequest, Error> {
        let details =
            ClubDetails::try_new(&self.name, &self.description).map_err(|err| map_club_error(&err))?;
        let university: UniversityId =
            parse_id(&self.university_id, FieldName::new("universityId"))?;
        let admin_email = Email::parse(&self.admin_email)
            .map_err(|err| invalid_field(FieldName::new("adminEmail"), err))?;
        let admin_password = Password::new_secret(&self.admin_password)
            .map_err(|err| invalid_field(FieldName::new("adminPassword"), err))?;
        Ok(NewClubRequest {
            details,
            university,
            admin_email,
            admin_password,
        })
    }
}

/// Body for `POST /university/universities`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUniversityBody {
    /// Display name.
    pub name: String,
    /// ISO 3166-1 alpha-2 country code.
    #[schema(example = "GB")]
    pub country_code: String,
}

/// Clubs the caller may manage.
#[utoipa::path(
    get,
    path = "/university/clubs",
    responses(
        (status = 200, description = "Managed clubs", body = [Club]),
        (status = 401, description = "Sign in required", body = Error),
        (status = 403, description = "University admins only", body = Error)
    ),
    tags = ["university"],
    operation_id = "managedClubs"
)]
#[get("/university/clubs")]
pub async fn managed_clubs(
    state: web::Data<HttpState>,
    requester: Requester,
) -> ApiResult<web::Json<Vec<Club>>> {
    Ok(web::Json(state.provisioning.managed_clubs(&requester).await?))
}

/// Create a club together with its admin account.
#[utoipa::path(
    post,
    path = "/university/clubs",
    request_body = NewClubBody,
    responses(
        (status = 201, description = "Club created", body = Club),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Outside the caller's university", body = Error),
        (status = 404, description = "Unknown university", body = Error),
        (status = 409, description = "Admin email already registered", body = Error)
    ),
    tags = ["university"],
    operation_id = "createClub"
)]
#[post("/university/clubs")]
pub async fn create_club(
    state: web::Data<HttpState>,
    requester: Requester,
    payload: web::Json<NewClubBody>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_request()?;
    let club = state.provisioning.create_club(&requester, request).await?;
    Ok(HttpResponse::Created().json(club))
}

/// Delete a club and everything that depends on it.
#[utoipa::path(
    delete,
    path = "/university/clubs/{id}",
    params(("id" = String, Path, description = "Club id")),
    responses(
        (status = 204, description = "Club deleted"),
        (status = 403, description = "Outside the caller's university", body = Error),
        (status = 404, description = "Unknown club", body = Error)
    ),
    tags = ["university"],
    operation_id = "deleteClub"
)]
#[delete("/university/clubs/{id}")]
pub async fn delete_club(
    state: web::Data<HttpState>,
    requester: Requester,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let club: ClubId = parse_id(&path, FieldName::new("id"))?;
    state.provisioning.delete_club(&requester, &club).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register a university. Global administrators only.
#[utoipa::path(
    post,
    path = "/university/universities",
    request_body = NewUniversityBody,
    responses(
        (status = 201, description = "University created", body = University),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Global administrators only", body = Error)
    ),
    tags = ["university"],
    operation_id = "createUniversity"
)]
#[post("/university/universities")]
pub async fn create_university(
    state: web::Data<HttpState>,
    requester: Requester,
    payload: web::Json<NewUniversityBody>,
) -> ApiResult<HttpResponse> {
    University::try_new(&payload.name, &payload.country_code)
        .map_err(|err| map_university_error(&err))?;
    let university = state
        .provisioning
        .create_university(&requester, &payload.name, &payload.country_code)
        .await?;
    Ok(HttpResponse::Created().json(university))
}
