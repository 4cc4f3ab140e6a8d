use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde::Serialize;

/// 303 so that browsers follow a form POST with a GET.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther().insert_header((LOCATION, location)).finish()
}

/// Page context rendered in place of a template.
pub fn page<T: Serialize>(page: &T) -> HttpResponse {
    HttpResponse::Ok().json(page)
}
