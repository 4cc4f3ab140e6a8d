use actix_files::Files;
use actix_web::web::{get, post, resource, scope, ServiceConfig};

use crate::handlers::{auth, poll, profile, vote};
use crate::middlewares::jwt::JWTMiddleware;

pub static LOGIN_URL: &str = "/login/";

pub fn config_routes(cfg: &mut ServiceConfig, jwt_secret: Vec<u8>, upload_path: &str) {
    cfg.service(
        resource("/registration/")
            .route(get().to(auth::registration_page))
            .route(post().to(auth::register)),
    )
    .service(resource(LOGIN_URL).route(get().to(auth::login_page)).route(post().to(auth::login)))
    .service(resource("/logout/").route(get().to(auth::logout)).route(post().to(auth::logout)))
    .service(Files::new("/media", upload_path))
    .service(
        scope("")
            .wrap(JWTMiddleware::new(jwt_secret))
            .service(resource("/").route(get().to(poll::index)))
            .service(resource("/profile/").route(get().to(profile::profile)).route(post().to(profile::update_profile)))
            .service(
                resource("/create_poll/")
                    .route(get().to(poll::create_poll_page))
                    .route(post().to(poll::create_poll)),
            )
            .service(resource(r"/{id:\d+}/").route(get().to(poll::detail)))
            .service(resource(r"/{id:\d+}/results/").route(get().to(poll::results)))
            .service(resource(r"/{id:\d+}/vote/").route(post().to(vote::vote))),
    );
}
