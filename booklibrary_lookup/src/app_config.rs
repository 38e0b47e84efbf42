use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/openlibrary")
                        .service(
                            web::resource("/search")
                                .route(web::get().to(handlers::search_open_library)),
                        )
                        .service(
                            web::resource("/details")
                                .route(web::get().to(handlers::get_open_library_details)),
                        ),
                )
                .service(
                    web::resource("/suggest-genres").route(web::post().to(handlers::suggest_genres)),
                ),
        );
}
