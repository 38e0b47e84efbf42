use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(web::resource("/books").route(web::get().to(handlers::get_all_books)))
                .service(
                    web::resource("/books/search").route(web::get().to(handlers::search_books)),
                )
                .service(web::resource("/authors").route(web::get().to(handlers::get_author_names)))
                .service(web::resource("/genres").route(web::get().to(handlers::get_genre_names)))
                .service(
                    web::scope("/book")
                        .service(web::resource("").route(web::post().to(handlers::add_book)))
                        .service(
                            web::resource("/{book_id}")
                                .route(web::get().to(handlers::get_book))
                                .route(web::patch().to(handlers::update_book))
                                .route(web::delete().to(handlers::delete_book)),
                        ),
                )
                .service(
                    web::scope("/user/{user_id}")
                        .service(
                            web::resource("/books").route(web::get().to(handlers::get_user_books)),
                        )
                        .service(
                            web::resource("/book/{book_id}")
                                .route(web::post().to(handlers::add_to_collection))
                                .route(web::delete().to(handlers::remove_from_collection)),
                        ),
                ),
        );
}
