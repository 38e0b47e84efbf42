use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    AddToCollectionRequest, BookDetails, BookDetailsPatch, BookId, CollectionEntryPath,
    GetAllBooksResponse, NamesResponse, SearchQuery, UserId,
};
use crate::books::validate_book_details;
use crate::context::LibraryContext;
use crate::error::LibraryError;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_books(context: Data<LibraryContext>) -> Result<HttpResponse, Error> {
    Ok(match context.books().list_all().await {
        Ok(books) => HttpResponse::Ok().json(GetAllBooksResponse { books }),
        Err(err) => {
            tracing::error!("Get all books failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn search_books(
    context: Data<LibraryContext>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner().q.unwrap_or_default();
    Ok(match context.books().search(&query).await {
        Ok(books) => HttpResponse::Ok().json(GetAllBooksResponse { books }),
        Err(LibraryError::ValidationError(message)) => HttpResponse::BadRequest().json(message),
        Err(err) => {
            tracing::error!("Search books failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_book(
    context: Data<LibraryContext>,
    details: web::Json<BookDetails>,
) -> Result<HttpResponse, Error> {
    let details = details.into_inner();
    let validation_errors = validate_book_details(&details);
    if !validation_errors.is_empty() {
        return Ok(HttpResponse::BadRequest().json(validation_errors.join(", ")));
    }

    Ok(match context.books().create(details).await {
        Ok(book_id) => HttpResponse::Ok()
            .append_header((LOCATION, format!("/api/book/{}", book_id)))
            .finish(),
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_book(
    context: Data<LibraryContext>,
    book_id: web::Path<BookId>,
    patch: web::Json<BookDetailsPatch>,
) -> Result<HttpResponse, Error> {
    Ok(
        match context
            .books()
            .update(&book_id.into_inner(), patch.into_inner())
            .await
        {
            Ok(_) => HttpResponse::Ok().finish(),
            Err(err) if err.is_not_found() => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Update book failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_book(
    context: Data<LibraryContext>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match context.books().get(&book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) if err.is_not_found() => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn delete_book(
    context: Data<LibraryContext>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match context.books().delete(&book_id.into_inner()).await {
        Ok(_) => HttpResponse::Ok().finish(),
        Err(err) => {
            tracing::error!("Delete book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_author_names(context: Data<LibraryContext>) -> Result<HttpResponse, Error> {
    Ok(match context.authors().list_names().await {
        Ok(names) => HttpResponse::Ok().json(NamesResponse { names }),
        Err(err) => {
            tracing::error!("Get author names failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_genre_names(context: Data<LibraryContext>) -> Result<HttpResponse, Error> {
    Ok(match context.genres().list_names().await {
        Ok(names) => HttpResponse::Ok().json(NamesResponse { names }),
        Err(err) => {
            tracing::error!("Get genre names failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_user_books(
    context: Data<LibraryContext>,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match context
            .user_collections()
            .list_books_for_user(&user_id.into_inner())
            .await
        {
            Ok(books) => HttpResponse::Ok().json(GetAllBooksResponse { books }),
            Err(err) => {
                tracing::error!("Get user books failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn add_to_collection(
    context: Data<LibraryContext>,
    path: web::Path<CollectionEntryPath>,
    request: Option<web::Json<AddToCollectionRequest>>,
) -> Result<HttpResponse, Error> {
    let CollectionEntryPath { user_id, book_id } = path.into_inner();
    let rating = request.and_then(|request| request.into_inner().rating);
    Ok(
        match context
            .user_collections()
            .add(&user_id, &book_id, rating)
            .await
        {
            Ok(_) => HttpResponse::Ok().finish(),
            Err(err) => {
                tracing::error!("Add book to collection failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn remove_from_collection(
    context: Data<LibraryContext>,
    path: web::Path<CollectionEntryPath>,
) -> Result<HttpResponse, Error> {
    let CollectionEntryPath { user_id, book_id } = path.into_inner();
    Ok(
        match context
            .user_collections()
            .remove(&user_id, &book_id)
            .await
        {
            Ok(_) => HttpResponse::Ok().finish(),
            Err(err) => {
                tracing::error!("Remove book from collection failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}
