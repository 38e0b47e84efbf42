use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    DetailsQuery, ErrorResponse, Isbn10Response, SearchQuery, SearchResponse,
    SuggestGenresRequest, SuggestGenresResponse,
};
use crate::error::LookupError;
use crate::genre_suggester::GenreSuggester;
use crate::open_library::OpenLibraryClient;

fn error_response(operation: &str, err: LookupError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    if err.is_bad_request() {
        return HttpResponse::BadRequest().json(body);
    }
    tracing::error!("{} failed {}", operation, err);
    match err {
        LookupError::NotConfigured => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadGateway().json(body),
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn search_open_library(
    open_library: Data<OpenLibraryClient>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, Error> {
    let query = query.into_inner().q.unwrap_or_default();
    Ok(match open_library.search(&query).await {
        Ok(results) => HttpResponse::Ok().json(SearchResponse { results }),
        Err(err) => error_response("Open Library search", err),
    })
}

#[api_v2_operation]
pub async fn get_open_library_details(
    open_library: Data<OpenLibraryClient>,
    query: web::Query<DetailsQuery>,
) -> Result<HttpResponse, Error> {
    let key = query.into_inner().key.unwrap_or_default();
    Ok(match open_library.isbn10_for_key(&key).await {
        Ok(isbn10) => HttpResponse::Ok().json(Isbn10Response { isbn10 }),
        Err(err) => error_response("Open Library details", err),
    })
}

#[api_v2_operation]
pub async fn suggest_genres(
    suggester: Data<GenreSuggester>,
    request: web::Json<SuggestGenresRequest>,
) -> Result<HttpResponse, Error> {
    Ok(match suggester.suggest(&request.into_inner()).await {
        Ok(genres) => HttpResponse::Ok().json(SuggestGenresResponse { genres }),
        Err(err) => error_response("Suggest genres", err),
    })
}
