use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, book_loans_handler, create_book_handler, create_loan_handler, delete_book_handler,
    find_books_handler, find_loans_handler, get_book_handler, return_book_handler,
    update_book_handler,
};

/// Creates the API router with the catalog and loan endpoints
///
/// Book endpoints:
/// - POST /api/books - Register a book
/// - GET /api/books - Search books (title, author, isbn)
/// - GET /api/books/:id - Get a book
/// - PUT /api/books/:id - Update title and author
/// - DELETE /api/books/:id - Delete a book
/// - GET /api/books/:id/loans - Loan history of a book
///
/// Loan endpoints:
/// - POST /api/loans - Lend a book by isbn
/// - GET /api/loans - Search loans (isbn or customer)
/// - PATCH /api/loans/:id - Record a return
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Book catalog
        .route(
            "/api/books",
            get(find_books_handler).post(create_book_handler),
        )
        .route(
            "/api/books/:id",
            get(get_book_handler)
                .put(update_book_handler)
                .delete(delete_book_handler),
        )
        .route("/api/books/:id/loans", get(book_loans_handler))
        // Loan ledger
        .route(
            "/api/loans",
            get(find_loans_handler).post(create_loan_handler),
        )
        .route("/api/loans/:id", patch(return_book_handler))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
