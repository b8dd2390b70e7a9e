//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowings, health, requests, settings, stats, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libroteca API",
        version = "0.1.0",
        description = "School Library Borrowing Lifecycle REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::popular_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Students
        students::list_students,
        students::get_student,
        students::create_student,
        students::update_student,
        students::deactivate_student,
        // Requests
        requests::submit_request,
        requests::list_requests,
        requests::my_requests,
        requests::review_request,
        requests::cancel_request,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::my_borrowings,
        borrowings::issue_book,
        borrowings::preview_fine,
        borrowings::return_book,
        borrowings::mark_fine_paid,
        // Settings
        settings::get_settings,
        settings::update_settings,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Students
            crate::models::student::Student,
            crate::models::student::StudentSummary,
            crate::models::student::CreateStudent,
            crate::models::student::UpdateStudent,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::RequestDetails,
            crate::models::request::RequestStatus,
            crate::models::request::ReviewDecision,
            requests::SubmitRequestPayload,
            requests::ReviewRequestPayload,
            requests::ReviewResponse,
            // Borrowings
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::FinePreview,
            borrowings::IssueBookPayload,
            borrowings::ReturnBookPayload,
            // Settings
            settings::SettingsResponse,
            settings::UpdateSettingsRequest,
            // Stats
            stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "students", description = "Student management"),
        (name = "requests", description = "Borrow request workflow"),
        (name = "borrowings", description = "Issuance, returns and fines"),
        (name = "settings", description = "Library policy settings"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
