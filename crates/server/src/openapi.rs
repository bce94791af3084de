use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::health;
use crate::rest;
use shared_types::{
    AppError, Branch, BranchEnvelope, BranchesEnvelope, CaseEnvelope, CasesEnvelope,
    ClassificationCounts, CloseCaseRequest, CloseCaseRequestRecord, CloseCaseRequestView,
    CloseRequestEnvelope, CloseRequestViewsEnvelope, CloseRequestsEnvelope, CreateCaseRequest,
    CreateRppCaseRequest, CreateUserRequest, ExecCase, ExecCaseView, LoginRequest, LoginResponse,
    RaiseCloseRequest, ReviewCloseRequest, RppCase, RppCaseEnvelope, RppCasesEnvelope, Statistics,
    StatisticsEnvelope, UpdateCaseRequest, UpdateRppCaseRequest, UpdateUserRequest, UserEnvelope,
    UserSummariesEnvelope, UserSummary, UserView, UsersEnvelope,
};

/// OpenAPI documentation for the API.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        rest::auth::login,
        rest::auth::me,
        // Admin
        rest::admin::list_users,
        rest::admin::create_user,
        rest::admin::update_user,
        // Investigation cases
        rest::exec_case::list_cases,
        rest::exec_case::list_cases_for_review,
        rest::exec_case::get_case,
        rest::exec_case::create_case,
        rest::exec_case::update_case,
        rest::exec_case::close_case,
        rest::exec_case::list_exec_users,
        // Close requests
        rest::close_request::raise_close_request,
        rest::close_request::list_close_requests,
        rest::close_request::list_close_requests_for_review,
        rest::close_request::review_close_request,
        // Incoming reports
        rest::rpp_case::list_rpp_cases,
        rest::rpp_case::list_rpp_cases_for_review,
        rest::rpp_case::get_rpp_case,
        rest::rpp_case::create_rpp_case,
        rest::rpp_case::update_rpp_case,
        // Statistics
        rest::statistics::get_statistics,
        // Branches
        rest::branch::list_branches,
        rest::branch::get_branch,
        // Health
        health::health_check,
    ),
    components(schemas(
        AppError,
        LoginRequest,
        LoginResponse,
        UserView,
        UserSummary,
        UserEnvelope,
        UsersEnvelope,
        UserSummariesEnvelope,
        CreateUserRequest,
        UpdateUserRequest,
        ExecCase,
        ExecCaseView,
        CaseEnvelope,
        CasesEnvelope,
        CreateCaseRequest,
        UpdateCaseRequest,
        CloseCaseRequest,
        CloseCaseRequestRecord,
        CloseCaseRequestView,
        CloseRequestEnvelope,
        CloseRequestsEnvelope,
        CloseRequestViewsEnvelope,
        RaiseCloseRequest,
        ReviewCloseRequest,
        RppCase,
        RppCaseEnvelope,
        RppCasesEnvelope,
        CreateRppCaseRequest,
        UpdateRppCaseRequest,
        Statistics,
        ClassificationCounts,
        StatisticsEnvelope,
        Branch,
        BranchEnvelope,
        BranchesEnvelope,
        health::HealthResponse,
    )),
    tags(
        (name = "auth", description = "Login and session validation"),
        (name = "admin", description = "User administration (superadmin)"),
        (name = "cases", description = "Investigation case lifecycle (exec desk)"),
        (name = "close-requests", description = "Close-request workflow"),
        (name = "rpp-cases", description = "Incoming reports (officer desk)"),
        (name = "statistics", description = "Senior desk rollups"),
        (name = "branches", description = "Branch master lookup"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at /docs, serving the generated document.
pub fn swagger_router() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
