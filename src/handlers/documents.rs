// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
};

// GET /api/hr2/training-certificates/{id}/download
#[utoipa::path(
    get,
    path = "/api/hr2/training-certificates/{id}/download",
    tag = "Training",
    params(("id" = i64, Path, description = "ID do certificado")),
    responses(
        (status = 200, description = "PDF do certificado", content_type = "application/pdf", body = Vec<u8>),
        (status = 403, description = "Certificado de outro funcionário"),
        (status = 404, description = "Certificado não encontrado"),
        (status = 500, description = "Fontes ausentes ou falha na geração")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_certificate(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let (number, pdf_bytes) = app_state
        .document_service
        .certificate_pdf(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Headers para o navegador baixar o PDF
    let disposition = format!("attachment; filename=\"certificado_{}.pdf\"", number);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
