use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure is scoped to a single dataset's pipeline; none of these
/// terminate the process. Messages for read/schema failures keep the
/// original-language labels so the dashboard can surface them verbatim.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro ao ler a planilha de {sheet}: {cause}")]
    ReadFailure { sheet: String, cause: String },

    #[error("Colunas Faltando na Planilha de {sheet}: {}", .columns.join(", "))]
    SchemaInvalid { sheet: String, columns: Vec<String> },

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Nenhuma planilha de {0} foi carregada")]
    DatasetMissing(String),

    #[error("Falha ao exportar: {0}")]
    Export(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ReadFailure { .. }
            | AppError::SchemaInvalid { .. }
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DatasetMissing(_) => StatusCode::NOT_FOUND,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_invalid_lists_missing_columns_verbatim() {
        let err = AppError::SchemaInvalid {
            sheet: "Produtos Estruturados".to_string(),
            columns: vec!["Assessor".to_string(), "Status".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Colunas Faltando na Planilha de Produtos Estruturados: Assessor, Status"
        );
    }

    #[test]
    fn read_failure_includes_underlying_cause() {
        let err = AppError::ReadFailure {
            sheet: "Corretagem".to_string(),
            cause: "Zip error".to_string(),
        };
        assert_eq!(err.to_string(), "Erro ao ler a planilha de Corretagem: Zip error");
    }
}
