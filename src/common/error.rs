use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Contexto de tenant ausente, malformado, desconhecido ou inativo.
    // Propositalmente genérico: nunca dizemos QUAL empresa existe ou não.
    #[error("Contexto de empresa inválido")]
    InvalidTenant,

    // Usado tanto para "o registro não existe" quanto para "o registro
    // pertence a outra empresa". As duas situações DEVEM ser indistinguíveis
    // para quem chama, senão vira um oráculo de existência entre tenants.
    #[error("Recurso não encontrado")]
    NotFound,

    // Tentativa de definir ou alterar `company_id` diretamente.
    #[error("O campo 'company_id' é imutável")]
    ImmutableField,

    // Filtro ou atualização referenciando uma coluna que a entidade não tem.
    #[error("Coluna desconhecida: {0}")]
    InvalidFilter(String),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Já existe uma empresa com o nome '{0}'")]
    CompanyNameAlreadyExists(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Variante para erros de banco de dados (sqlx). Falhas de conexão sobem
    // sem retry: repetir cegamente uma escrita financeira quebra o
    // "no máximo uma vez" — a política de retry é de quem chama.
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Mensagem fixa, idêntica para "não existe" e "é de outro tenant".
            AppError::NotFound => (StatusCode::NOT_FOUND, "Recurso não encontrado.".to_string()),

            AppError::InvalidTenant => (
                StatusCode::BAD_REQUEST,
                "Requisição inválida para esta empresa.".to_string(),
            ),
            AppError::ImmutableField => (
                StatusCode::BAD_REQUEST,
                "O campo 'company_id' não pode ser definido ou alterado.".to_string(),
            ),
            AppError::InvalidFilter(col) => (
                StatusCode::BAD_REQUEST,
                format!("Coluna desconhecida no filtro: '{}'.", col),
            ),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::CompanyNameAlreadyExists(name) => (
                StatusCode::CONFLICT,
                format!("Já existe uma empresa com o nome '{}'.", name),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            // Todos os outros (DatabaseError, InternalServerError, ...) viram 500.
            // O detalhe vai para o log, nunca para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mapeia_para_404() {
        let resp = AppError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn tenant_invalido_e_campo_imutavel_mapeiam_para_400() {
        assert_eq!(
            AppError::InvalidTenant.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ImmutableField.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    // A mensagem de NotFound precisa ser idêntica em todos os cenários:
    // não pode haver uma variante "encontrado mas proibido".
    #[test]
    fn mensagem_de_not_found_e_unica() {
        let a = AppError::NotFound.to_string();
        let b = AppError::NotFound.to_string();
        assert_eq!(a, b);
        assert_eq!(a, "Recurso não encontrado");
    }
}
