use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Ids are UUIDv4 strings, generated at the handler.
pub type Id = String;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Admin {
    pub id: Id,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Lead {
    pub id: Id,
    pub nome: String,
    pub empresa: String,
    pub telefone: String,
    pub cidade: String,
    /// Free-text plan label chosen by the visitor; not a reference to `Plan.id`.
    pub plano: String,
    pub potencia: Option<String>,
    pub concessionaria: Option<String>,
    pub observacoes: Option<String>,
    pub status: String,
    /// ISO-8601 UTC string; immutable after creation.
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewLead {
    pub nome: String,
    pub empresa: String,
    pub telefone: String,
    pub cidade: String,
    pub plano: String,
    pub potencia: Option<String>,
    pub concessionaria: Option<String>,
    pub observacoes: Option<String>,
    /// Hidden form field; any non-empty value marks the submission as a bot.
    #[serde(default)]
    pub honeypot: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadStatusUpdate {
    pub status: String,
}

/// Conjunctive lead filters; empty strings are treated as absent.
/// Date bounds are inclusive and compare lexically against `created_at`.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct LeadFilter {
    pub status: Option<String>,
    pub plano: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

impl LeadFilter {
    /// Drop empty-string parameters so `?status=` behaves like no filter.
    pub fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            status: keep(self.status),
            plano: keep(self.plano),
            data_inicio: keep(self.data_inicio),
            data_fim: keep(self.data_fim),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Plan {
    pub id: Id,
    pub nome: String,
    pub preco: String,
    /// Ordered bullet list; must round-trip exactly through create/update/list.
    pub descricao: Vec<String>,
    pub ordem: i32,
    pub destaque: bool,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPlan {
    pub nome: String,
    pub preco: String,
    pub descricao: Vec<String>,
    pub ordem: i32,
    #[serde(default)]
    pub destaque: bool,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContentUpdate {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WhatsAppConfig {
    pub numero: String,
    pub mensagem_template: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
