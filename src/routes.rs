use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::auth::{create_jwt, Auth};
use crate::error::ApiError;
use crate::models::*;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/auth/login").route(web::post().to(login)),
            )
            .service(
                web::resource("/auth/me").route(web::get().to(auth_me)),
            )
            .service(
                web::resource("/auth/change-password").route(web::post().to(change_password)),
            )
            .service(
                web::resource("/content").route(web::get().to(get_content)),
            )
            .service(
                web::resource("/plans").route(web::get().to(list_plans)),
            )
            .service(
                web::resource("/leads").route(web::post().to(create_lead)),
            )
            // /admin/leads/export must register before the {id} resource
            .service(
                web::resource("/admin/leads/export").route(web::get().to(export_leads)),
            )
            .service(
                web::resource("/admin/leads").route(web::get().to(admin_list_leads)),
            )
            .service(
                web::resource("/admin/leads/{id}").route(web::patch().to(update_lead_status)),
            )
            .service(
                web::resource("/admin/plans").route(web::post().to(create_plan)),
            )
            .service(
                web::resource("/admin/plans/{id}")
                    .route(web::put().to(update_plan))
                    .route(web::delete().to(delete_plan)),
            )
            .service(
                web::resource("/admin/content").route(web::put().to(update_content)),
            )
            .service(
                web::resource("/admin/whatsapp").route(web::put().to(update_whatsapp)),
            ),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub rate_limiter: RateLimiterFacade,
}

fn now_iso() -> String {
    // Fixed-width fractional seconds keep lexical order == chronological order.
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ---------------- auth -----------------------------------------------

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let admin = data
        .repo
        .find_admin(&payload.username)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    let ok = bcrypt::verify(&payload.password, &admin.password_hash)
        .map_err(|_| ApiError::Unauthenticated)?;
    if !ok {
        return Err(ApiError::Unauthenticated);
    }
    let token = create_jwt(&admin.username).map_err(|e| {
        log::error!("jwt encode error: {e}");
        ApiError::Internal
    })?;
    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current admin username"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn auth_me(auth: Auth) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "username": auth.0.sub })))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn change_password(
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    // Overwrites the hash for the token's subject; no old-password check
    // (matches the existing contract).
    let hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(|e| {
        log::error!("bcrypt hash error: {e}");
        ApiError::Internal
    })?;
    data.repo.set_password_hash(&auth.0.sub, &hash).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status":"ok"})))
}

// ---------------- public content & plans ------------------------------

#[utoipa::path(
    get,
    path = "/api/content",
    responses((status = 200, description = "All content entries as a key/value map"))
)]
pub async fn get_content(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let entries = data.repo.get_all_content().await?;
    let map: HashMap<String, String> = entries.into_iter().map(|e| (e.key, e.value)).collect();
    Ok(HttpResponse::Ok().json(map))
}

#[utoipa::path(
    get,
    path = "/api/plans",
    responses((status = 200, description = "Plans sorted ascending by ordem", body = [Plan]))
)]
pub async fn list_plans(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let plans = data.repo.list_plans().await?;
    Ok(HttpResponse::Ok().json(plans))
}

// ---------------- public lead intake ----------------------------------

#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 400, description = "Honeypot tripped"),
        (status = 429, description = "Rate limit exceeded")
    )
)]
pub async fn create_lead(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<NewLead>,
) -> Result<HttpResponse, ApiError> {
    let ip = client_ip(&req);
    if !data.rate_limiter.allow_lead(&ip) {
        return Err(ApiError::TooManyRequests);
    }
    // Honeypot: legitimate users leave the hidden field empty. Nothing is
    // persisted when it trips.
    if payload.honeypot.as_deref().is_some_and(|h| !h.is_empty()) {
        return Err(ApiError::BadRequest);
    }
    let fields = payload.into_inner();
    let lead = Lead {
        id: Uuid::new_v4().to_string(),
        nome: fields.nome,
        empresa: fields.empresa,
        telefone: fields.telefone,
        cidade: fields.cidade,
        plano: fields.plano,
        potencia: fields.potencia,
        concessionaria: fields.concessionaria,
        observacoes: fields.observacoes,
        status: "novo".to_string(),
        created_at: now_iso(),
    };
    data.repo.insert_lead(lead.clone()).await?;
    Ok(HttpResponse::Created().json(lead))
}

// ---------------- admin lead review ------------------------------------

#[utoipa::path(
    get,
    path = "/api/admin/leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Leads newest first", body = [Lead]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn admin_list_leads(
    _auth: Auth,
    data: web::Data<AppState>,
    query: web::Query<LeadFilter>,
) -> Result<HttpResponse, ApiError> {
    let leads = data.repo.list_leads(query.into_inner().normalized()).await?;
    Ok(HttpResponse::Ok().json(leads))
}

#[utoipa::path(
    patch,
    path = "/api/admin/leads/{id}",
    request_body = LeadStatusUpdate,
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Lead not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_lead_status(
    _auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<LeadStatusUpdate>,
) -> Result<HttpResponse, ApiError> {
    // Status is an open string by contract; no enum validation.
    data.repo
        .set_lead_status(&path.into_inner(), &payload.status)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status":"ok"})))
}

#[utoipa::path(
    get,
    path = "/api/admin/leads/export",
    responses(
        (status = 200, description = "All leads as CSV, newest first"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn export_leads(
    _auth: Auth,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let leads = data.repo.list_leads(LeadFilter::default()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "csv": leads_csv(&leads) })))
}

const CSV_HEADER: &str =
    "ID,Nome,Empresa,Telefone,Cidade,Plano,Potência,Concessionária,Observações,Status,Data";

/// Render leads as CSV. Every field is quoted; absent optionals render as
/// empty quoted strings.
fn leads_csv(leads: &[Lead]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for l in leads {
        let cols: [&str; 11] = [
            &l.id,
            &l.nome,
            &l.empresa,
            &l.telefone,
            &l.cidade,
            &l.plano,
            l.potencia.as_deref().unwrap_or(""),
            l.concessionaria.as_deref().unwrap_or(""),
            l.observacoes.as_deref().unwrap_or(""),
            &l.status,
            &l.created_at,
        ];
        let line = cols
            .iter()
            .map(|c| format!("\"{}\"", c.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

// ---------------- admin plan management ---------------------------------

#[utoipa::path(
    post,
    path = "/api/admin/plans",
    request_body = NewPlan,
    responses(
        (status = 201, description = "Plan created", body = Plan),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_plan(
    _auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<NewPlan>,
) -> Result<HttpResponse, ApiError> {
    let fields = payload.into_inner();
    let plan = Plan {
        id: Uuid::new_v4().to_string(),
        nome: fields.nome,
        preco: fields.preco,
        descricao: fields.descricao,
        ordem: fields.ordem,
        destaque: fields.destaque,
        badge: fields.badge,
    };
    data.repo.insert_plan(plan.clone()).await?;
    Ok(HttpResponse::Created().json(plan))
}

#[utoipa::path(
    put,
    path = "/api/admin/plans/{id}",
    request_body = NewPlan,
    params(("id" = String, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan updated", body = Plan),
        (status = 404, description = "Plan not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_plan(
    _auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<NewPlan>,
) -> Result<HttpResponse, ApiError> {
    let plan = data
        .repo
        .update_plan(&path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(plan))
}

#[utoipa::path(
    delete,
    path = "/api/admin/plans/{id}",
    params(("id" = String, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan deleted"),
        (status = 404, description = "Plan not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_plan(
    _auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    data.repo.delete_plan(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status":"ok"})))
}

// ---------------- admin content management ------------------------------

#[utoipa::path(
    put,
    path = "/api/admin/content",
    request_body = ContentUpdate,
    responses(
        (status = 200, description = "Content upserted"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_content(
    _auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<ContentUpdate>,
) -> Result<HttpResponse, ApiError> {
    data.repo.upsert_content(&payload.key, &payload.value).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status":"ok"})))
}

#[utoipa::path(
    put,
    path = "/api/admin/whatsapp",
    request_body = WhatsAppConfig,
    responses(
        (status = 200, description = "WhatsApp contact config upserted"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_whatsapp(
    _auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<WhatsAppConfig>,
) -> Result<HttpResponse, ApiError> {
    // Two ordinary upserts against fixed keys.
    data.repo
        .upsert_content("whatsapp_numero", &payload.numero)
        .await?;
    data.repo
        .upsert_content("whatsapp_mensagem", &payload.mensagem_template)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status":"ok"})))
}
