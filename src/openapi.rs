use crate::models::{
    ContentUpdate, Lead, LeadStatusUpdate, LoginRequest, NewLead, NewPlan, Plan, TokenResponse,
    WhatsAppConfig,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::login,
        crate::routes::auth_me,
        crate::routes::change_password,
        crate::routes::get_content,
        crate::routes::list_plans,
        crate::routes::create_lead,
        crate::routes::admin_list_leads,
        crate::routes::update_lead_status,
        crate::routes::export_leads,
        crate::routes::create_plan,
        crate::routes::update_plan,
        crate::routes::delete_plan,
        crate::routes::update_content,
        crate::routes::update_whatsapp,
    ),
    components(schemas(
        Lead, NewLead, LeadStatusUpdate,
        Plan, NewPlan,
        ContentUpdate, WhatsAppConfig,
        LoginRequest, TokenResponse
    )),
    tags(
        (name = "auth", description = "Admin login and token operations"),
        (name = "leads", description = "Lead intake and review"),
        (name = "plans", description = "Subscription plan catalog"),
        (name = "content", description = "Editable site content"),
    )
)]
pub struct ApiDoc;
