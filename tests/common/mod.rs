#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use solar_leads::models::*;
use solar_leads::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use solar_leads::repo::{AdminRepo, ContentRepo, LeadRepo, PlanRepo, RepoError, RepoResult};
use solar_leads::AppState;

pub const TEST_SECRET: &str = "test-secret-must-be-32-bytes-long!!";

pub fn set_secret() {
    std::env::set_var("JWT_SECRET", TEST_SECRET);
}

pub fn admin_token() -> String {
    set_secret();
    solar_leads::auth::create_jwt("admin").unwrap()
}

/// In-memory stand-in for the Postgres repo, mirroring its query semantics.
#[derive(Default)]
struct State {
    admins: HashMap<String, Admin>, // keyed by username
    leads: Vec<Lead>,
    plans: Vec<Plan>,
    content: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct MemRepo {
    state: Arc<RwLock<State>>,
}

impl MemRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh repo holding one admin ("admin" / "admin123").
    pub fn with_admin() -> Self {
        let repo = Self::new();
        let hash = bcrypt::hash("admin123", 4).unwrap(); // low cost: test speed
        repo.state.write().unwrap().admins.insert(
            "admin".to_string(),
            Admin {
                id: "a1".into(),
                username: "admin".into(),
                password_hash: hash,
                created_at: "2024-01-01T00:00:00.000000Z".into(),
            },
        );
        repo
    }
}

#[async_trait]
impl AdminRepo for MemRepo {
    async fn find_admin(&self, username: &str) -> RepoResult<Option<Admin>> {
        Ok(self.state.read().unwrap().admins.get(username).cloned())
    }
    async fn insert_admin(&self, admin: Admin) -> RepoResult<()> {
        self.state
            .write()
            .unwrap()
            .admins
            .insert(admin.username.clone(), admin);
        Ok(())
    }
    async fn set_password_hash(&self, username: &str, password_hash: &str) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        let admin = s.admins.get_mut(username).ok_or(RepoError::NotFound)?;
        admin.password_hash = password_hash.to_string();
        Ok(())
    }
    async fn count_admins(&self) -> RepoResult<i64> {
        Ok(self.state.read().unwrap().admins.len() as i64)
    }
}

#[async_trait]
impl ContentRepo for MemRepo {
    async fn get_all_content(&self) -> RepoResult<Vec<ContentEntry>> {
        Ok(self
            .state
            .read()
            .unwrap()
            .content
            .iter()
            .map(|(k, v)| ContentEntry { key: k.clone(), value: v.clone() })
            .collect())
    }
    async fn upsert_content(&self, key: &str, value: &str) -> RepoResult<()> {
        self.state
            .write()
            .unwrap()
            .content
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
    async fn count_content(&self) -> RepoResult<i64> {
        Ok(self.state.read().unwrap().content.len() as i64)
    }
}

#[async_trait]
impl PlanRepo for MemRepo {
    async fn list_plans(&self) -> RepoResult<Vec<Plan>> {
        let mut v = self.state.read().unwrap().plans.clone();
        v.sort_by_key(|p| p.ordem);
        Ok(v)
    }
    async fn insert_plan(&self, plan: Plan) -> RepoResult<()> {
        self.state.write().unwrap().plans.push(plan);
        Ok(())
    }
    async fn update_plan(&self, id: &str, fields: NewPlan) -> RepoResult<Plan> {
        let mut s = self.state.write().unwrap();
        let plan = s
            .plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        plan.nome = fields.nome;
        plan.preco = fields.preco;
        plan.descricao = fields.descricao;
        plan.ordem = fields.ordem;
        plan.destaque = fields.destaque;
        plan.badge = fields.badge;
        Ok(plan.clone())
    }
    async fn delete_plan(&self, id: &str) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        let before = s.plans.len();
        s.plans.retain(|p| p.id != id);
        if s.plans.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
    async fn count_plans(&self) -> RepoResult<i64> {
        Ok(self.state.read().unwrap().plans.len() as i64)
    }
}

#[async_trait]
impl LeadRepo for MemRepo {
    async fn insert_lead(&self, lead: Lead) -> RepoResult<()> {
        self.state.write().unwrap().leads.push(lead);
        Ok(())
    }
    async fn list_leads(&self, filter: LeadFilter) -> RepoResult<Vec<Lead>> {
        let s = self.state.read().unwrap();
        let mut v: Vec<_> = s
            .leads
            .iter()
            .filter(|l| filter.status.as_ref().map_or(true, |x| &l.status == x))
            .filter(|l| filter.plano.as_ref().map_or(true, |x| &l.plano == x))
            .filter(|l| filter.data_inicio.as_ref().map_or(true, |x| l.created_at.as_str() >= x.as_str()))
            .filter(|l| filter.data_fim.as_ref().map_or(true, |x| l.created_at.as_str() <= x.as_str()))
            .cloned()
            .collect();
        v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(v)
    }
    async fn set_lead_status(&self, id: &str, status: &str) -> RepoResult<()> {
        let mut s = self.state.write().unwrap();
        let lead = s
            .leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(RepoError::NotFound)?;
        lead.status = status.to_string();
        Ok(())
    }
}

/// App state with a fresh limiter; `lead_limit` lets rate-limit tests use the
/// real cap while everything else stays unconstrained.
pub fn app_state(repo: MemRepo, lead_limit: usize) -> AppState {
    let cfg = RateLimitConfig {
        lead_limit,
        lead_window: Duration::from_secs(60),
    };
    AppState {
        repo: Arc::new(repo),
        rate_limiter: RateLimiterFacade::new(InMemoryRateLimiter::new(true), cfg),
    }
}
