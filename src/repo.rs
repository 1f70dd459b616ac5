use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("storage error: {0}")] Internal(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            other => RepoError::Internal(other.to_string()),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait AdminRepo: Send + Sync {
    async fn find_admin(&self, username: &str) -> RepoResult<Option<Admin>>;
    async fn insert_admin(&self, admin: Admin) -> RepoResult<()>;
    async fn set_password_hash(&self, username: &str, password_hash: &str) -> RepoResult<()>;
    async fn count_admins(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn get_all_content(&self) -> RepoResult<Vec<ContentEntry>>;
    /// Insert-or-overwrite; repeated calls with the same pair are a no-op.
    async fn upsert_content(&self, key: &str, value: &str) -> RepoResult<()>;
    async fn count_content(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait PlanRepo: Send + Sync {
    /// Always sorted ascending by `ordem`.
    async fn list_plans(&self) -> RepoResult<Vec<Plan>>;
    async fn insert_plan(&self, plan: Plan) -> RepoResult<()>;
    /// Full replace of all mutable fields.
    async fn update_plan(&self, id: &str, fields: NewPlan) -> RepoResult<Plan>;
    async fn delete_plan(&self, id: &str) -> RepoResult<()>;
    async fn count_plans(&self) -> RepoResult<i64>;
}

#[async_trait]
pub trait LeadRepo: Send + Sync {
    async fn insert_lead(&self, lead: Lead) -> RepoResult<()>;
    /// Conjunctive filters, newest first (created_at DESC).
    async fn list_leads(&self, filter: LeadFilter) -> RepoResult<Vec<Lead>>;
    async fn set_lead_status(&self, id: &str, status: &str) -> RepoResult<()>;
}

pub trait Repo: AdminRepo + ContentRepo + PlanRepo + LeadRepo {}

impl<T> Repo for T where T: AdminRepo + ContentRepo + PlanRepo + LeadRepo {}

// Postgres implementation: the single production storage backend.
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl AdminRepo for PgRepo {
        async fn find_admin(&self, username: &str) -> RepoResult<Option<Admin>> {
            let rec = sqlx::query_as::<_, Admin>(
                "SELECT id, username, password_hash, created_at FROM admins WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
            Ok(rec)
        }
        async fn insert_admin(&self, admin: Admin) -> RepoResult<()> {
            sqlx::query("INSERT INTO admins (id, username, password_hash, created_at) VALUES ($1,$2,$3,$4)")
                .bind(&admin.id)
                .bind(&admin.username)
                .bind(&admin.password_hash)
                .bind(&admin.created_at)
                .execute(&self.pool)
                .await?;
            Ok(())
        }
        async fn set_password_hash(&self, username: &str, password_hash: &str) -> RepoResult<()> {
            let res = sqlx::query("UPDATE admins SET password_hash = $2 WHERE username = $1")
                .bind(username)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(())
        }
        async fn count_admins(&self) -> RepoResult<i64> {
            let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
                .fetch_one(&self.pool)
                .await?;
            Ok(n)
        }
    }

    #[async_trait]
    impl ContentRepo for PgRepo {
        async fn get_all_content(&self) -> RepoResult<Vec<ContentEntry>> {
            let recs = sqlx::query_as::<_, ContentEntry>("SELECT key, value FROM content")
                .fetch_all(&self.pool)
                .await?;
            Ok(recs)
        }
        async fn upsert_content(&self, key: &str, value: &str) -> RepoResult<()> {
            sqlx::query(
                "INSERT INTO content (key, value) VALUES ($1,$2) \
                 ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
            )
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        async fn count_content(&self) -> RepoResult<i64> {
            let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content")
                .fetch_one(&self.pool)
                .await?;
            Ok(n)
        }
    }

    #[async_trait]
    impl PlanRepo for PgRepo {
        async fn list_plans(&self) -> RepoResult<Vec<Plan>> {
            let recs = sqlx::query_as::<_, Plan>(
                "SELECT id, nome, preco, descricao, ordem, destaque, badge FROM plans ORDER BY ordem ASC",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(recs)
        }
        async fn insert_plan(&self, plan: Plan) -> RepoResult<()> {
            sqlx::query(
                "INSERT INTO plans (id, nome, preco, descricao, ordem, destaque, badge) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7)",
            )
            .bind(&plan.id)
            .bind(&plan.nome)
            .bind(&plan.preco)
            .bind(&plan.descricao)
            .bind(plan.ordem)
            .bind(plan.destaque)
            .bind(&plan.badge)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        async fn update_plan(&self, id: &str, fields: NewPlan) -> RepoResult<Plan> {
            let res = sqlx::query(
                "UPDATE plans SET nome=$2, preco=$3, descricao=$4, ordem=$5, destaque=$6, badge=$7 WHERE id=$1",
            )
            .bind(id)
            .bind(&fields.nome)
            .bind(&fields.preco)
            .bind(&fields.descricao)
            .bind(fields.ordem)
            .bind(fields.destaque)
            .bind(&fields.badge)
            .execute(&self.pool)
            .await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(Plan {
                id: id.to_string(),
                nome: fields.nome,
                preco: fields.preco,
                descricao: fields.descricao,
                ordem: fields.ordem,
                destaque: fields.destaque,
                badge: fields.badge,
            })
        }
        async fn delete_plan(&self, id: &str) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM plans WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(())
        }
        async fn count_plans(&self) -> RepoResult<i64> {
            let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plans")
                .fetch_one(&self.pool)
                .await?;
            Ok(n)
        }
    }

    #[async_trait]
    impl LeadRepo for PgRepo {
        async fn insert_lead(&self, lead: Lead) -> RepoResult<()> {
            sqlx::query(
                "INSERT INTO leads (id, nome, empresa, telefone, cidade, plano, potencia, concessionaria, observacoes, status, created_at) \
                 VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)",
            )
            .bind(&lead.id)
            .bind(&lead.nome)
            .bind(&lead.empresa)
            .bind(&lead.telefone)
            .bind(&lead.cidade)
            .bind(&lead.plano)
            .bind(&lead.potencia)
            .bind(&lead.concessionaria)
            .bind(&lead.observacoes)
            .bind(&lead.status)
            .bind(&lead.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }
        async fn list_leads(&self, filter: LeadFilter) -> RepoResult<Vec<Lead>> {
            // created_at is ISO-8601 text, so the inclusive date bounds are
            // plain lexical comparisons.
            let recs = sqlx::query_as::<_, Lead>(
                "SELECT id, nome, empresa, telefone, cidade, plano, potencia, concessionaria, observacoes, status, created_at \
                 FROM leads \
                 WHERE ($1::text IS NULL OR status = $1) \
                   AND ($2::text IS NULL OR plano = $2) \
                   AND ($3::text IS NULL OR created_at >= $3) \
                   AND ($4::text IS NULL OR created_at <= $4) \
                 ORDER BY created_at DESC",
            )
            .bind(&filter.status)
            .bind(&filter.plano)
            .bind(&filter.data_inicio)
            .bind(&filter.data_fim)
            .fetch_all(&self.pool)
            .await?;
            Ok(recs)
        }
        async fn set_lead_status(&self, id: &str, status: &str) -> RepoResult<()> {
            let res = sqlx::query("UPDATE leads SET status = $2 WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await?;
            if res.rows_affected() == 0 { return Err(RepoError::NotFound); }
            Ok(())
        }
    }
}
