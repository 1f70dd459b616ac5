use chrono::{SecondsFormat, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::{Admin, Plan};
use crate::repo::Repo;

/// First-boot seeding. Each collection is only populated when empty, so
/// restarting the process never duplicates rows.
pub async fn seed_defaults(repo: &dyn Repo) -> anyhow::Result<()> {
    seed_admin(repo).await?;
    seed_plans(repo).await?;
    seed_content(repo).await?;
    Ok(())
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn seed_admin(repo: &dyn Repo) -> anyhow::Result<()> {
    if repo.count_admins().await? > 0 {
        return Ok(());
    }
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    repo.insert_admin(Admin {
        id: Uuid::new_v4().to_string(),
        username: username.clone(),
        password_hash,
        created_at: now_iso(),
    })
    .await?;
    info!("Seeded initial admin '{username}'");
    Ok(())
}

async fn seed_plans(repo: &dyn Repo) -> anyhow::Result<()> {
    if repo.count_plans().await? > 0 {
        return Ok(());
    }
    let plans = vec![
        Plan {
            id: Uuid::new_v4().to_string(),
            nome: "Plano Essencial".into(),
            preco: "R$ 49,90/mês".into(),
            descricao: vec![
                "Acompanhamento mensal da geração".into(),
                "Acompanhamento do excedente/créditos (com base na fatura enviada)".into(),
                "Orientação remota".into(),
                "Informativo de mudanças na concessionária".into(),
            ],
            ordem: 1,
            destaque: false,
            badge: None,
        },
        Plan {
            id: Uuid::new_v4().to_string(),
            nome: "Plano Avançado".into(),
            preco: "R$ 79,90/mês".into(),
            descricao: vec![
                "Tudo do Plano Essencial".into(),
                "Alteração de unidades beneficiárias quando precisar".into(),
                "20% de desconto na manutenção anual (avulsa / a negociar)".into(),
            ],
            ordem: 2,
            destaque: true,
            badge: Some("Mais escolhido".into()),
        },
        Plan {
            id: Uuid::new_v4().to_string(),
            nome: "Plano Completo".into(),
            preco: "R$ 99,90/mês".into(),
            descricao: vec![
                "Tudo do Plano Avançado".into(),
                "40% de desconto na manutenção anual (avulsa / a negociar)".into(),
            ],
            ordem: 3,
            destaque: false,
            badge: None,
        },
    ];
    for plan in plans {
        repo.insert_plan(plan).await?;
    }
    info!("Seeded default plan catalog");
    Ok(())
}

async fn seed_content(repo: &dyn Repo) -> anyhow::Result<()> {
    if repo.count_content().await? > 0 {
        return Ok(());
    }
    // Structured blocks (steps, FAQ, ...) are stored as JSON strings; the
    // content store treats every value as opaque text.
    let como_funciona_passos = serde_json::json!([
        {"numero": "1", "titulo": "Preencha o formulário", "descricao": "Informe seus dados e o plano desejado"},
        {"numero": "2", "titulo": "Falamos pelo WhatsApp", "descricao": "Confirmamos seus dados e tiramos dúvidas"},
        {"numero": "3", "titulo": "Iniciamos o acompanhamento", "descricao": "Começamos o monitoramento mensal do seu sistema"},
        {"numero": "4", "titulo": "Receba orientações", "descricao": "Você recebe informativos e orientações periódicas"}
    ]);
    let nao_incluso_itens = serde_json::json!([
        "Não inclui deslocamento",
        "Não inclui manutenção corretiva presencial",
        "Manutenção avulsa: a negociar",
        "Garantia apenas sobre serviços presenciais executados (prazo informado no orçamento)"
    ]);
    let faq_itens = serde_json::json!([
        {"pergunta": "Isso serve para demanda contratada?", "resposta": "Sim, o acompanhamento atende sistemas residenciais e comerciais com demanda contratada."},
        {"pergunta": "Até quantos kWp?", "resposta": "Atendemos sistemas de até 75 kWp."},
        {"pergunta": "Preciso ter acesso ao app?", "resposta": "Idealmente sim, mas podemos trabalhar com as faturas enviadas mensalmente."},
        {"pergunta": "Como vocês conferem créditos/excedente?", "resposta": "Analisamos suas faturas mensalmente e comparamos com a geração do sistema."},
        {"pergunta": "Se der problema, vocês atendem?", "resposta": "Oferecemos orientação remota; serviços presenciais são orçados à parte com desconto conforme o plano."},
        {"pergunta": "Posso cancelar quando quiser?", "resposta": "Sim, os planos são mensais e sem fidelidade."}
    ]);

    let defaults: &[(&str, String)] = &[
        ("hero_titulo", "Acompanhamento remoto do seu sistema solar".into()),
        ("hero_subtitulo", "Monitoramento mensal, excedente/créditos e orientação para você não ficar sem suporte".into()),
        ("hero_microcopy", "Sem deslocamento. Tudo remoto.".into()),
        ("problema_titulo", "Comprou solar e ficou sem suporte?".into()),
        ("problema_texto", "App offline, geração baixa, créditos que não batem? É comum empresas terem fechado e o cliente ficar órfão.".into()),
        ("como_funciona_titulo", "Como funciona".into()),
        ("como_funciona_passos", como_funciona_passos.to_string()),
        ("nao_incluso_titulo", "O que NÃO está incluso".into()),
        ("nao_incluso_itens", nao_incluso_itens.to_string()),
        ("faq_titulo", "Perguntas Frequentes".into()),
        ("faq_itens", faq_itens.to_string()),
        ("whatsapp_numero", "5544988574869".into()),
        ("whatsapp_mensagem", "Olá! Sou {nome} da empresa {empresa}. Telefone: {telefone}, Cidade: {cidade}. Tenho interesse no {plano}. Potência: {kwp}. Concessionária: {concessionaria}. Observações: {obs}. Quero assinar o plano de acompanhamento.".into()),
        ("footer_razao_social", "Alluz Energia Sustentável e Tecnologia da Informacao".into()),
        ("footer_cnpj", "34.782.317/0001-49".into()),
    ];
    for (key, value) in defaults {
        repo.upsert_content(key, value).await?;
    }
    info!("Seeded default site content ({} keys)", defaults.len());
    Ok(())
}
