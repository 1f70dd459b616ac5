mod common;

use actix_web::{test, App};
use serial_test::serial;
use solar_leads::config;

use common::{admin_token, app_state, set_secret, MemRepo};

fn lead_body(nome: &str, plano: &str) -> serde_json::Value {
    serde_json::json!({
        "nome": nome,
        "empresa": "Solar Ltda",
        "telefone": "44999990000",
        "cidade": "Maringá",
        "plano": plano
    })
}

macro_rules! submit {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/leads")
            .set_json($body)
            .to_request();
        test::call_service($app, req).await
    }};
}

macro_rules! admin_list {
    ($app:expr, $token:expr, $uri:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 200);
        let v: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        v.as_array().unwrap().clone()
    }};
}

#[actix_web::test]
#[serial]
async fn public_submission_creates_lead_with_defaults() {
    set_secret();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 100)))
            .configure(config),
    )
    .await;

    let resp = submit!(&app, &lead_body("Ana", "Plano Essencial"));
    assert_eq!(resp.status(), 201);
    let lead: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    assert_eq!(lead["status"], "novo");
    assert!(!lead["id"].as_str().unwrap().is_empty());
    assert!(lead["created_at"].as_str().unwrap().ends_with('Z'));
    assert!(lead["potencia"].is_null());
}

#[actix_web::test]
#[serial]
async fn honeypot_rejects_without_persisting() {
    set_secret();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 100)))
            .configure(config),
    )
    .await;
    let token = admin_token();

    let mut body = lead_body("Bot", "Plano Essencial");
    body["honeypot"] = serde_json::json!("bot");
    let resp = submit!(&app, &body);
    assert_eq!(resp.status(), 400);

    // admin list count unchanged
    let leads = admin_list!(&app, token, "/api/admin/leads");
    assert_eq!(leads.len(), 0);

    // empty honeypot field is fine
    let mut body = lead_body("Ana", "Plano Essencial");
    body["honeypot"] = serde_json::json!("");
    let resp = submit!(&app, &body);
    assert_eq!(resp.status(), 201);
}

#[actix_web::test]
#[serial]
async fn sixth_rapid_submission_is_rate_limited() {
    set_secret();
    // real cap: 5 per window
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 5)))
            .configure(config),
    )
    .await;

    for i in 0..5 {
        let resp = submit!(&app, &lead_body(&format!("L{i}"), "Plano Essencial"));
        assert_eq!(resp.status(), 201, "submission {i} should be allowed");
    }
    let resp = submit!(&app, &lead_body("L5", "Plano Essencial"));
    assert_eq!(resp.status(), 429);
}

#[actix_web::test]
#[serial]
async fn admin_filters_are_conjunctive_and_newest_first() {
    set_secret();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 100)))
            .configure(config),
    )
    .await;
    let token = admin_token();

    let mut ids = Vec::new();
    for (nome, plano) in [
        ("Ana", "Plano Essencial"),
        ("Bia", "Plano Essencial"),
        ("Caio", "Plano Completo"),
    ] {
        let resp = submit!(&app, &lead_body(nome, plano));
        assert_eq!(resp.status(), 201);
        let lead: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        ids.push(lead["id"].as_str().unwrap().to_string());
        // keep created_at strictly increasing
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    // mark the second lead as contacted
    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/leads/{}", ids[1]))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&serde_json::json!({"status":"contatado"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // unfiltered: all three, newest first
    let all = admin_list!(&app, token, "/api/admin/leads");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["nome"], "Caio");
    assert_eq!(all[2]["nome"], "Ana");

    // status filter returns exactly the matching subset
    let contacted = admin_list!(&app, token, "/api/admin/leads?status=contatado");
    assert_eq!(contacted.len(), 1);
    assert_eq!(contacted[0]["nome"], "Bia");

    // plano filter
    let essencial = admin_list!(&app, token, "/api/admin/leads?plano=Plano%20Essencial");
    assert_eq!(essencial.len(), 2);

    // conjunction: status AND plano
    let both = admin_list!(&app, token, "/api/admin/leads?status=contatado&plano=Plano%20Completo");
    assert_eq!(both.len(), 0);

    // inclusive date bounds (lexical against ISO-8601 strings)
    let wide = admin_list!(&app, token, "/api/admin/leads?data_inicio=2000-01-01&data_fim=2999-12-31");
    assert_eq!(wide.len(), 3);
    let past = admin_list!(&app, token, "/api/admin/leads?data_fim=2000-01-01");
    assert_eq!(past.len(), 0);

    // empty-string params behave like no filter
    let blank = admin_list!(&app, token, "/api/admin/leads?status=&plano=");
    assert_eq!(blank.len(), 3);
}

#[actix_web::test]
#[serial]
async fn patch_unknown_lead_is_404_and_status_is_open_text() {
    set_secret();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 100)))
            .configure(config),
    )
    .await;
    let token = admin_token();

    let req = test::TestRequest::patch()
        .uri("/api/admin/leads/no-such-id")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&serde_json::json!({"status":"contatado"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // any string is accepted as a status
    let resp = submit!(&app, &lead_body("Ana", "Plano Essencial"));
    let lead: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let id = lead["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/leads/{}", id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&serde_json::json!({"status":"qualquer coisa"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let leads = admin_list!(&app, token, "/api/admin/leads?status=qualquer%20coisa");
    assert_eq!(leads.len(), 1);
}

#[actix_web::test]
#[serial]
async fn csv_export_is_quoted_and_newest_first() {
    set_secret();
    let app = test::init_service(
        App::new()
            .app_data(actix_web::web::Data::new(app_state(MemRepo::with_admin(), 100)))
            .configure(config),
    )
    .await;
    let token = admin_token();

    for nome in ["Ana", "Bia"] {
        let resp = submit!(&app, &lead_body(nome, "Plano Essencial"));
        assert_eq!(resp.status(), 201);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let req = test::TestRequest::get()
        .uri("/api/admin/leads/export")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
    let csv = body["csv"].as_str().unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Nome,Empresa,Telefone,Cidade,Plano,Potência,Concessionária,Observações,Status,Data"
    );
    let first = lines.next().unwrap();
    assert!(first.contains("\"Bia\""), "newest lead first: {first}");
    // optional fields render as empty quoted strings
    assert!(first.contains("\"\",\"\",\"\""));
    assert_eq!(lines.count(), 1);
}
