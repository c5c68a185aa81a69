//! Integration tests for the HTTP contract
//!
//! Exercises the routes the frontend consumes: client/incident creation,
//! sorted listings, status transitions, statistics and the multipart ETL
//! upload, against an in-memory database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt; // for `oneshot`

use soportes_server::{build_router, etl::Clasificador, AppState};

/// Test helper: app over a fresh in-memory database
async fn setup_app() -> axum::Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Should open in-memory database");
    soportes_common::db::init_schema(&pool)
        .await
        .expect("Should create schema");

    let state = AppState::new(pool, Clasificador::default());
    build_router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Test helper: build a multipart/form-data request for the ETL endpoint
fn multipart_request(uri: &str, partes: &[(&str, &str)]) -> Request<Body> {
    const LIMITE: &str = "test-boundary-7MA4YWxkTrZu0gW";

    let mut cuerpo = String::new();
    for (nombre, contenido) in partes {
        cuerpo.push_str(&format!(
            "--{LIMITE}\r\nContent-Disposition: form-data; name=\"{nombre}\"; \
             filename=\"{nombre}.csv\"\r\nContent-Type: text/csv\r\n\r\n{contenido}\r\n"
        ));
    }
    cuerpo.push_str(&format!("--{LIMITE}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={LIMITE}"),
        )
        .body(Body::from(cuerpo))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn crear_cliente(app: &axum::Router, nombre: &str, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clientes",
            &json!({ "nombre": nombre, "email": email, "telefono": "600111222" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

async fn crear_incidencia(app: &axum::Router, id_cliente: i64, descripcion: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/incidencias",
            &json!({
                "id_cliente": id_cliente,
                "descripcion": descripcion,
                "estado": "ABIERTA",
                "fecha": "01-03-2025",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "soportes-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_root_banner() {
    let app = setup_app().await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["mensaje"].is_string());
}

// =============================================================================
// Clients
// =============================================================================

#[tokio::test]
async fn test_crear_cliente_y_duplicado() {
    let app = setup_app().await;

    let cliente = crear_cliente(&app, "Ana Ruiz", "ana@ejemplo.com").await;
    assert_eq!(cliente["id"], 1);
    assert_eq!(cliente["nombre"], "Ana Ruiz");
    assert_eq!(cliente["email"], "ana@ejemplo.com");
    assert_eq!(cliente["telefono"], "600111222");

    // Same email with different case must be rejected
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clientes",
            &json!({ "nombre": "Otra Ana", "email": "ANA@ejemplo.com", "telefono": "600" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["detail"], "El email ya está registrado");
}

#[tokio::test]
async fn test_crear_cliente_campo_vacio() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clientes",
            &json!({ "nombre": "Ana", "email": "   ", "telefono": "600" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["detail"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_clientes_ordenados_por_nombre() {
    let app = setup_app().await;

    crear_cliente(&app, "Carlos", "carlos@ejemplo.com").await;
    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;
    crear_cliente(&app, "Benito", "benito@ejemplo.com").await;

    let response = app.oneshot(get("/api/clientes/sorted")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let nombres: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["nombre"].as_str().unwrap())
        .collect();
    assert_eq!(nombres, vec!["Ana", "Benito", "Carlos"]);
}

#[tokio::test]
async fn test_incidencias_de_cliente_inexistente() {
    let app = setup_app().await;

    let response = app.oneshot(get("/api/clientes/99/incidencias")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["detail"], "Cliente no encontrado");
}

#[tokio::test]
async fn test_listado_de_incidencias_de_cliente() {
    let app = setup_app().await;

    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;
    crear_incidencia(&app, 1, "El servidor se ha caído").await;

    let response = app.oneshot(get("/api/clientes/1/incidencias")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let lista = body.as_array().unwrap();
    assert_eq!(lista.len(), 1);
    assert_eq!(lista[0]["fecha"], "01-03-2025");
    assert_eq!(lista[0]["estado"], "ABIERTA");
    assert_eq!(lista[0]["prioridad_ia"], "CRÍTICA");
}

// =============================================================================
// Incidents
// =============================================================================

#[tokio::test]
async fn test_crear_incidencia_clasifica_prioridad() {
    let app = setup_app().await;
    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;

    let incidencia = crear_incidencia(&app, 1, "Error crítico: el servidor no responde").await;
    assert_eq!(incidencia["id"], 1);
    assert_eq!(incidencia["id_cliente"], 1);
    assert_eq!(incidencia["prioridad_ia"], "CRÍTICA");
    assert_eq!(incidencia["estado"], "ABIERTA");
}

#[tokio::test]
async fn test_crear_incidencia_cliente_inexistente() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/incidencias",
            &json!({ "id_cliente": 7, "descripcion": "No arranca" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["detail"],
        "No se puede crear incidencia para un cliente inexistente"
    );
}

#[tokio::test]
async fn test_crear_incidencia_fecha_malformada() {
    let app = setup_app().await;
    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/incidencias",
            &json!({ "id_cliente": 1, "descripcion": "No arranca", "fecha": "2025-03-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["detail"].as_str().unwrap().contains("DD-MM-YYYY"));
}

#[tokio::test]
async fn test_actualizar_estado() {
    let app = setup_app().await;
    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;
    crear_incidencia(&app, 1, "Fallo en la impresora").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/incidencias/1/estado",
            &json!({ "estado": "EN PROCESO" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let mensaje = body["mensaje"].as_str().unwrap();
    assert!(mensaje.contains("La incidencia 1"));
    assert!(mensaje.contains("ha pasado de ABIERTA a EN PROCESO"));

    // The transition must not touch the stored priority
    let response = app.oneshot(get("/api/clientes/1/incidencias")).await.unwrap();
    let lista = extract_json(response.into_body()).await;
    assert_eq!(lista[0]["estado"], "EN PROCESO");
    assert_eq!(lista[0]["prioridad_ia"], "ALTA");
}

#[tokio::test]
async fn test_actualizar_estado_incidencia_inexistente() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/incidencias/42/estado",
            &json!({ "estado": "CERRADA" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["detail"], "Incidencia no encontrada");
}

#[tokio::test]
async fn test_actualizar_estado_valor_invalido() {
    let app = setup_app().await;
    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;
    crear_incidencia(&app, 1, "No arranca").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/incidencias/1/estado",
            &json!({ "estado": "ARCHIVADA" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["detail"].as_str().unwrap().contains("ARCHIVADA"));
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_estadisticas() {
    let app = setup_app().await;

    crear_cliente(&app, "Ana", "ana@ejemplo.com").await;
    crear_cliente(&app, "Benito", "benito@ejemplo.com").await;
    crear_incidencia(&app, 1, "El servidor se ha caído").await;
    crear_incidencia(&app, 2, "Duda con la factura").await;

    let response = app.oneshot(get("/api/estadisticas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_clientes"], 2);
    assert_eq!(body["total_incidencias"], 2);
    assert_eq!(body["por_prioridad"]["critica"], 1);
    assert_eq!(body["por_prioridad"]["media"], 1);
    assert_eq!(body["por_prioridad"]["alta"], 0);
    assert_eq!(body["por_prioridad"]["normal"], 0);
    assert_eq!(body["por_estado"]["abierta"], 2);
    assert_eq!(body["por_estado"]["en_proceso"], 0);
    assert_eq!(body["por_estado"]["cerrada"], 0);
}

// =============================================================================
// ETL upload
// =============================================================================

const CLIENTES_CSV: &str = "\
nombre,email,telefono
Ana Ruiz,ana@ejemplo.com,600111222
Benito Gil,benito@ejemplo.com,600333444
Ana Otra,ANA@ejemplo.com,600555666
";

const INCIDENCIAS_CSV: &str = "\
id_cliente,fecha,descripcion,estado
1,01-03-2025,El servidor se ha caído,ABIERTA
99,02-03-2025,Consulta sobre facturación,ABIERTA
";

#[tokio::test]
async fn test_etl_upload_y_reingesta_idempotente() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(multipart_request(
            "/api/etl/upload",
            &[
                ("clientes_file", CLIENTES_CSV),
                ("incidencias_file", INCIDENCIAS_CSV),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let primera = extract_json(response.into_body()).await;
    assert_eq!(primera["lineas_leidas"], 5);
    assert_eq!(primera["insertados_reales"], 3);
    let mensaje = primera["mensaje"].as_str().unwrap();
    assert!(mensaje.contains("Cliente duplicado omitido"));
    assert!(mensaje.contains("cliente 99 no existe"));

    // Re-uploading the same files must not inflate record counts
    let response = app
        .oneshot(multipart_request(
            "/api/etl/upload",
            &[
                ("clientes_file", CLIENTES_CSV),
                ("incidencias_file", INCIDENCIAS_CSV),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let segunda = extract_json(response.into_body()).await;
    assert_eq!(segunda["lineas_leidas"], 5);
    assert_eq!(segunda["insertados_reales"], 0);
}

#[tokio::test]
async fn test_etl_upload_solo_clientes() {
    let app = setup_app().await;

    let response = app
        .oneshot(multipart_request(
            "/api/etl/upload",
            &[("clientes_file", CLIENTES_CSV)],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["lineas_leidas"], 3);
    assert_eq!(body["insertados_reales"], 2);
}

#[tokio::test]
async fn test_etl_upload_sin_ficheros() {
    let app = setup_app().await;

    let response = app
        .oneshot(multipart_request("/api/etl/upload", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["detail"].as_str().unwrap().contains("CSV"));
}
