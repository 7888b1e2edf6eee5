use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ladang::config::Config;
use ladang::db::{NewBiosecurityImport, NewCompany, NewProduction, NewUser};
use ladang::models::Actor;
use ladang::services::Envelope;
use ladang::state::SharedState;

/// Seeded by the initial migration.
const ROOT_USERNAME: &str = "root";
const ROOT_PASSWORD: &str = "password";

const TEST_SECRET: &str = "ladang-dev-secret-change-me";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single connection keeps the in-memory database shared.
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secure_cookies = false;
    config
}

async fn spawn_app_with(config: Config) -> (Router, SharedState) {
    let shared = SharedState::new(config)
        .await
        .expect("Failed to build app state");
    let app = ladang::api::router(shared.clone()).await;
    (app, shared)
}

async fn spawn_app() -> (Router, SharedState) {
    spawn_app_with(test_config()).await
}

fn seed_actor() -> Actor {
    Actor {
        uuid: "seed".to_string(),
        username: "seed".to_string(),
    }
}

/// Posts one GraphQL operation; returns the response JSON and the session
/// cookie if the server set one.
async fn graphql(
    app: &Router,
    cookie: Option<&str>,
    query: &str,
    variables: Value,
) -> (Value, Option<String>) {
    let body = json!({ "query": query, "variables": variables });

    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (serde_json::from_slice(&bytes).unwrap(), set_cookie)
}

fn first_error(response: &Value) -> &str {
    response["errors"][0]["message"].as_str().unwrap_or("")
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (response, _) = graphql(
        app,
        None,
        "mutation($u: String!, $p: String!) { verifyCredentials(username: $u, password: $p) }",
        json!({ "u": username, "p": password }),
    )
    .await;
    let token = response["data"]["verifyCredentials"]
        .as_str()
        .unwrap_or_else(|| panic!("verifyCredentials failed: {response}"))
        .to_string();

    let (response, cookie) = graphql(
        app,
        None,
        "mutation($t: String!) { login(token: $t) { username } }",
        json!({ "t": token }),
    )
    .await;
    assert!(
        response["errors"].is_null(),
        "login failed: {response}"
    );
    cookie.expect("login must establish a session cookie")
}

/// Unwraps a tokenized page into its rows.
fn open_envelope(token: &str) -> Vec<Value> {
    Envelope::new(TEST_SECRET, 30)
        .verify(token)
        .expect("envelope must verify under the server secret")
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unauthenticated_query_rejected() {
    let (app, _) = spawn_app().await;

    let (response, _) = graphql(&app, None, "{ catalogues { count token } }", json!({})).await;
    assert_eq!(first_error(&response), "Authentication required");
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let (app, _) = spawn_app().await;

    let (response, _) = graphql(
        &app,
        None,
        "mutation { verifyCredentials(username: \"root\", password: \"nope\") }",
        json!({}),
    )
    .await;
    assert_eq!(first_error(&response), "Invalid username or password");
}

#[tokio::test]
async fn test_login_flow_and_me() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ me { username role { name } } }",
        json!({}),
    )
    .await;

    assert_eq!(response["data"]["me"]["username"], "root");
    assert_eq!(response["data"]["me"]["role"]["name"], "Superuser");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(&app, Some(&cookie), "mutation { logout }", json!({})).await;
    assert_eq!(response["data"]["logout"], true);

    let (response, _) = graphql(&app, Some(&cookie), "{ me { username } }", json!({})).await;
    assert_eq!(first_error(&response), "Authentication required");
}

#[tokio::test]
async fn test_catalogue_crud_envelope_and_audit() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let create = r"mutation($input: CatalogueInput!) {
        createCatalogue(input: $input) { uuid id productName createdAt }
    }";
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        create,
        json!({ "input": {
            "productName": "Chilli Padi",
            "category": "Vegetable",
            "unit": "kg",
            "description": "Hot"
        }}),
    )
    .await;
    let created = &response["data"]["createCatalogue"];
    let uuid = created["uuid"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();
    let created_at = created["createdAt"].as_str().unwrap().to_string();

    // Tokenized listing carries the row inside the signed envelope.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ catalogues { count token } }",
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["catalogues"]["count"], 1);
    let rows = open_envelope(response["data"]["catalogues"]["token"].as_str().unwrap());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["productName"], "Chilli Padi");
    assert_eq!(rows[0]["id"], id);

    // Update leaves id and creation fields untouched.
    let update = r"mutation($uuid: String!, $input: CatalogueInput!) {
        updateCatalogue(uuid: $uuid, input: $input) { id category createdAt }
    }";
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        update,
        json!({ "uuid": uuid, "input": {
            "productName": "Chilli Padi",
            "category": "Spice",
            "unit": "kg",
            "description": "Hot"
        }}),
    )
    .await;
    let updated = &response["data"]["updateCatalogue"];
    assert_eq!(updated["category"], "Spice");
    assert_eq!(updated["id"], id);
    assert_eq!(updated["createdAt"], created_at);

    // Soft delete removes the row from every listing.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "mutation($uuid: String!) { deleteCatalogue(uuid: $uuid) }",
        json!({ "uuid": uuid }),
    )
    .await;
    assert_eq!(response["data"]["deleteCatalogue"], true);

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ catalogues { count token } }",
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["catalogues"]["count"], 0);

    // The audit trail keeps all three actions, delete included.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"{ auditLogs(filters: "[{\"id\":\"entity\",\"value\":\"Catalogue\"}]") {
            count rows { action entityUuid snapshot }
        } }"#,
        json!({}),
    )
    .await;
    let audit = &response["data"]["auditLogs"];
    assert_eq!(audit["count"], 3);
    let actions: Vec<&str> = audit["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"CREATE"));
    assert!(actions.contains(&"UPDATE"));
    assert!(actions.contains(&"DELETE"));
    for row in audit["rows"].as_array().unwrap() {
        assert_eq!(row["entityUuid"].as_str().unwrap(), uuid);
    }
}

#[tokio::test]
async fn test_update_input_rejects_server_fields() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    // Typed inputs have no representation for server-owned fields; sending
    // one is a query validation error before any resolver runs.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { updateCatalogue(uuid: "x", input: {
            productName: "A", category: "B", unit: "kg", description: "",
            createdAt: "2020-01-01T00:00:00Z"
        }) { uuid } }"#,
        json!({}),
    )
    .await;
    assert!(!first_error(&response).is_empty());
    assert!(response["data"].is_null());
}

#[tokio::test]
async fn test_production_missing_references_message_and_no_write() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r"mutation($input: ProductionInput!) {
            createVegetableProduction(input: $input) { uuid }
        }",
        json!({ "input": {
            "companyUuid": "",
            "farmAreaUuid": "",
            "vegetableName": "Kangkung",
            "quantityKg": 5.0,
            "harvestDate": "2026-08-01",
            "district": "Kuching"
        }}),
    )
    .await;
    assert_eq!(
        first_error(&response),
        "Please fill the company name and farm area fields"
    );

    // No record and no audit entry were written.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ vegetableProductions { count } }",
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["vegetableProductions"]["count"], 0);

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"{ auditLogs(filters: "[{\"id\":\"entity\",\"value\":\"VegetableProduction\"}]") { count } }"#,
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["auditLogs"]["count"], 0);
}

#[tokio::test]
async fn test_farmer_sees_only_linked_companies() {
    let (app, shared) = spawn_app().await;
    let actor = seed_actor();

    let mine = shared
        .store
        .create_company(
            NewCompany {
                registration_number: "R-001".to_string(),
                name: "Ladang Hijau".to_string(),
                district: "Kuching".to_string(),
            },
            &actor,
        )
        .await
        .unwrap();
    let other = shared
        .store
        .create_company(
            NewCompany {
                registration_number: "R-002".to_string(),
                name: "Sayur Segar".to_string(),
                district: "Sibu".to_string(),
            },
            &actor,
        )
        .await
        .unwrap();
    let area = shared
        .store
        .create_farm_area("Blok A", "Kuching", &actor)
        .await
        .unwrap();

    let ic = "900101-13-5555";
    shared
        .store
        .link_farmer_company(ic, &mine.uuid)
        .await
        .unwrap();

    let farmer_role = shared
        .store
        .get_role_by_name("Farmer")
        .await
        .unwrap()
        .expect("seeded role");
    let security = shared.config.read().await.security.clone();
    shared
        .store
        .create_user(
            NewUser {
                username: "farmer1".to_string(),
                password: "farmpass123".to_string(),
                role_uuid: farmer_role.uuid,
                registration_type: "farmer".to_string(),
                ic_number: ic.to_string(),
                district: String::new(),
                control_post: String::new(),
                enforcement_only: false,
            },
            &security,
            &actor,
        )
        .await
        .unwrap();

    for company in [&mine, &other] {
        shared
            .store
            .create_production(
                NewProduction {
                    company_uuid: company.uuid.clone(),
                    farm_area_uuid: area.uuid.clone(),
                    vegetable_name: "Kangkung".to_string(),
                    quantity_kg: 12.5,
                    harvest_date: "2026-08-01".to_string(),
                    district: company.district.clone(),
                },
                &actor,
            )
            .await
            .unwrap();
    }

    let cookie = login(&app, "farmer1", "farmpass123").await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ vegetableProductions { count token } }",
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["vegetableProductions"]["count"], 1);
    let rows = open_envelope(
        response["data"]["vegetableProductions"]["token"]
            .as_str()
            .unwrap(),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["companyUuid"].as_str().unwrap(), mine.uuid);
    // The denormalizer attached the company object.
    assert_eq!(rows[0]["company"]["name"], "Ladang Hijau");

    // Farmers carry no user-administration privileges.
    let (response, _) = graphql(&app, Some(&cookie), "{ users { count } }", json!({})).await;
    assert_eq!(first_error(&response), "Missing privilege: User:Read");
}

#[tokio::test]
async fn test_officer_post_scope_and_all_sentinel() {
    let (app, shared) = spawn_app().await;
    let actor = seed_actor();

    let company = shared
        .store
        .create_company(
            NewCompany {
                registration_number: "R-003".to_string(),
                name: "Import Co".to_string(),
                district: "Kuching".to_string(),
            },
            &actor,
        )
        .await
        .unwrap();

    for (district, poe) in [("Kuching", "Tebedu"), ("Sibu", "Sibu Airport")] {
        shared
            .store
            .create_biosecurity(
                NewBiosecurityImport {
                    company_uuid: company.uuid.clone(),
                    permit_number: format!("PN-{district}"),
                    country_of_origin: "Thailand".to_string(),
                    product_name: "Chilli".to_string(),
                    point_of_entry: poe.to_string(),
                    district: district.to_string(),
                    quantity: 100.0,
                    arrival_date: "2026-08-15".to_string(),
                },
                &actor,
            )
            .await
            .unwrap();
    }

    let officer_role = shared
        .store
        .get_role_by_name("Officer")
        .await
        .unwrap()
        .expect("seeded role");
    let security = shared.config.read().await.security.clone();
    shared
        .store
        .create_user(
            NewUser {
                username: "officer1".to_string(),
                password: "postpass123".to_string(),
                role_uuid: officer_role.uuid,
                registration_type: "officer".to_string(),
                ic_number: String::new(),
                district: "Kuching".to_string(),
                control_post: "Tebedu".to_string(),
                enforcement_only: false,
            },
            &security,
            &actor,
        )
        .await
        .unwrap();

    let cookie = login(&app, "officer1", "postpass123").await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ biosecurityImports { count token } }",
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["biosecurityImports"]["count"], 1);
    let rows = open_envelope(
        response["data"]["biosecurityImports"]["token"]
            .as_str()
            .unwrap(),
    );
    assert_eq!(rows[0]["permitNumber"], "PN-Kuching");

    // The "All" sentinel lifts the post restriction.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"{ biosecurityImports(pointOfEntry: "All") { count } }"#,
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["biosecurityImports"]["count"], 2);
}

#[tokio::test]
async fn test_farmer_cannot_repoint_record_to_unlinked_company() {
    let (app, shared) = spawn_app().await;
    let actor = seed_actor();

    let mine = shared
        .store
        .create_company(
            NewCompany {
                registration_number: "R-010".to_string(),
                name: "Kebun Sendiri".to_string(),
                district: "Kuching".to_string(),
            },
            &actor,
        )
        .await
        .unwrap();
    let other = shared
        .store
        .create_company(
            NewCompany {
                registration_number: "R-011".to_string(),
                name: "Syarikat Lain".to_string(),
                district: "Sibu".to_string(),
            },
            &actor,
        )
        .await
        .unwrap();
    let area = shared
        .store
        .create_farm_area("Blok B", "Kuching", &actor)
        .await
        .unwrap();

    let ic = "880202-13-1234";
    shared
        .store
        .link_farmer_company(ic, &mine.uuid)
        .await
        .unwrap();

    let farmer_role = shared
        .store
        .get_role_by_name("Farmer")
        .await
        .unwrap()
        .expect("seeded role");
    let security = shared.config.read().await.security.clone();
    shared
        .store
        .create_user(
            NewUser {
                username: "farmer2".to_string(),
                password: "farmpass123".to_string(),
                role_uuid: farmer_role.uuid,
                registration_type: "farmer".to_string(),
                ic_number: ic.to_string(),
                district: String::new(),
                control_post: String::new(),
                enforcement_only: false,
            },
            &security,
            &actor,
        )
        .await
        .unwrap();

    let cookie = login(&app, "farmer2", "farmpass123").await;

    // Creating under a company outside the linked list is refused.
    let create = r"mutation($input: ProductionInput!) {
        createVegetableProduction(input: $input) { uuid }
    }";
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        create,
        json!({ "input": {
            "companyUuid": other.uuid,
            "farmAreaUuid": area.uuid,
            "vegetableName": "Bayam",
            "quantityKg": 3.0,
            "harvestDate": "2026-08-10",
            "district": "Sibu"
        }}),
    )
    .await;
    assert_eq!(
        first_error(&response),
        "You can only manage records for your own companies"
    );

    // A record under the farmer's own company goes through.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        create,
        json!({ "input": {
            "companyUuid": mine.uuid,
            "farmAreaUuid": area.uuid,
            "vegetableName": "Bayam",
            "quantityKg": 3.0,
            "harvestDate": "2026-08-10",
            "district": "Kuching"
        }}),
    )
    .await;
    let uuid = response["data"]["createVegetableProduction"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    // Updating it to point at the unlinked company is refused the same way.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r"mutation($uuid: String!, $input: ProductionInput!) {
            updateVegetableProduction(uuid: $uuid, input: $input) { uuid }
        }",
        json!({ "uuid": uuid, "input": {
            "companyUuid": other.uuid,
            "farmAreaUuid": area.uuid,
            "vegetableName": "Bayam",
            "quantityKg": 3.0,
            "harvestDate": "2026-08-10",
            "district": "Sibu"
        }}),
    )
    .await;
    assert_eq!(
        first_error(&response),
        "You can only manage records for your own companies"
    );

    // The record still belongs to the farmer's company.
    let record = shared
        .store
        .get_production_by_uuid(&uuid)
        .await
        .unwrap()
        .expect("record survives the refused update");
    assert_eq!(record.company_uuid, mine.uuid);
}

#[tokio::test]
async fn test_district_officer_cannot_mutate_users_outside_district() {
    let (app, shared) = spawn_app().await;
    let actor = seed_actor();
    let root_cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    // A role carrying user administration, held by a district-scoped officer.
    let (response, _) = graphql(
        &app,
        Some(&root_cookie),
        r#"mutation { createRole(input: {
            name: "District Admin",
            privileges: ["User:Read", "User:Update", "User:Delete"]
        }) { uuid } }"#,
        json!({}),
    )
    .await;
    let admin_role = response["data"]["createRole"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let officer_role = shared
        .store
        .get_role_by_name("Officer")
        .await
        .unwrap()
        .expect("seeded role");
    let security = shared.config.read().await.security.clone();

    shared
        .store
        .create_user(
            NewUser {
                username: "kuching_admin".to_string(),
                password: "adminpass123".to_string(),
                role_uuid: admin_role,
                registration_type: "officer".to_string(),
                ic_number: String::new(),
                district: "Kuching".to_string(),
                control_post: "Tebedu".to_string(),
                enforcement_only: false,
            },
            &security,
            &actor,
        )
        .await
        .unwrap();

    let target = shared
        .store
        .create_user(
            NewUser {
                username: "sibu_officer".to_string(),
                password: "sibupass123".to_string(),
                role_uuid: officer_role.uuid.clone(),
                registration_type: "officer".to_string(),
                ic_number: String::new(),
                district: "Sibu".to_string(),
                control_post: "Sibu Airport".to_string(),
                enforcement_only: false,
            },
            &security,
            &actor,
        )
        .await
        .unwrap();

    let cookie = login(&app, "kuching_admin", "adminpass123").await;

    // An account in another district behaves as absent on update and delete.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r"mutation($uuid: String!, $input: UpdateUserInput!) {
            updateUser(uuid: $uuid, input: $input) { uuid }
        }",
        json!({ "uuid": target.uuid, "input": {
            "roleUuid": officer_role.uuid,
            "registrationType": "officer",
            "icNumber": "",
            "district": "Kuching",
            "controlPost": "Tebedu",
            "enforcementOnly": false,
            "active": false
        }}),
    )
    .await;
    assert_eq!(first_error(&response), "User not found");

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "mutation($uuid: String!) { deleteUser(uuid: $uuid) }",
        json!({ "uuid": target.uuid }),
    )
    .await;
    assert_eq!(first_error(&response), "User not found");

    // The out-of-district account is untouched.
    let untouched = shared
        .store
        .get_user_by_username("sibu_officer")
        .await
        .unwrap()
        .expect("target survives");
    assert!(untouched.active);
    assert_eq!(untouched.district, "Sibu");
}

#[tokio::test]
async fn test_repeated_updates_last_write_wins() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { createCatalogue(input: {
            productName: "Timun", category: "Vegetable", unit: "kg", description: ""
        }) { uuid } }"#,
        json!({}),
    )
    .await;
    let uuid = response["data"]["createCatalogue"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    // Two writers race on one record; there is no version check, so both
    // succeed and the later write's values stand.
    let update = r"mutation($uuid: String!, $input: CatalogueInput!) {
        updateCatalogue(uuid: $uuid, input: $input) { unit }
    }";
    for unit in ["bunch", "crate"] {
        let (response, _) = graphql(
            &app,
            Some(&cookie),
            update,
            json!({ "uuid": uuid, "input": {
                "productName": "Timun",
                "category": "Vegetable",
                "unit": unit,
                "description": ""
            }}),
        )
        .await;
        assert_eq!(response["data"]["updateCatalogue"]["unit"], unit);
    }

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "{ catalogues { token } }",
        json!({}),
    )
    .await;
    let rows = open_envelope(response["data"]["catalogues"]["token"].as_str().unwrap());
    assert_eq!(rows[0]["unit"], "crate");
}

#[tokio::test]
async fn test_export_with_no_matches_is_header_only() {
    let (app, _) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { exportBiosecurityImports(
            filters: "[{\"id\":\"country\",\"value\":\"Nowhereland\"}]"
        ) { fileName contentBase64 } }"#,
        json!({}),
    )
    .await;

    let export = &response["data"]["exportBiosecurityImports"];
    assert_eq!(export["fileName"], "BioSecurityImportData.xlsx");

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(export["contentBase64"].as_str().unwrap())
        .unwrap();
    // A valid (zip) workbook even with zero data rows.
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_role_delete_deactivates_holders() {
    let (app, shared) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { createRole(input: {
            name: "Clerk", privileges: ["Catalogue:Read"]
        }) { uuid } }"#,
        json!({}),
    )
    .await;
    let role_uuid = response["data"]["createRole"]["uuid"]
        .as_str()
        .unwrap()
        .to_string();

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r"mutation($input: CreateUserInput!) { createUser(input: $input) { uuid active } }",
        json!({ "input": {
            "username": "clerk1",
            "password": "clerkpass123",
            "roleUuid": role_uuid,
            "registrationType": "officer",
            "icNumber": "",
            "district": "Kuching",
            "controlPost": "",
            "enforcementOnly": false
        }}),
    )
    .await;
    assert_eq!(response["data"]["createUser"]["active"], true);

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        "mutation($uuid: String!) { deleteRole(uuid: $uuid) }",
        json!({ "uuid": role_uuid }),
    )
    .await;
    assert_eq!(response["data"]["deleteRole"], true);

    let holder = shared
        .store
        .get_user_by_username("clerk1")
        .await
        .unwrap()
        .expect("holder survives as a record");
    assert!(!holder.active);

    // Deactivated accounts cannot start a login.
    let (response, _) = graphql(
        &app,
        None,
        "mutation { verifyCredentials(username: \"clerk1\", password: \"clerkpass123\") }",
        json!({}),
    )
    .await;
    assert_eq!(first_error(&response), "Invalid username or password");
}

#[tokio::test]
async fn test_change_password() {
    let (app, shared) = spawn_app().await;
    let cookie = login(&app, ROOT_USERNAME, ROOT_PASSWORD).await;

    // Weak replacement rejected.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { changePassword(currentPassword: "password", newPassword: "short") }"#,
        json!({}),
    )
    .await;
    assert!(first_error(&response).contains("at least 8 characters"));

    // Wrong current password rejected.
    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { changePassword(currentPassword: "wrong", newPassword: "newpass123") }"#,
        json!({}),
    )
    .await;
    assert_eq!(first_error(&response), "Current password is incorrect");

    let (response, _) = graphql(
        &app,
        Some(&cookie),
        r#"mutation { changePassword(currentPassword: "password", newPassword: "newpass123") }"#,
        json!({}),
    )
    .await;
    assert_eq!(response["data"]["changePassword"], true);

    // The change is attributed to the account holder.
    let holder = shared
        .store
        .get_user_by_username("root")
        .await
        .unwrap()
        .expect("seeded account");
    assert_eq!(holder.updated_by_username, "root");
    assert_eq!(holder.updated_by_uuid, holder.uuid);

    // The new password is live immediately.
    let (response, _) = graphql(
        &app,
        None,
        "mutation { verifyCredentials(username: \"root\", password: \"newpass123\") }",
        json!({}),
    )
    .await;
    assert!(response["data"]["verifyCredentials"].is_string());
}

#[tokio::test]
async fn test_login_throttle_locks_out() {
    let mut config = test_config();
    config.security.auth_throttle.max_attempts = 2;
    config.security.auth_throttle.ttl_seconds = 60;
    let (app, _) = spawn_app_with(config).await;

    for _ in 0..2 {
        let (response, _) = graphql(
            &app,
            None,
            "mutation { verifyCredentials(username: \"root\", password: \"bad\") }",
            json!({}),
        )
        .await;
        assert_eq!(first_error(&response), "Invalid username or password");
    }

    // Budget exhausted: even the correct password is refused inside the TTL.
    let (response, _) = graphql(
        &app,
        None,
        "mutation { verifyCredentials(username: \"root\", password: \"password\") }",
        json!({}),
    )
    .await;
    assert!(first_error(&response).contains("Too many failed attempts"));
}
