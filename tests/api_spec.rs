use axum::http::StatusCode;
use axum_test::TestServer;
use physics_catalog::api::{create_router, SecurityConfig};
use physics_catalog::db::Database;
use physics_catalog::models::*;
use physics_catalog::seed::{self, curated, khan};
use uuid::Uuid;

fn setup_db() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db
}

fn setup() -> TestServer {
    TestServer::new(create_router(setup_db(), SecurityConfig::disabled()))
        .expect("Failed to create test server")
}

fn setup_seeded() -> (TestServer, Database) {
    let db = setup_db();
    seed::seed_all(&db).expect("Failed to seed");
    let server = TestServer::new(create_router(db.clone(), SecurityConfig::disabled()))
        .expect("Failed to create test server");
    (server, db)
}

/// Mechanics with a single 1D Motion guide sheet.
fn setup_mechanics() -> (TestServer, ResourceNode, ResourceNode) {
    let db = setup_db();
    let mechanics = db
        .insert_resource(NewResource::category(None, "Mechanics", 1))
        .expect("Failed to insert");
    let motion = db
        .insert_resource(NewResource::leaf(
            Some(mechanics.id),
            ResourceKind::Guidesheet,
            "1D Motion",
            "https://x/1d.pdf",
            1,
        ))
        .expect("Failed to insert");
    let server = TestServer::new(create_router(db, SecurityConfig::disabled()))
        .expect("Failed to create test server");
    (server, mechanics, motion)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();

        let response = server.get("/api/v1/health").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "ok" }));
    }
}

// ============================================================
// Resources
// ============================================================

mod resources {
    use super::*;

    #[tokio::test]
    async fn returns_empty_list_when_no_resources_exist() {
        let server = setup();

        let response = server.get("/api/v1/resources").await;

        response.assert_status_ok();
        let resources: Vec<ResourceNode> = response.json();
        assert!(resources.is_empty());
    }

    #[tokio::test]
    async fn lists_roots_without_parent_id() {
        let (server, mechanics, _) = setup_mechanics();

        let response = server.get("/api/v1/resources").await;

        response.assert_status_ok();
        let resources: Vec<ResourceNode> = response.json();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, mechanics.id);
    }

    #[tokio::test]
    async fn lists_children_of_parent_id() {
        let (server, mechanics, motion) = setup_mechanics();

        let response = server
            .get("/api/v1/resources")
            .add_query_param("parent_id", mechanics.id)
            .await;

        response.assert_status_ok();
        let resources: Vec<ResourceNode> = response.json();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, motion.id);
    }

    #[tokio::test]
    async fn search_takes_precedence_over_parent_id() {
        let (server, mechanics, motion) = setup_mechanics();

        let response = server
            .get("/api/v1/resources")
            .add_query_param("parent_id", Uuid::new_v4())
            .add_query_param("search", "Motion")
            .await;

        response.assert_status_ok();
        let resources: Vec<ResourceNode> = response.json();
        let ids: Vec<Uuid> = resources.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![motion.id]);
        assert!(!ids.contains(&mechanics.id));
    }

    #[tokio::test]
    async fn blank_search_lists_roots() {
        let (server, mechanics, _) = setup_mechanics();

        let response = server
            .get("/api/v1/resources")
            .add_query_param("search", "  ")
            .await;

        let resources: Vec<ResourceNode> = response.json();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, mechanics.id);
    }

    #[tokio::test]
    async fn serializes_kind_as_type() {
        let (server, _, motion) = setup_mechanics();

        let response = server.get(&format!("/api/v1/resources/{}", motion.id)).await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["type"], "guidesheet");
        assert_eq!(body["name"], "1D Motion");
        assert_eq!(body["url"], "https://x/1d.pdf");
    }

    #[tokio::test]
    async fn get_returns_404_for_unknown_id() {
        let server = setup();

        let response = server
            .get(&format!("/api/v1/resources/{}", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_rejects_malformed_id() {
        let server = setup();

        let response = server.get("/api/v1/resources/not-a-uuid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn children_endpoint_lists_in_order() {
        let (server, db) = setup_seeded();
        let guides = db
            .list_children(None)
            .expect("Query failed")
            .into_iter()
            .find(|r| r.name == curated::GUIDES_SOURCE)
            .expect("Missing guide sheets root");

        let response = server
            .get(&format!("/api/v1/resources/{}/children", guides.id))
            .await;

        response.assert_status_ok();
        let children: Vec<ResourceNode> = response.json();
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mechanics", "Electricity and Magnetism"]);
        assert!(children.windows(2).all(|w| w[0].order <= w[1].order));
    }

    #[tokio::test]
    async fn roots_endpoint_lists_every_dataset() {
        let (server, _) = setup_seeded();

        let response = server.get("/api/v1/resources/roots").await;

        response.assert_status_ok();
        let roots: Vec<ResourceNode> = response.json();
        assert_eq!(roots.len(), seed::DATASETS.len());
        assert!(roots.iter().all(|r| r.parent_id.is_none()));
    }
}

mod search {
    use super::*;

    #[tokio::test]
    async fn finds_matching_resources() {
        let (server, _, motion) = setup_mechanics();

        let response = server
            .get("/api/v1/resources/search")
            .add_query_param("q", "motion")
            .await;

        response.assert_status_ok();
        let results: Vec<ResourceNode> = response.json();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, motion.id);
    }

    #[tokio::test]
    async fn rejects_blank_term() {
        let server = setup();

        let response = server
            .get("/api/v1/resources/search")
            .add_query_param("q", " ")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn applies_limit() {
        let (server, _) = setup_seeded();

        let response = server
            .get("/api/v1/resources/search")
            .add_query_param("q", "exercise")
            .add_query_param("limit", 3)
            .await;

        response.assert_status_ok();
        let results: Vec<ResourceNode> = response.json();
        assert_eq!(results.len(), 3);
    }
}

// ============================================================
// Browse
// ============================================================

mod browse {
    use super::*;

    #[tokio::test]
    async fn returns_tree_without_search() {
        let (server, _) = setup_seeded();

        let response = server.get("/api/v1/browse").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["mode"], "tree");

        let view: BrowseView = response.json();
        match view {
            BrowseView::Tree { roots } => {
                assert_eq!(roots.len(), seed::DATASETS.len());
                let phet = roots
                    .iter()
                    .find(|r| r.resource.name == curated::PHET_SOURCE)
                    .expect("Missing PhET root");
                assert_eq!(phet.children[0].layout, Some(Layout::Grid));
            }
            other => panic!("Expected tree view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn returns_results_with_search() {
        let (server, _) = setup_seeded();

        let response = server
            .get("/api/v1/browse")
            .add_query_param("search", "projectile")
            .await;

        response.assert_status_ok();
        match response.json::<BrowseView>() {
            BrowseView::Search { term, results } => {
                assert_eq!(term, "projectile");
                assert!(results.iter().any(|r| r.name == "Projectile Motion"));
            }
            other => panic!("Expected search view, got {:?}", other),
        }
    }
}

// ============================================================
// Seeds
// ============================================================

mod seeds {
    use super::*;

    #[tokio::test]
    async fn lists_applied_versions() {
        let (server, _) = setup_seeded();

        let response = server.get("/api/v1/seeds").await;

        response.assert_status_ok();
        let runs: Vec<SeedRun> = response.json();
        assert_eq!(runs.len(), seed::DATASETS.len());
    }

    #[tokio::test]
    async fn seed_all_reports_up_to_date_when_seeded() {
        let (server, _) = setup_seeded();

        let response = server.post("/api/v1/admin/seed").await;

        response.assert_status_ok();
        let reports: Vec<SeedReport> = response.json();
        assert!(reports.iter().all(|r| r.status == SeedStatus::UpToDate));
    }

    #[tokio::test]
    async fn reseeding_khan_twice_keeps_the_count() {
        let (server, db) = setup_seeded();
        let path = format!("/api/v1/admin/seed/{}", khan::SOURCE.replace(' ', "%20"));

        let first: SeedReport = server.post(&path).await.json();
        let after_first = db.count_resources(Some(khan::SOURCE)).expect("Query failed");
        let second: SeedReport = server.post(&path).await.json();
        let after_second = db.count_resources(Some(khan::SOURCE)).expect("Query failed");

        assert_eq!(first.status, SeedStatus::Applied);
        assert_eq!(second.node_count, first.node_count);
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn reseed_unknown_source_returns_404() {
        let server = setup();

        let response = server.post("/api/v1/admin/seed/wikipedia").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_restores_the_catalog() {
        let (server, db) = setup_seeded();
        let total = db.count_resources(None).expect("Query failed");
        db.insert_resource(NewResource::category(None, "Scratch", 99))
            .expect("Failed to insert");

        let response = server.post("/api/v1/admin/reset").await;

        response.assert_status_ok();
        assert_eq!(db.count_resources(None).expect("Query failed"), total);
    }
}

// ============================================================
// Security - API Key Authentication
// ============================================================

mod security_auth {
    use super::*;

    fn setup_with_auth(api_key: &str) -> TestServer {
        let config = SecurityConfig::with_api_key(api_key);
        TestServer::new(create_router(setup_db(), config)).expect("Failed to create test server")
    }

    #[tokio::test]
    async fn read_endpoints_are_open() {
        let server = setup_with_auth("test-secret-key");

        server.get("/api/v1/health").await.assert_status_ok();
        server.get("/api/v1/resources").await.assert_status_ok();
        server.get("/api/v1/browse").await.assert_status_ok();
    }

    #[tokio::test]
    async fn admin_endpoint_requires_auth() {
        let server = setup_with_auth("test-secret-key");

        let response = server.post("/api/v1/admin/seed").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_endpoint_accepts_valid_bearer_token() {
        let server = setup_with_auth("test-secret-key");

        let response = server
            .post("/api/v1/admin/seed")
            .add_header("Authorization", "Bearer test-secret-key")
            .await;

        response.assert_status_ok();
        let reports: Vec<SeedReport> = response.json();
        assert!(reports.iter().all(|r| r.status == SeedStatus::Applied));
    }

    #[tokio::test]
    async fn admin_endpoint_rejects_invalid_bearer_token() {
        let server = setup_with_auth("test-secret-key");

        let response = server
            .post("/api/v1/admin/reset")
            .add_header("Authorization", "Bearer wrong-key")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_endpoint_rejects_malformed_auth_header() {
        let server = setup_with_auth("test-secret-key");

        let response = server
            .post("/api/v1/admin/seed/khan%20academy")
            .add_header("Authorization", "Basic dXNlcjpwYXNz")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}

mod rate_limit {
    use super::*;

    #[tokio::test]
    async fn rejects_requests_over_the_limit() {
        let server = TestServer::new(create_router(setup_db(), SecurityConfig::with_rate_limit(2)))
            .expect("Failed to create test server");

        server.get("/api/v1/health").await.assert_status_ok();
        server.get("/api/v1/health").await.assert_status_ok();
        server
            .get("/api/v1/health")
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
