use physics_catalog::api::{create_router, SecurityConfig};
use physics_catalog::client::{CatalogClient, ClientError};
use physics_catalog::db::Database;
use physics_catalog::models::*;
use physics_catalog::seed::{self, curated, khan, DATASETS};
use uuid::Uuid;

const API_KEY: &str = "test-secret-key";

/// Serve the catalog on an ephemeral local port and return its API base url.
async fn spawn_server(db: Database, security: SecurityConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    let app = create_router(db, security);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}/api/v1", addr)
}

fn seeded_db() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    seed::seed_all(&db).expect("Failed to seed");
    db
}

async fn setup() -> (CatalogClient, Database) {
    let db = seeded_db();
    let url = spawn_server(db.clone(), SecurityConfig::disabled()).await;
    (CatalogClient::new(url, None), db)
}

mod resources {
    use super::*;

    #[tokio::test]
    async fn get_resource_returns_none_for_unknown_id() {
        let (client, _) = setup().await;

        let resource = client
            .get_resource(Uuid::new_v4())
            .await
            .expect("Request failed");

        assert!(resource.is_none());
    }

    #[tokio::test]
    async fn get_resource_returns_stored_resource() {
        let (client, db) = setup().await;
        let root = db.list_children(None).expect("Query failed").remove(0);

        let resource = client.get_resource(root.id).await.expect("Request failed");

        assert_eq!(resource, Some(root));
    }
}

mod browse {
    use super::*;

    #[tokio::test]
    async fn returns_the_seeded_tree() {
        let (client, db) = setup().await;

        let view = client.browse(None).await.expect("Request failed");

        let BrowseView::Tree { roots } = view else {
            panic!("Expected tree view, got {:?}", view);
        };
        let names: Vec<&str> = roots.iter().map(|r| r.resource.name.as_str()).collect();
        let expected: Vec<&str> = DATASETS.iter().map(|d| d.source).collect();
        assert_eq!(names, expected);

        let visited: usize = roots.iter().map(ResourceTreeNode::subtree_size).sum();
        assert_eq!(visited, db.count_resources(None).expect("Query failed"));

        let phet = roots
            .iter()
            .find(|r| r.resource.name == curated::PHET_SOURCE)
            .expect("Missing PhET root");
        assert_eq!(phet.layout, Some(Layout::List));
        assert_eq!(phet.children[0].layout, Some(Layout::Grid));
        assert!(phet.children[0].children[0].resource.image_url.is_some());
    }

    #[tokio::test]
    async fn returns_search_results_for_a_term() {
        let (client, _) = setup().await;

        let view = client
            .browse(Some("projectile"))
            .await
            .expect("Request failed");

        match view {
            BrowseView::Search { term, results } => {
                assert_eq!(term, "projectile");
                assert!(results.iter().any(|r| r.name == "Projectile Motion"));
            }
            other => panic!("Expected search view, got {:?}", other),
        }
    }
}

mod seeds {
    use super::*;

    #[tokio::test]
    async fn lists_applied_versions() {
        let (client, _) = setup().await;

        let runs = client.seed_runs().await.expect("Request failed");

        assert_eq!(runs.len(), DATASETS.len());
    }

    #[tokio::test]
    async fn reseeds_a_source_with_spaces_in_its_name() {
        let (client, db) = setup().await;
        let before = db.count_resources(Some(khan::SOURCE)).expect("Query failed");

        let report = client.reseed(khan::SOURCE).await.expect("Request failed");

        assert_eq!(report.source, khan::SOURCE);
        assert_eq!(report.status, SeedStatus::Applied);
        assert_eq!(report.removed, before);
        assert_eq!(db.count_resources(Some(khan::SOURCE)).expect("Query failed"), before);
    }

    #[tokio::test]
    async fn unknown_source_is_not_found() {
        let (client, _) = setup().await;

        let err = client.reseed("Wikipedia").await.expect_err("Unknown source accepted");

        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn seed_all_and_reset_report_every_dataset() {
        let (client, _) = setup().await;

        let reports = client.seed_all().await.expect("Request failed");
        assert!(reports.iter().all(|r| r.status == SeedStatus::UpToDate));

        let reports = client.reset().await.expect("Request failed");
        assert_eq!(reports.len(), DATASETS.len());
        assert!(reports.iter().all(|r| r.status == SeedStatus::Applied));
    }
}

mod errors {
    use super::*;

    #[tokio::test]
    async fn admin_route_without_key_is_unauthorized() {
        let url = spawn_server(seeded_db(), SecurityConfig::with_api_key(API_KEY)).await;
        let client = CatalogClient::new(url, None);

        let err = client.seed_all().await.expect_err("Missing key accepted");

        assert!(matches!(err, ClientError::Unauthorized));
    }

    #[tokio::test]
    async fn admin_route_with_key_succeeds() {
        let url = spawn_server(seeded_db(), SecurityConfig::with_api_key(API_KEY)).await;
        let client = CatalogClient::new(url, Some(API_KEY.to_string()));

        let reports = client.seed_all().await.expect("Request failed");

        assert_eq!(reports.len(), DATASETS.len());
    }

    #[tokio::test]
    async fn exceeding_the_rate_limit_is_reported() {
        let url = spawn_server(seeded_db(), SecurityConfig::with_rate_limit(1)).await;
        let client = CatalogClient::new(url, None);

        client.seed_runs().await.expect("First request failed");
        let err = client.seed_runs().await.expect_err("Second request accepted");

        assert!(matches!(err, ClientError::RateLimited));
    }
}
