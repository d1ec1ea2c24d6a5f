//! Runs the same scenarios against every registered backend so the
//! `memory` and `sqlite` repositories cannot drift apart.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use uuid::Uuid;

use estimate_core::db::{DbConfig, MemoryRepositoryFactory, RepositoryRegistry};
use estimate_core::{
    COPY_SUFFIX, Dimensions, EstimateFormData, EstimateRepository, Labor, Material,
    RepositoryError,
};
use estimate_db_sqlite::SqliteRepositoryFactory;

const BACKENDS: [&str; 2] = ["memory", "sqlite"];

fn registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

async fn open(backend: &str) -> Box<dyn EstimateRepository> {
    let config = DbConfig {
        backend: backend.to_string(),
        connection_string: ":memory:".to_string(),
    };
    registry()
        .create(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to open {backend} backend: {e}"))
}

fn kitchen_shelves() -> EstimateFormData {
    EstimateFormData {
        client_name: Some("Dana".to_string()),
        materials: vec![
            Material::new("Oak plank", dec!(25), dec!(2), "piece"),
            Material::new("Wood glue", dec!(5), dec!(1), "bottle"),
        ],
        labor: Labor::hourly(dec!(10), dec!(3)),
        dimensions: Some(Dimensions {
            length: Some(dec!(120)),
            width: Some(dec!(30)),
            height: None,
        }),
        tax_rate: dec!(50),
        notes: Some("Wall-mounted".to_string()),
        ..EstimateFormData::new("Kitchen shelves")
    }
}

#[test]
fn registry_lists_both_backends() {
    assert_eq!(registry().available_backends(), vec!["memory", "sqlite"]);
}

#[tokio::test]
async fn scenario_totals_agree_across_backends() {
    for backend in BACKENDS {
        let repo = open(backend).await;

        let created = repo.create_estimate(kitchen_shelves()).await.unwrap();
        let fetched = repo.get_estimate(created.id()).await.unwrap();

        // (50 + 5 + 30) * 1.5
        assert_eq!(fetched.total_cost(), dec!(127.50), "backend {backend}");
        assert_eq!(fetched, created, "backend {backend}");
    }
}

#[tokio::test]
async fn duplicate_then_delete_original_keeps_copy() {
    for backend in BACKENDS {
        let repo = open(backend).await;
        let original = repo.create_estimate(kitchen_shelves()).await.unwrap();

        let copy = repo.duplicate_estimate(original.id()).await.unwrap();
        assert!(repo.delete_estimate(original.id()).await.unwrap());

        let remaining = repo.list_estimates().await.unwrap();
        assert_eq!(remaining.len(), 1, "backend {backend}");
        assert_eq!(remaining[0].id(), copy.id(), "backend {backend}");
        assert_eq!(
            remaining[0].project_name(),
            format!("Kitchen shelves{COPY_SUFFIX}"),
            "backend {backend}"
        );
        assert_eq!(remaining[0].total_cost(), original.total_cost(), "backend {backend}");
    }
}

#[tokio::test]
async fn update_of_unknown_id_changes_nothing() {
    for backend in BACKENDS {
        let repo = open(backend).await;
        repo.create_estimate(kitchen_shelves()).await.unwrap();
        let before = repo.list_estimates().await.unwrap();
        let missing = Uuid::now_v7();

        let result = repo.update_estimate(missing, EstimateFormData::new("Ghost")).await;

        assert_eq!(result, Err(RepositoryError::NotFound(missing)), "backend {backend}");
        assert_eq!(repo.list_estimates().await.unwrap(), before, "backend {backend}");
    }
}

#[tokio::test]
async fn switching_to_fixed_rate_drops_hours() {
    for backend in BACKENDS {
        let repo = open(backend).await;
        let created = repo.create_estimate(kitchen_shelves()).await.unwrap();

        let form = EstimateFormData {
            labor: Labor {
                hours: Some(dec!(3)),
                ..Labor::fixed(dec!(10))
            },
            ..created.form().clone()
        };
        let updated = repo.update_estimate(created.id(), form).await.unwrap();

        // (50 + 5 + 10) * 1.5
        assert_eq!(updated.total_cost(), dec!(97.50), "backend {backend}");
        assert!(updated.updated_at() >= updated.created_at(), "backend {backend}");
    }
}

#[tokio::test]
async fn newest_first_and_search_agree_across_backends() {
    for backend in BACKENDS {
        let repo = open(backend).await;
        repo.create_estimate(EstimateFormData::new("Garden fence")).await.unwrap();
        repo.create_estimate(EstimateFormData::new("Garage door")).await.unwrap();
        repo.create_estimate(EstimateFormData::new("Porch")).await.unwrap();

        let names: Vec<String> = repo
            .list_estimates()
            .await
            .unwrap()
            .iter()
            .map(|e| e.project_name().to_string())
            .collect();
        assert_eq!(names, vec!["Porch", "Garage door", "Garden fence"], "backend {backend}");

        let hits: Vec<String> = repo
            .search_estimates("GAR")
            .await
            .unwrap()
            .iter()
            .map(|e| e.project_name().to_string())
            .collect();
        assert_eq!(hits, vec!["Garage door", "Garden fence"], "backend {backend}");
    }
}
