//! Integration tests for the SQLite repositories against a real database
//! file: migrations, upsert conflict semantics, search, aggregates, and
//! run history.

use std::sync::Arc;

use tempfile::TempDir;

use sectorscope_core::mappings::{
    MappingFilter, MappingRepositoryTrait, MappingStatus, MappingUpsert,
};
use sectorscope_core::reconcile::{RunReport, RunRepositoryTrait, RunStatus, WriteFailure};
use sectorscope_core::securities::{Market, Security, SecurityRepositoryTrait};
use sectorscope_core::taxonomy::{IndustryNode, IndustryNodeRepositoryTrait};
use sectorscope_storage_sqlite::mappings::MappingRepository;
use sectorscope_storage_sqlite::runs::RunRepository;
use sectorscope_storage_sqlite::securities::SecurityRepository;
use sectorscope_storage_sqlite::taxonomy::IndustryNodeRepository;
use sectorscope_storage_sqlite::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};

fn setup() -> (TempDir, Arc<DbPool>, WriteHandle) {
    let dir = TempDir::new().expect("tempdir");
    let db_path = dir.path().join("sectorscope.db");
    let pool = create_pool(db_path.to_str().unwrap()).expect("pool");
    run_migrations(&pool).expect("migrations");
    let writer = spawn_writer(pool.clone());
    (dir, pool, writer)
}

fn security(code: &str, name: &str) -> Security {
    Security {
        code: code.to_string(),
        name: name.to_string(),
        market: Market::A,
    }
}

fn node(code: &str, name: &str, level: i32, parent: Option<&str>) -> IndustryNode {
    IndustryNode {
        code: code.to_string(),
        name: name.to_string(),
        level,
        parent_code: parent.map(str::to_string),
        is_active: true,
    }
}

#[tokio::test]
async fn test_upsert_is_keyed_on_security_code() {
    let (_dir, pool, writer) = setup();
    let repo = MappingRepository::new(pool, writer);

    repo.upsert(MappingUpsert::confirmed(
        "000001",
        "801010",
        "Agriculture",
        1.0,
        "SWS",
    ))
    .await
    .unwrap();

    // Second write to the same code replaces, not duplicates.
    repo.upsert(MappingUpsert::confirmed(
        "000001",
        "801780",
        "Banking",
        0.6,
        "EASTMONEY",
    ))
    .await
    .unwrap();

    let rows = repo.get_mappings().unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.industry_code.as_deref(), Some("801780"));
    assert_eq!(row.industry_name.as_deref(), Some("Banking"));
    assert_eq!(row.confidence, 0.6);
    assert_eq!(row.source.as_deref(), Some("EASTMONEY"));
}

#[tokio::test]
async fn test_demotion_clears_industry_fields() {
    let (_dir, pool, writer) = setup();
    let repo = MappingRepository::new(pool, writer);

    repo.upsert(MappingUpsert::confirmed(
        "000001",
        "801010",
        "Agriculture",
        1.0,
        "SWS",
    ))
    .await
    .unwrap();
    repo.upsert(MappingUpsert::pending("000001")).await.unwrap();

    let row = repo.get_mapping("000001").unwrap().unwrap();
    assert_eq!(row.status, MappingStatus::Pending);
    assert_eq!(row.industry_code, None);
    assert_eq!(row.industry_name, None);
    assert_eq!(row.source, None);
    assert_eq!(row.confidence, 0.0);
}

#[tokio::test]
async fn test_seed_pending_never_overwrites() {
    let (_dir, pool, writer) = setup();
    let repo = MappingRepository::new(pool, writer);

    repo.upsert(MappingUpsert::confirmed(
        "000001",
        "801010",
        "Agriculture",
        1.0,
        "SWS",
    ))
    .await
    .unwrap();

    let created = repo
        .seed_pending(vec!["000001".to_string(), "600000".to_string()])
        .await
        .unwrap();
    assert_eq!(created, 1);

    // The confirmed row survived the seeding pass.
    let confirmed = repo.get_mapping("000001").unwrap().unwrap();
    assert_eq!(confirmed.status, MappingStatus::Confirmed);

    let seeded = repo.get_mapping("600000").unwrap().unwrap();
    assert_eq!(seeded.status, MappingStatus::Pending);
    assert_eq!(seeded.industry_code, None);
}

#[tokio::test]
async fn test_bulk_upsert_matches_per_row_semantics() {
    let (_dir, pool, writer) = setup();
    let repo = MappingRepository::new(pool, writer);

    repo.bulk_upsert(vec![
        MappingUpsert::confirmed("000001", "801010", "Agriculture", 1.0, "SWS"),
        MappingUpsert::confirmed("600000", "801780", "Banking", 1.0, "SWS"),
        MappingUpsert::pending("000002"),
    ])
    .await
    .unwrap();

    // Re-upserting one of them in a second batch updates in place.
    repo.bulk_upsert(vec![MappingUpsert::confirmed(
        "000001",
        "801780",
        "Banking",
        0.6,
        "EASTMONEY",
    )])
    .await
    .unwrap();

    let rows = repo.get_mappings().unwrap();
    assert_eq!(rows.len(), 3);
    let first = repo.get_mapping("000001").unwrap().unwrap();
    assert_eq!(first.industry_code.as_deref(), Some("801780"));
}

#[tokio::test]
async fn test_search_filters_and_pagination() {
    let (_dir, pool, writer) = setup();
    let securities_repo = SecurityRepository::new(pool.clone(), writer.clone());
    let repo = MappingRepository::new(pool, writer);

    securities_repo
        .upsert_securities(vec![
            security("000001", "Ping An Bank"),
            security("600000", "SPDB"),
            security("600036", "China Merchants Bank"),
        ])
        .await
        .unwrap();

    repo.bulk_upsert(vec![
        MappingUpsert::confirmed("000001", "801780", "Banking", 1.0, "SWS"),
        MappingUpsert::confirmed("600000", "801780", "Banking", 1.0, "SWS"),
        MappingUpsert::confirmed("600036", "801780", "Banking", 0.6, "EASTMONEY"),
        MappingUpsert::pending("300750"),
    ])
    .await
    .unwrap();

    // Filter by status.
    let pending = repo
        .search_mappings(
            &MappingFilter {
                status: Some(MappingStatus::Pending),
                ..MappingFilter::default()
            },
            1,
            10,
        )
        .unwrap();
    assert_eq!(pending.total, 1);
    assert_eq!(pending.rows[0].security_code, "300750");

    // Filter by industry.
    let banking = repo
        .search_mappings(
            &MappingFilter {
                industry_code: Some("801780".to_string()),
                ..MappingFilter::default()
            },
            1,
            10,
        )
        .unwrap();
    assert_eq!(banking.total, 3);

    // Keyword matches the joined security name.
    let keyword = repo
        .search_mappings(
            &MappingFilter {
                keyword: Some("Merchants".to_string()),
                ..MappingFilter::default()
            },
            1,
            10,
        )
        .unwrap();
    assert_eq!(keyword.total, 1);
    assert_eq!(keyword.rows[0].security_code, "600036");
    assert_eq!(
        keyword.rows[0].security_name.as_deref(),
        Some("China Merchants Bank")
    );

    // Keyword also matches the code itself.
    let by_code = repo
        .search_mappings(
            &MappingFilter {
                keyword: Some("3007".to_string()),
                ..MappingFilter::default()
            },
            1,
            10,
        )
        .unwrap();
    assert_eq!(by_code.total, 1);

    // Pagination: page size 2 over 4 rows, ordered by code.
    let page1 = repo
        .search_mappings(&MappingFilter::default(), 1, 2)
        .unwrap();
    let page2 = repo
        .search_mappings(&MappingFilter::default(), 2, 2)
        .unwrap();
    assert_eq!(page1.total, 4);
    assert_eq!(page1.rows.len(), 2);
    assert_eq!(page2.rows.len(), 2);
    assert_eq!(page1.rows[0].security_code, "000001");
    assert_eq!(page2.rows[1].security_code, "600036");
}

#[tokio::test]
async fn test_aggregate_counts() {
    let (_dir, pool, writer) = setup();
    let repo = MappingRepository::new(pool, writer);

    repo.bulk_upsert(vec![
        MappingUpsert::confirmed("000001", "801780", "Banking", 1.0, "SWS"),
        MappingUpsert::confirmed("600000", "801780", "Banking", 1.0, "SWS"),
        MappingUpsert::confirmed("000858", "801120", "Food & Beverage", 1.0, "SWS"),
        MappingUpsert::pending("300750"),
    ])
    .await
    .unwrap();

    let status = repo.counts_by_status().unwrap();
    assert_eq!(status.confirmed, 3);
    assert_eq!(status.pending, 1);

    let industries = repo.counts_by_industry().unwrap();
    assert_eq!(industries.len(), 2);
    // Largest first.
    assert_eq!(industries[0].industry_code, "801780");
    assert_eq!(industries[0].count, 2);
    assert_eq!(industries[1].industry_code, "801120");
    assert_eq!(industries[1].count, 1);
}

#[tokio::test]
async fn test_run_history_round_trip() {
    let (_dir, pool, writer) = setup();
    let repo = RunRepository::new(pool, writer);

    assert!(repo.latest_run().unwrap().is_none());

    let report = RunReport {
        id: "run-1".to_string(),
        started_at: chrono::Utc::now(),
        leaves_processed: 31,
        leaves_failed: vec!["801010".to_string()],
        securities_confirmed: 120,
        securities_demoted: 3,
        write_failures: vec![WriteFailure {
            security_code: "600000".to_string(),
            message: "disk I/O error".to_string(),
        }],
        aborted_providers: vec!["EASTMONEY".to_string()],
        duration_ms: 42_000,
        status: RunStatus::CompletedWithWarnings,
    };

    repo.insert_run(&report).await.unwrap();

    let latest = repo.latest_run().unwrap().unwrap();
    assert_eq!(latest.id, "run-1");
    assert_eq!(latest.leaves_processed, 31);
    assert_eq!(latest.leaves_failed, vec!["801010".to_string()]);
    assert_eq!(latest.write_failures.len(), 1);
    assert_eq!(latest.write_failures[0].security_code, "600000");
    assert_eq!(latest.aborted_providers, vec!["EASTMONEY".to_string()]);
    assert_eq!(latest.status, RunStatus::CompletedWithWarnings);

    let mut clean = report.clone();
    clean.id = "run-2".to_string();
    clean.started_at = report.started_at + chrono::Duration::minutes(10);
    clean.leaves_failed.clear();
    clean.write_failures.clear();
    clean.aborted_providers.clear();
    clean.status = RunStatus::Completed;
    repo.insert_run(&clean).await.unwrap();

    // Newest first, and the clean run is now the latest.
    let recent = repo.recent_runs(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, "run-2");
    assert_eq!(recent[0].status, RunStatus::Completed);
    assert_eq!(repo.latest_run().unwrap().unwrap().id, "run-2");
}

#[tokio::test]
async fn test_security_registry_upsert_and_order() {
    let (_dir, pool, writer) = setup();
    let repo = SecurityRepository::new(pool, writer);

    repo.upsert_securities(vec![
        security("600000", "SPDB"),
        security("000001", "Ping An Bank"),
    ])
    .await
    .unwrap();

    // Name refresh for an existing code.
    repo.upsert_securities(vec![security("000001", "Ping An Bank Co.")])
        .await
        .unwrap();

    let all = repo.get_securities().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].code, "000001");
    assert_eq!(all[0].name, "Ping An Bank Co.");
    assert_eq!(repo.count_securities().unwrap(), 2);
}

#[tokio::test]
async fn test_taxonomy_replace_deactivates_departed_nodes() {
    let (_dir, pool, writer) = setup();
    let repo = IndustryNodeRepository::new(pool, writer);

    repo.replace_nodes(vec![
        node("801010", "Agriculture", 1, None),
        node("801780", "Banking", 1, None),
    ])
    .await
    .unwrap();

    // The next refresh no longer carries 801780.
    repo.replace_nodes(vec![node("801010", "Agriculture", 1, None)])
        .await
        .unwrap();

    let nodes = repo.get_nodes().unwrap();
    assert_eq!(nodes.len(), 2);
    let banking = nodes.iter().find(|n| n.code == "801780").unwrap();
    assert!(!banking.is_active);
    let agriculture = nodes.iter().find(|n| n.code == "801010").unwrap();
    assert!(agriculture.is_active);
}
