//! End-to-end run against a live MongoDB.
//!
//! Requires a server at `MONGODB_CONNECTION_STRING` (default
//! `mongodb://localhost:27017/`). Run with `cargo test -- --ignored`.

mod common;

use bench_core::{distribute_employees, LayoutKind};
use common::*;
use docshape_bench::run::{connect_store, run_benchmark, RunOptions};
use docshape_bench::{BenchContext, CollectingSink, LayoutSelection, LogicalQuery, StoreKind};

#[tokio::test]
#[ignore = "requires a running MongoDB server"]
async fn test_mongodb_all_layouts_e2e() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("docshape_bench=debug,bench_store=debug")
        .try_init()
        .ok();

    let conn = std::env::var("MONGODB_CONNECTION_STRING")
        .unwrap_or_else(|_| "mongodb://localhost:27017/".to_string());
    let database = std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "docshape_test".to_string());

    let store = connect_store(StoreKind::Mongodb, &conn, &database).await?;
    let ctx = BenchContext::new(store, "docshape_e2e");
    let options = RunOptions::new(LayoutSelection::All, settings(500, 7, 64), today());
    let mut sink = CollectingSink::new();

    run_benchmark(&ctx, &options, &mut sink).await?;

    let expected = distribute_employees(500, 7)?;
    for layout in LayoutKind::ALL {
        let q1 = sink
            .report(layout, LogicalQuery::EmployeeCompanies)
            .ok_or("missing Q1 report")?;
        assert_eq!(q1.row_count, 500, "{layout} layout");

        let q2 = sink
            .report(layout, LogicalQuery::CompanyHeadcounts)
            .ok_or("missing Q2 report")?;
        assert_eq!(q2.row_count, expected.len() as u64, "{layout} layout");

        let q4 = sink
            .report(layout, LogicalQuery::SuffixCompanyNames)
            .ok_or("missing Q4 report")?;
        assert!(q4.modified.unwrap_or_default() > 0);
    }

    ctx.store.drop_collection(&ctx.collection).await?;
    Ok(())
}
