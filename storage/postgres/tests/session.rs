mod common;

use anyhow::Result;
use pgingest_core::{codec, FixtureGenerator, PackedBlob, Point, PointStore, StoreError, Table};

#[tokio::test]
async fn pg_missing_schema() -> Result<()> {
    let (_database, store) = common::create_postgres_container().await?;
    let mut session = store.session().await?;

    let err = session.stored_points(Table::Points).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingTable(table) if table == "benchmark_points"));
    Ok(())
}

#[tokio::test]
async fn pg_insert_each_and_batch() -> Result<()> {
    let (database, store) = common::create_postgres_container().await?;
    store.reset_schema().await?;
    let generator = FixtureGenerator::new(2);

    let mut session = store.session().await?;
    let first: Vec<Point> = generator.points(0..3).collect();
    let second: Vec<Point> = generator.points(3..10).collect();
    assert_eq!(session.insert_each(&first).await?, 3);
    assert_eq!(session.insert_batch(&second).await?, 7);
    assert_eq!(session.stored_points(Table::Points).await?, 10);
    drop(session);

    let client = common::inspect(&database).await?;
    let rows = client.query(r#"SELECT "id", "x", "y", "z", "attrs" FROM "benchmark_points" ORDER BY "id""#, &[]).await?;
    assert_eq!(rows.len(), 10);
    for (i, row) in rows.iter().enumerate() {
        let id: i64 = row.get("id");
        assert_eq!(id, i as i64 + 1);
        let expected = generator.point(i as u64);
        let x: f64 = row.get("x");
        let attrs: Vec<f64> = row.get("attrs");
        assert_eq!(x, expected.x);
        assert_eq!(attrs, expected.attrs);
    }
    Ok(())
}

#[tokio::test]
async fn pg_copy_in_and_scan() -> Result<()> {
    let (_database, store) = common::create_postgres_container().await?;
    store.reset_schema().await?;
    let generator = FixtureGenerator::new(4);

    let mut session = store.session().await?;
    assert_eq!(session.copy_in(&mut generator.points(0..1000)).await?, 1000);
    assert_eq!(session.stored_points(Table::Points).await?, 1000);

    for fetch_size in [1, 7, 1000, 5000] {
        assert_eq!(session.scan(fetch_size).await?, 1000);
    }

    // an empty copy is still a valid load
    assert_eq!(session.copy_in(&mut generator.points(0..0)).await?, 0);
    Ok(())
}

#[tokio::test]
async fn pg_blob_rows() -> Result<()> {
    let (database, store) = common::create_postgres_container().await?;
    store.reset_schema().await?;
    let generator = FixtureGenerator::new(3);

    let mut session = store.session().await?;
    for range in [0..10u64, 10..20, 20..25] {
        let points: Vec<Point> = generator.points(range).collect();
        session.insert_blob(&PackedBlob::pack(&points, 3)?).await?;
    }
    assert_eq!(session.stored_points(Table::Blobs).await?, 25);
    drop(session);

    let client = common::inspect(&database).await?;
    let rows = client.query(r#"SELECT "group_size", "attr_count", "payload" FROM "benchmark_points_blob" ORDER BY "id""#, &[]).await?;
    let mut decoded = Vec::new();
    for row in &rows {
        let group_size: i32 = row.get("group_size");
        let attr_count: i32 = row.get("attr_count");
        let payload: Vec<u8> = row.get("payload");
        assert_eq!(attr_count, 3);
        assert_eq!(payload.len(), group_size as usize * (3 + 3) * 8);
        decoded.extend(codec::decode(&payload, attr_count as usize)?);
    }
    assert_eq!(decoded, generator.points(0..25).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn pg_clear_restarts_identity() -> Result<()> {
    let (database, store) = common::create_postgres_container().await?;
    store.reset_schema().await?;
    let generator = FixtureGenerator::new(0);

    let mut session = store.session().await?;
    session.copy_in(&mut generator.points(0..5)).await?;
    session.clear(Table::Points).await?;
    assert_eq!(session.stored_points(Table::Points).await?, 0);
    session.copy_in(&mut generator.points(0..1)).await?;
    drop(session);

    let client = common::inspect(&database).await?;
    let id: i64 = client.query_one(r#"SELECT "id" FROM "benchmark_points""#, &[]).await?.get(0);
    assert_eq!(id, 1);
    Ok(())
}

#[tokio::test]
async fn pg_statements_are_logged() -> Result<()> {
    let (_database, store) = common::create_postgres_container().await?;
    store.reset_schema().await?;
    let generator = FixtureGenerator::new(1);
    let points: Vec<Point> = generator.points(0..3).collect();

    let (_guard, logs) = common::capture_logs();
    let mut session = store.session().await?;
    session.insert_each(&points).await?;
    session.insert_batch(&points).await?;
    session.insert_blob(&PackedBlob::pack(&points, 1)?).await?;
    session.scan(2).await?;
    session.stored_points(Table::Blobs).await?;
    drop(session);

    let logs = logs.contents();
    for statement in [
        r#"INSERT INTO "benchmark_points"("x", "y", "z", "attrs") VALUES($1, $2, $3, $4)"#,
        r#"INSERT INTO "benchmark_points"("x", "y", "z", "attrs") VALUES ($1, $2, $3, $4), ($5, $6, $7, $8), ($9, $10, $11, $12)"#,
        r#"INSERT INTO "benchmark_points_blob"("group_size", "attr_count", "payload") VALUES($1, $2, $3)"#,
        r#"FETCH FORWARD 2 FROM "point_cursor""#,
        r#"CLOSE "point_cursor""#,
        r#"SELECT COALESCE(SUM("group_size"), 0)::int8 FROM "benchmark_points_blob""#,
    ] {
        assert!(logs.contains(statement), "missing {statement} in:\n{logs}");
    }
    Ok(())
}
