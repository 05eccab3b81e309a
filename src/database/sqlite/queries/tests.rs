use super::*;
use futures::TryStreamExt;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

async fn create_test_pool() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(&db_path)
                .create_if_missing(true),
        )
        .await
        .expect("Failed to create test pool");

    sqlx::raw_sql(include_str!("../migrations/0001_create_papers.sql"))
        .execute(&pool)
        .await
        .expect("Failed to run migrations");

    (temp_dir, pool)
}

fn new_paper(doi: &str, title: &str) -> NewPaper {
    NewPaper {
        doi: doi.to_string(),
        title: title.to_string(),
        journal: "Production and Operations Management".to_string(),
        publication_year: 2019,
        authors: "Doe, Jane; Roe, Rick".to_string(),
        keywords: "behavioral operations | newsvendor".to_string(),
        abstract_text: "We study ordering decisions.".to_string(),
    }
}

#[tokio::test]
async fn create_on_single_connection_pool_returns_each_row() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(temp_dir.path().join("single.db"))
                .create_if_missing(true),
        )
        .await
        .expect("Failed to create test pool");
    sqlx::raw_sql(include_str!("../migrations/0001_create_papers.sql"))
        .execute(&pool)
        .await
        .expect("Failed to run migrations");

    let first = PaperQueries::create(&pool, &new_paper("https://doi.org/10.1/a", "First"))
        .await
        .expect("first create completes");
    let second = PaperQueries::create(&pool, &new_paper("https://doi.org/10.1/b", "Second"))
        .await
        .expect("second create completes");

    assert_eq!(first.title, "First");
    assert_eq!(second.title, "Second");
    assert!(second.id > first.id);
}

#[tokio::test]
async fn paper_crud_operations() {
    let (_temp_dir, pool) = create_test_pool().await;

    let created = PaperQueries::create(&pool, &new_paper("https://doi.org/10.1/a", "First"))
        .await
        .expect("Failed to create paper");
    assert_eq!(created.title, "First");
    assert_eq!(created.publication_year, 2019);

    let fetched = PaperQueries::get_by_doi(&pool, "https://doi.org/10.1/a")
        .await
        .expect("Failed to query paper")
        .expect("Paper should exist");
    assert_eq!(fetched, created);

    let missing = PaperQueries::get_by_doi(&pool, "https://doi.org/10.1/missing")
        .await
        .expect("Failed to query paper");
    assert!(missing.is_none());

    assert_eq!(PaperQueries::count(&pool).await.expect("count"), 1);
}

#[tokio::test]
async fn papers_are_listed_in_insertion_order() {
    let (_temp_dir, pool) = create_test_pool().await;

    for (doi, title) in [("d/3", "Third"), ("d/1", "First"), ("d/2", "Second")] {
        PaperQueries::create(&pool, &new_paper(doi, title))
            .await
            .expect("Failed to create paper");
    }

    let titles: Vec<String> = PaperQueries::list_all(&pool)
        .await
        .expect("Failed to list papers")
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, ["Third", "First", "Second"]);

    let streamed: Vec<Paper> = PaperQueries::stream_all(&pool)
        .try_collect()
        .await
        .expect("Failed to stream papers");
    assert_eq!(streamed.len(), 3);
    assert_eq!(streamed[0].doi, "d/3");
}

#[tokio::test]
async fn duplicate_dois_resolve_to_first_row() {
    let (_temp_dir, pool) = create_test_pool().await;

    PaperQueries::create(&pool, &new_paper("d/dup", "Original"))
        .await
        .expect("Failed to create paper");
    PaperQueries::create(&pool, &new_paper("d/dup", "Later copy"))
        .await
        .expect("Failed to create paper");

    let paper = PaperQueries::get_by_doi(&pool, "d/dup")
        .await
        .expect("Failed to query paper")
        .expect("Paper should exist");
    assert_eq!(paper.title, "Original");

    assert_eq!(PaperQueries::count(&pool).await.expect("count"), 2);
    assert_eq!(
        PaperQueries::count_distinct_dois(&pool)
            .await
            .expect("distinct count"),
        1
    );
}

#[tokio::test]
async fn clear_removes_all_papers() {
    let (_temp_dir, pool) = create_test_pool().await;

    for doi in ["d/1", "d/2"] {
        PaperQueries::create(&pool, &new_paper(doi, "Title"))
            .await
            .expect("Failed to create paper");
    }

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let deleted = PaperQueries::clear(&mut conn).await.expect("Failed to clear");
    drop(conn);

    assert_eq!(deleted, 2);
    assert_eq!(PaperQueries::count(&pool).await.expect("count"), 0);
}
