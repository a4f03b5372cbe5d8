//! MongoRepository against a real server in a container

use bson::{doc, oid::ObjectId};
use database::mongodb::MongoRepository;
use database::{
    Operation, PaginationParams, Record, Repository, RepositoryError, RepositoryExt, SortOrder,
};
use serde::{Deserialize, Serialize};
use test_utils::{TestDataBuilder, TestMongo};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct Book {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[validate(length(min = 1))]
    isbn: String,
    title: String,
    #[validate(range(min = 0.0))]
    price: f64,
    created_at: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<bson::DateTime>,
    #[serde(default)]
    is_deleted: bool,
}

impl Record for Book {
    const COLLECTION: &'static str = "books";
    const SOFT_DELETE: bool = true;
    const UNIQUE_FIELDS: &'static [&'static str] = &["isbn"];
    const TEXT_FIELDS: &'static [&'static str] = &["title"];
    const UPDATED_AT: Option<&'static str> = None;

    fn id(&self) -> ObjectId {
        self.id
    }
}

fn book(isbn: &str, title: &str, price: f64) -> Book {
    Book {
        id: ObjectId::new(),
        isbn: isbn.to_string(),
        title: title.to_string(),
        price,
        created_at: bson::DateTime::now(),
        deleted_at: None,
        is_deleted: false,
    }
}

async fn repository(mongo: &TestMongo, test: &str) -> MongoRepository<Book> {
    let db = mongo.database(&TestDataBuilder::from_test_name(test).database_name());
    let repo = MongoRepository::new(&db);
    repo.init_indexes().await.unwrap();
    repo
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_index_rejects_duplicate() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_unique_index_rejects_duplicate").await;

    repo.create(book("978-1", "Rust in Action", 40.0)).await.unwrap();
    let err = repo
        .create(book("978-1", "Another Title", 10.0))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "{err}");
    assert_eq!(repo.count(doc! {}).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_soft_delete_hides_until_restored() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_soft_delete_hides_until_restored").await;

    let created = repo.create(book("978-2", "Zero To Production", 35.0)).await.unwrap();
    let id = created.id.to_hex();

    assert!(repo.soft_delete(&id).await.unwrap());
    assert_eq!(repo.find_by_id(&id).await.unwrap(), None);

    assert!(repo.restore(&id).await.unwrap());
    let restored = repo.find_by_id(&id).await.unwrap().unwrap();
    assert!(!restored.is_deleted);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_pagination_and_text_search() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_pagination_and_text_search").await;

    for (i, title) in ["Rust Atomics", "Programming Rust", "Go in Practice"].iter().enumerate() {
        repo.create(book(&format!("isbn-{i}"), title, 10.0 * (i + 1) as f64))
            .await
            .unwrap();
    }

    let page = repo
        .find_with_pagination(doc! {}, PaginationParams::new(2, 2).sorted_by("price", SortOrder::Asc))
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "Go in Practice");

    let found = repo.query().search("rust").execute().await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_with_operator_is_rejected_before_writing() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "test_update_with_operator_is_rejected_before_writing").await;

    let created = repo.create(book("978-3", "Rust for Rustaceans", 30.0)).await.unwrap();
    let id = created.id.to_hex();

    let err = repo
        .update(&id, doc! { "$inc": { "price": 1.0 } })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { op: Operation::Update, .. }), "{err}");

    let renamed = repo.update(&id, doc! { "title": "Rust for Rustaceans, 2e" }).await.unwrap().unwrap();
    assert_eq!(renamed.price, 30.0);
    assert_eq!(renamed.title, "Rust for Rustaceans, 2e");
}
