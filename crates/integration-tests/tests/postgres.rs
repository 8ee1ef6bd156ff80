//! `PostgreSQL` adapters against a live database.
//!
//! Skipped unless `DATABASE_URL` points at a disposable database. Migrations
//! are applied on connect; every test tags its rows with a fresh suffix so
//! runs can share one database.
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/animart_test cargo test -p animart-integration-tests --test postgres
//! ```

#![allow(clippy::unwrap_used, clippy::print_stderr)]

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use animart_core::{Email, Price, Username};
use animart_server::db::{
    self, IdentityStore, PgIdentityStore, PgProductStore, ProductStore, RepositoryError,
};
use animart_server::models::{NewIdentity, NewProduct};

async fn pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    };
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    sqlx::migrate!("../server/migrations").run(&pool).await.unwrap();
    Some(pool)
}

/// Short lowercase tag unique to this run.
fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_owned()
}

fn new_identity(username: &str, email: &str) -> NewIdentity {
    NewIdentity {
        username: Username::parse(username).unwrap(),
        email: Email::parse(email).unwrap(),
        password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_owned(),
    }
}

fn new_product(title: &str, price: f64) -> NewProduct {
    NewProduct {
        title: title.to_owned(),
        price: Price::from_f64(price).unwrap(),
        img: format!("https://cdn.animart.example/{title}.png"),
        category: "test".to_owned(),
    }
}

#[tokio::test]
async fn test_insert_returns_stored_identity() {
    let Some(pool) = pool().await else { return };
    let store = PgIdentityStore::new(pool);
    let t = tag();

    let created = store
        .insert(new_identity(&format!("u{t}"), &format!("{t}@x.com")))
        .await
        .unwrap();
    assert_eq!(created.username.as_str(), format!("u{t}"));
    assert_eq!(created.email.as_str(), format!("{t}@x.com"));

    let found = store
        .find_by_username(&created.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.password_hash, created.password_hash);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let Some(pool) = pool().await else { return };
    let store = PgIdentityStore::new(pool);
    let t = tag();

    store
        .insert(new_identity(&format!("u{t}"), &format!("a{t}@x.com")))
        .await
        .unwrap();
    let err = store
        .insert(new_identity(&format!("u{t}"), &format!("b{t}@x.com")))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn test_concurrent_duplicate_usernames_admit_one() {
    let Some(pool) = pool().await else { return };
    let store = PgIdentityStore::new(pool);
    let t = tag();

    let (first, second) = tokio::join!(
        store.insert(new_identity(&format!("u{t}"), &format!("a{t}@x.com"))),
        store.insert(new_identity(&format!("u{t}"), &format!("b{t}@x.com"))),
    );

    assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
    let err = first.err().or_else(|| second.err()).unwrap();
    assert!(matches!(err, RepositoryError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn test_shared_email_returns_lowest_id() {
    let Some(pool) = pool().await else { return };
    let store = PgIdentityStore::new(pool);
    let t = tag();
    let email = format!("shared{t}@x.com");

    let first = store
        .insert(new_identity(&format!("a{t}"), &email))
        .await
        .unwrap();
    let second = store
        .insert(new_identity(&format!("b{t}"), &email))
        .await
        .unwrap();
    assert!(first.id < second.id);

    let found = store
        .find_by_email(&Email::parse(&email).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, first.id);
    assert_eq!(found.username.as_str(), format!("a{t}"));
}

#[tokio::test]
async fn test_unknown_email_is_none() {
    let Some(pool) = pool().await else { return };
    let store = PgIdentityStore::new(pool);

    let email = Email::parse(&format!("ghost{}@x.com", tag())).unwrap();
    assert!(store.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let Some(pool) = pool().await else { return };
    let store = PgProductStore::new(pool);
    let t = tag();

    let percent = store
        .insert(new_product(&format!("{t} 100% cotton"), 19.99))
        .await
        .unwrap();
    store
        .insert(new_product(&format!("{t} 1000 cotton"), 5.0))
        .await
        .unwrap();
    let underscore = store
        .insert(new_product(&format!("{t} a_b"), 1.0))
        .await
        .unwrap();
    store
        .insert(new_product(&format!("{t} axb"), 1.0))
        .await
        .unwrap();

    let hits = store.search(Some(&format!("{t} 100%"))).await.unwrap();
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), [percent.id]);

    let hits = store.search(Some(&format!("{t} a_b"))).await.unwrap();
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), [underscore.id]);
}

#[tokio::test]
async fn test_search_ignores_case_and_keeps_id_order() {
    let Some(pool) = pool().await else { return };
    let store = PgProductStore::new(pool);
    let t = tag();

    let bag = store
        .insert(new_product(&format!("{t}-naruto-bag"), 25.0))
        .await
        .unwrap();
    let cup = store
        .insert(new_product(&format!("{t}-Naruto-cup"), 12.5))
        .await
        .unwrap();

    let hits = store
        .search(Some(&format!("{}-NARUTO", t.to_uppercase())))
        .await
        .unwrap();

    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), [bag.id, cup.id]);
    assert_eq!(hits[1].price.to_string(), "12.50");
}

#[tokio::test]
async fn test_price_round_trips_through_numeric() {
    let Some(pool) = pool().await else { return };
    let store = PgProductStore::new(pool);
    let t = tag();

    let largest = store
        .insert(new_product(&format!("{t}-statue"), 9_999_999_999.99))
        .await
        .unwrap();

    assert_eq!(largest.price.to_string(), "9999999999.99");
    let hits = store.search(Some(&format!("{t}-statue"))).await.unwrap();
    assert_eq!(hits[0].price, largest.price);
}
