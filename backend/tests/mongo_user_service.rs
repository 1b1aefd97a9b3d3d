//! Behavioural tests against a live MongoDB server.
//!
//! Set `MONGODB_TEST_URI` (for example `mongodb://localhost:27017`) to run
//! them; without it each test prints a skip notice and passes. Every run
//! works in a fresh database that is dropped afterwards.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use user_api::domain::ports::{SequenceCounter, UserServiceError, UsersCommand, UsersQuery};
use user_api::domain::{CollectionNames, User, UserId, UserService};
use user_api::outbound::persistence::{MongoConfig, MongoDbContext};
use uuid::Uuid;

const URI_VAR: &str = "MONGODB_TEST_URI";

struct LiveDatabase {
    service: UserService<MongoDbContext>,
    uri: String,
    name: String,
}

impl LiveDatabase {
    async fn drop_database(self) {
        let context = MongoDbContext::connect(MongoConfig::new(&self.uri, &self.name))
            .await
            .expect("reconnect for cleanup");
        if let Err(err) = context.drop_database().await {
            eprintln!("failed to drop test database {}: {err}", self.name);
        }
    }
}

async fn live_database(test: &str) -> Option<LiveDatabase> {
    let Ok(uri) = env::var(URI_VAR) else {
        eprintln!("SKIP-TEST-CLUSTER: {URI_VAR} is not set; skipping {test}");
        return None;
    };
    let name = format!("user_api_test_{}", Uuid::new_v4().simple());
    let config = MongoConfig::new(&uri, &name)
        .with_app_name("user-api-tests")
        .with_server_selection_timeout(Duration::from_secs(5));
    let context = MongoDbContext::connect(config).await.expect("client options");
    context.ping().await.expect("server reachable");
    let service = UserService::new(Arc::new(context), CollectionNames::default());
    Some(LiveDatabase { service, uri, name })
}

#[rstest]
#[tokio::test]
async fn crud_round_trip_against_mongodb() {
    let Some(db) = live_database("crud_round_trip_against_mongodb").await else {
        return;
    };
    let service = &db.service;

    let created = service
        .create_user(User::new("John Doe", "johndoe", "johndoe@example.com"))
        .await
        .expect("create");
    let id = created.id.clone().expect("object id assigned");

    let fetched = service.get_user(id.as_ref()).await.expect("get");
    assert_eq!(fetched.as_ref(), Some(&created));

    assert!(
        !service
            .update_user(id.as_ref(), created.clone())
            .await
            .expect("identical update")
    );
    let renamed = User {
        name: Some("Johnny Doe".to_owned()),
        ..created
    };
    assert!(
        service
            .update_user(id.as_ref(), renamed)
            .await
            .expect("changed update")
    );

    assert_eq!(service.list_users().await.expect("list").len(), 1);
    assert!(service.delete_user(id.as_ref()).await.expect("delete"));
    assert_eq!(service.get_user(id.as_ref()).await.expect("get"), None);
    assert_eq!(service.get_user("malformed").await.expect("get"), None);

    db.drop_database().await;
}

#[rstest]
#[tokio::test]
async fn duplicate_ids_surface_as_duplicate_key() {
    let Some(db) = live_database("duplicate_ids_surface_as_duplicate_key").await else {
        return;
    };
    let id = UserId::new("65f1c0ffee0000000000beef").expect("valid id");
    let user = User::new("John Doe", "johndoe", "johndoe@example.com").with_id(id);

    db.service.create_user(user.clone()).await.expect("first");
    let err = db.service.create_user(user).await.expect_err("second");

    assert!(matches!(
        err,
        UserServiceError::Store(ref store) if store.kind() == "duplicate_key"
    ));
    db.drop_database().await;
}

#[rstest]
#[tokio::test]
async fn counters_upsert_and_increment() {
    let Some(db) = live_database("counters_upsert_and_increment").await else {
        return;
    };

    let values: Vec<i64> = {
        let mut values = Vec::new();
        for _ in 0..3 {
            let counter = db
                .service
                .increment_sequence("userId")
                .await
                .expect("increment");
            values.push(counter.seq);
        }
        values
    };

    assert_eq!(values, vec![1, 2, 3]);
    db.drop_database().await;
}
