//! Behavioural tests for the user service over the in-memory document store.

use std::sync::Arc;

use futures::future::join_all;
use rstest::{fixture, rstest};
use user_api::domain::ports::{SequenceCounter, UserServiceError, UsersCommand, UsersQuery};
use user_api::domain::{
    Address, CollectionNames, Company, Geo, USER_ID_SEQUENCE, User, UserId, UserService,
};
use user_api::outbound::persistence::InMemoryDatabaseContext;

type Service = UserService<InMemoryDatabaseContext>;

#[fixture]
fn context() -> Arc<InMemoryDatabaseContext> {
    Arc::new(InMemoryDatabaseContext::new())
}

#[fixture]
fn service(context: Arc<InMemoryDatabaseContext>) -> Service {
    UserService::new(context, CollectionNames::default())
}

fn john_doe() -> User {
    User {
        address: Some(Address {
            street: Some("Kulas Light".to_owned()),
            suite: Some("Apt. 556".to_owned()),
            city: Some("Gwenborough".to_owned()),
            zipcode: Some("92998-3874".to_owned()),
            geo: Some(Geo {
                lat: Some("-37.3159".to_owned()),
                lng: Some("81.1496".to_owned()),
            }),
        }),
        phone: Some("1-770-736-8031".to_owned()),
        website: Some("https://hildegard.org".to_owned()),
        company: Some(Company {
            name: Some("Romaguera-Crona".to_owned()),
            catch_phrase: Some("Multi-layered client-server neural-net".to_owned()),
            bs: Some("harness real-time e-markets".to_owned()),
        }),
        ..User::new("John Doe", "johndoe", "johndoe@example.com")
    }
}

#[rstest]
#[tokio::test]
async fn created_ids_are_lowercase_object_ids(service: Service) {
    let created = service.create_user(john_doe()).await.expect("create");
    let id = created.id.expect("id assigned");

    assert_eq!(id.as_ref().len(), 24);
    assert!(
        id.as_ref()
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    );
}

#[rstest]
#[tokio::test]
async fn full_document_survives_a_round_trip(service: Service) {
    let created = service.create_user(john_doe()).await.expect("create");
    let id = created.id.clone().expect("id assigned");

    let fetched = service
        .get_user(id.as_ref())
        .await
        .expect("lookup")
        .expect("user present");

    assert_eq!(fetched, created);
    assert_eq!(
        fetched.geo().and_then(|geo| geo.lat.as_deref()),
        Some("-37.3159")
    );
}

#[rstest]
#[case("65f1c0ffee0000000000beef")]
#[case("not-an-object-id")]
#[tokio::test]
async fn unknown_ids_are_sentinels_not_errors(service: Service, #[case] id: &str) {
    assert_eq!(service.get_user(id).await.expect("lookup"), None);
    assert!(!service.delete_user(id).await.expect("delete"));
    assert!(!service.update_user(id, john_doe()).await.expect("update"));
}

#[rstest]
#[tokio::test]
async fn update_reports_only_real_changes(service: Service) {
    let created = service.create_user(john_doe()).await.expect("create");
    let id = created.id.clone().expect("id assigned");

    let unchanged = service
        .update_user(id.as_ref(), created.clone())
        .await
        .expect("identical replace");
    assert!(!unchanged);

    let renamed = User {
        name: Some("Johnny Doe".to_owned()),
        ..created
    };
    let changed = service
        .update_user(id.as_ref(), renamed)
        .await
        .expect("changed replace");
    assert!(changed);

    let fetched = service
        .get_user(id.as_ref())
        .await
        .expect("lookup")
        .expect("user present");
    assert_eq!(fetched.name.as_deref(), Some("Johnny Doe"));
    assert_eq!(fetched.id, Some(id));
}

#[rstest]
#[tokio::test]
async fn inserting_an_existing_id_is_a_duplicate_key(service: Service) {
    let id = UserId::new("65f1c0ffee0000000000beef").expect("valid id");
    service
        .create_user(john_doe().with_id(id.clone()))
        .await
        .expect("first insert");

    let err = service
        .create_user(john_doe().with_id(id))
        .await
        .expect_err("second insert");

    match err {
        UserServiceError::Store(store) => assert_eq!(store.kind(), "duplicate_key"),
        other => panic!("expected a store error, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn invalid_users_are_rejected_with_every_field(
    context: Arc<InMemoryDatabaseContext>,
) {
    let service = UserService::new(context.clone(), CollectionNames::default());
    let invalid = User {
        name: Some("Jo".to_owned()),
        email: Some("not-an-email".to_owned()),
        website: Some("javascript:alert(1)".to_owned()),
        ..john_doe()
    };

    let err = service.create_user(invalid).await.expect_err("invalid");

    let UserServiceError::Validation(report) = err else {
        panic!("expected validation failure");
    };
    for field in ["name", "email", "website"] {
        assert!(report.contains(field), "{field} should be reported");
    }
    assert_eq!(context.document_count("users"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_hand_out_a_contiguous_range(service: Service) {
    const CALLS: i64 = 32;
    let prior = service
        .increment_sequence(USER_ID_SEQUENCE)
        .await
        .expect("seed")
        .seq;

    let calls = (0..CALLS).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.increment_sequence(USER_ID_SEQUENCE).await })
    });
    let mut values: Vec<i64> = join_all(calls)
        .await
        .into_iter()
        .map(|joined| joined.expect("task").expect("increment").seq)
        .collect();
    values.sort_unstable();

    let expected: Vec<i64> = (prior + 1..=prior + CALLS).collect();
    assert_eq!(values, expected);
}

#[rstest]
#[tokio::test]
async fn sequences_are_independent(service: Service) {
    let first = service.increment_sequence("orders").await.expect("orders");
    let second = service.increment_sequence("orders").await.expect("orders");
    let other = service.increment_sequence("invoices").await.expect("invoices");

    assert_eq!((first.seq, second.seq, other.seq), (1, 2, 1));
    assert_eq!(other.id, "invoices");
}

#[rstest]
#[tokio::test]
async fn john_doe_lifecycle(service: Service) {
    let created = service.create_user(john_doe()).await.expect("create");
    let id = created.id.clone().expect("id assigned");

    let listed = service.list_users().await.expect("list");
    assert_eq!(listed, vec![created.clone()]);

    assert!(service.delete_user(id.as_ref()).await.expect("delete"));
    assert_eq!(service.get_user(id.as_ref()).await.expect("lookup"), None);
    assert!(!service.delete_user(id.as_ref()).await.expect("second delete"));
    assert!(service.list_users().await.expect("list").is_empty());
}
