//! End-to-end account behaviour against the in-memory store.

use std::sync::Arc;

use accounts::domain::ports::{AccountCommand, AccountQuery, LoginService};
use accounts::domain::{
    AccountError, AccountPatch, AccountService, LoginCredentials, RegistrationCandidate,
    UpdateOutcome,
};
use accounts::outbound::hashing::{BcryptCredentialHasher, MIN_COST};
use accounts::outbound::memory::InMemoryAccountRepository;
use chrono::Utc;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type Service = AccountService<InMemoryAccountRepository, BcryptCredentialHasher>;

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

#[fixture]
fn service() -> Arc<Service> {
    let hasher = BcryptCredentialHasher::with_cost(MIN_COST).expect("valid cost");
    Arc::new(AccountService::new(
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(hasher),
        Arc::new(DefaultClock),
    ))
}

fn candidate(email: &str) -> RegistrationCandidate {
    RegistrationCandidate::new(
        "Jane Doe",
        Utc::now().timestamp() - 30 * SECONDS_PER_YEAR,
        "+15551234567",
        email,
        "correcthorse",
    )
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("well-formed credentials")
}

#[rstest]
#[tokio::test]
async fn register_login_update_remove(service: Arc<Service>) {
    let account = service
        .register(candidate("jane@example.com"))
        .await
        .expect("registration succeeds");

    let id = service
        .authenticate(&credentials("jane@example.com", "correcthorse"))
        .await
        .expect("login succeeds");
    assert_eq!(id, account.id());

    let outcome = service
        .apply_update(
            &id,
            &AccountPatch::new(Some("Jane Q. Doe".into()), None, None),
        )
        .await
        .expect("update succeeds");
    let UpdateOutcome::Updated(updated) = outcome else {
        panic!("expected an applied update");
    };
    assert_eq!(updated.full_name(), "Jane Q. Doe");
    assert_eq!(updated.email(), "jane@example.com");

    service.remove(&id).await.expect("removal succeeds");

    let denied = service
        .authenticate(&credentials("jane@example.com", "correcthorse"))
        .await;
    assert!(matches!(denied, Err(AccountError::NoAccountsAvailable)));
    assert!(matches!(
        service.remove(&id).await,
        Err(AccountError::NotFound)
    ));
}

#[rstest]
#[tokio::test]
async fn email_is_reusable_after_removal(service: Arc<Service>) {
    let first = service
        .register(candidate("reuse@example.com"))
        .await
        .expect("first registration");
    service.remove(&first.id()).await.expect("removal");

    let second = service
        .register(candidate("reuse@example.com"))
        .await
        .expect("second registration");

    assert_ne!(first.id(), second.id());
    let listed = service.list_accounts().await.expect("list");
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test]
async fn login_denials_are_distinguished_internally(service: Arc<Service>) {
    let empty = service
        .authenticate(&credentials("jane@example.com", "correcthorse"))
        .await;
    assert!(matches!(empty, Err(AccountError::NoAccountsAvailable)));

    service
        .register(candidate("jane@example.com"))
        .await
        .expect("registration");

    let unknown = service
        .authenticate(&credentials("john@example.com", "correcthorse"))
        .await;
    assert!(matches!(unknown, Err(AccountError::InvalidCredentials)));

    let wrong = service
        .authenticate(&credentials("jane@example.com", "wrongpassword"))
        .await;
    assert!(matches!(wrong, Err(AccountError::IncorrectPassword)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_admit_one_email_owner(service: Arc<Service>) {
    let attempts = 8;
    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.register(candidate("race@example.com")).await })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => created += 1,
            Err(AccountError::DuplicateEmail) => duplicates += 1,
            Err(other) => panic!("unexpected registration failure: {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, attempts - 1);
    assert_eq!(service.list_accounts().await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_on_different_fields_both_persist(service: Arc<Service>) {
    for round in 0..16 {
        let email = format!("patch{round}@example.com");
        let account = service
            .register(candidate(&email))
            .await
            .expect("registration");
        let id = account.id();
        let name = format!("Renamed Person {round}");
        let phone = format!("+1555000{round:04}");

        let name_patch = AccountPatch::new(Some(name.clone()), None, None);
        let phone_patch = AccountPatch::new(None, None, Some(phone.clone()));
        let renaming = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.apply_update(&id, &name_patch).await })
        };
        let rephoning = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.apply_update(&id, &phone_patch).await })
        };
        renaming.await.expect("task completes").expect("name update");
        rephoning.await.expect("task completes").expect("phone update");

        let stored = service
            .list_accounts()
            .await
            .expect("list")
            .into_iter()
            .find(|listed| listed.id() == id)
            .expect("account still listed");
        assert_eq!(stored.full_name(), name);
        assert_eq!(stored.phone_number(), phone);
    }
}

#[rstest]
#[tokio::test]
async fn multibyte_password_beyond_bcrypt_limit_is_rejected(service: Arc<Service>) {
    let oversized = RegistrationCandidate::new(
        "Jane Doe",
        Utc::now().timestamp() - 30 * SECONDS_PER_YEAR,
        "+15551234567",
        "emoji@example.com",
        format!("{}A", "😀".repeat(18)),
    );

    let error = service
        .register(oversized)
        .await
        .expect_err("password over 72 bytes");

    assert!(matches!(error, AccountError::ValidationFailed(_)));
    assert!(service.list_accounts().await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
async fn multibyte_password_rejects_changed_final_character(service: Arc<Service>) {
    let password = format!("{}A", "😀".repeat(17));
    let registered = RegistrationCandidate::new(
        "Jane Doe",
        Utc::now().timestamp() - 30 * SECONDS_PER_YEAR,
        "+15551234567",
        "emoji@example.com",
        password.as_str(),
    );
    service.register(registered).await.expect("registration");

    let accepted = service
        .authenticate(&credentials("emoji@example.com", &password))
        .await;
    assert!(accepted.is_ok());

    let perturbed = format!("{}B", "😀".repeat(17));
    let denied = service
        .authenticate(&credentials("emoji@example.com", &perturbed))
        .await;
    assert!(matches!(denied, Err(AccountError::IncorrectPassword)));
}
