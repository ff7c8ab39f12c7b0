//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AccountRepositoryError, MockAccountRepository, MockCredentialHasher,
};
use crate::domain::{AccountField, NewAccount, PasswordHash, ViolationKind};

const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_now(),
    })
}

fn eighteen_years_ago() -> i64 {
    fixture_now().timestamp() - 18 * SECONDS_PER_YEAR
}

#[fixture]
fn candidate() -> RegistrationCandidate {
    RegistrationCandidate::new(
        "Jane Doe",
        eighteen_years_ago(),
        "+15551234567",
        "jane@example.com",
        "correcthorse",
    )
}

fn stored_account() -> Account {
    Account::from_parts(
        AccountId::random(),
        NewAccount {
            full_name: "Jane Doe".to_owned(),
            date_of_birth: eighteen_years_ago(),
            phone_number: "+15551234567".to_owned(),
            email: "jane@example.com".to_owned(),
            password_hash: PasswordHash::new("$2b$08$stored"),
        },
    )
}

fn service(
    repository: MockAccountRepository,
    hasher: MockCredentialHasher,
) -> AccountService<MockAccountRepository, MockCredentialHasher> {
    AccountService::new(Arc::new(repository), Arc::new(hasher), fixture_clock())
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("jane@example.com", password).expect("valid credentials")
}

#[rstest]
#[tokio::test]
async fn register_hashes_password_before_insert(candidate: RegistrationCandidate) {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .withf(|email| email == "jane@example.com")
        .times(1)
        .return_once(|_| Ok(None));
    repository
        .expect_insert()
        .withf(|new_account| new_account.password_hash.as_str() == "hashed:correcthorse")
        .times(1)
        .return_once(|new_account| Ok(Account::from_parts(AccountId::random(), new_account.clone())));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|plaintext| Ok(PasswordHash::new(format!("hashed:{plaintext}"))));

    let account = service(repository, hasher)
        .register(candidate)
        .await
        .expect("registration succeeds");

    assert_eq!(account.email(), "jane@example.com");
    assert_ne!(account.password_hash().as_str(), "correcthorse");
}

#[rstest]
#[tokio::test]
async fn password_hashing_runs_off_the_async_worker(candidate: RegistrationCandidate) {
    let hashing_thread = Arc::new(std::sync::Mutex::new(None));
    let recorded = Arc::clone(&hashing_thread);
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_email().return_once(|_| Ok(None));
    repository
        .expect_insert()
        .return_once(|new_account| Ok(Account::from_parts(AccountId::random(), new_account.clone())));
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_hash().times(1).returning(move |plaintext| {
        *recorded.lock().expect("thread slot") = Some(std::thread::current().id());
        Ok(PasswordHash::new(format!("hashed:{plaintext}")))
    });

    service(repository, hasher)
        .register(candidate)
        .await
        .expect("registration succeeds");

    let hashed_on = hashing_thread.lock().expect("thread slot").take();
    assert!(hashed_on.is_some());
    assert_ne!(hashed_on, Some(std::thread::current().id()));
}

#[rstest]
#[tokio::test]
async fn register_collects_violations_without_touching_store() {
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_email().times(0);
    repository.expect_insert().times(0);
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_hash().times(0);

    let candidate = RegistrationCandidate::new("Jo", 0, "555", "nope", "short");
    let error = service(repository, hasher)
        .register(candidate)
        .await
        .expect_err("invalid candidate");

    let AccountError::ValidationFailed(violations) = error else {
        panic!("expected validation failure");
    };
    assert_eq!(violations.len(), 5);
}

#[rstest]
#[tokio::test]
async fn register_rejects_minor_using_injected_clock() {
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_email().times(0);
    let hasher = MockCredentialHasher::new();

    let candidate = RegistrationCandidate::new(
        "Jane Doe",
        fixture_now().timestamp() - 16 * SECONDS_PER_YEAR + 1,
        "+15551234567",
        "jane@example.com",
        "correcthorse",
    );
    let error = service(repository, hasher)
        .register(candidate)
        .await
        .expect_err("too young");

    let AccountError::ValidationFailed(violations) = error else {
        panic!("expected validation failure");
    };
    assert_eq!(
        violations.get(AccountField::DateOfBirth),
        Some(ViolationKind::BelowMinimumAge { years: 16 })
    );
}

#[rstest]
#[tokio::test]
async fn register_rejects_existing_email(candidate: RegistrationCandidate) {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .times(1)
        .return_once(|_| Ok(Some(stored_account())));
    repository.expect_insert().times(0);
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_hash().times(0);

    let error = service(repository, hasher)
        .register(candidate)
        .await
        .expect_err("duplicate email");

    assert_eq!(error, AccountError::DuplicateEmail);
}

#[rstest]
#[tokio::test]
async fn register_surfaces_insert_race_as_duplicate(candidate: RegistrationCandidate) {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .return_once(|_| Ok(None));
    repository
        .expect_insert()
        .return_once(|_| Err(AccountRepositoryError::duplicate_email()));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("hashed")));

    let error = service(repository, hasher)
        .register(candidate)
        .await
        .expect_err("duplicate email");

    assert_eq!(error, AccountError::DuplicateEmail);
}

#[rstest]
#[case(AccountRepositoryError::connection("refused"), AccountError::StorageUnavailable { cause: "refused".into() })]
#[case(AccountRepositoryError::query("disk full"), AccountError::StorageError { cause: "disk full".into() })]
#[tokio::test]
async fn register_maps_storage_failures(
    candidate: RegistrationCandidate,
    #[case] failure: AccountRepositoryError,
    #[case] expected: AccountError,
) {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .return_once(|_| Ok(None));
    repository.expect_insert().return_once(move |_| Err(failure));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("hashed")));

    let error = service(repository, hasher)
        .register(candidate)
        .await
        .expect_err("storage failure");

    assert_eq!(error, expected);
}

#[rstest]
#[tokio::test]
async fn authenticate_returns_id_on_matching_password() {
    let account = stored_account();
    let expected_id = account.id();
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(account)));
    repository.expect_count().times(0);
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_verify()
        .withf(|plaintext, hash| plaintext == "correcthorse" && hash.as_str() == "$2b$08$stored")
        .returning(|_, _| Ok(true));

    let id = service(repository, hasher)
        .authenticate(&credentials("correcthorse"))
        .await
        .expect("login succeeds");

    assert_eq!(id, expected_id);
}

#[rstest]
#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_account())));
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(false));

    let error = service(repository, hasher)
        .authenticate(&credentials("correcthorsf"))
        .await
        .expect_err("wrong password");

    assert_eq!(error, AccountError::IncorrectPassword);
}

#[rstest]
#[case(0, AccountError::NoAccountsAvailable)]
#[case(3, AccountError::InvalidCredentials)]
#[tokio::test]
async fn authenticate_distinguishes_empty_store_from_unknown_email(
    #[case] live_accounts: u64,
    #[case] expected: AccountError,
) {
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_email().return_once(|_| Ok(None));
    repository
        .expect_count()
        .times(1)
        .return_once(move || Ok(live_accounts));
    let mut hasher = MockCredentialHasher::new();
    hasher.expect_verify().times(0);

    let error = service(repository, hasher)
        .authenticate(&credentials("correcthorse"))
        .await
        .expect_err("denied");

    assert_eq!(error, expected);
    assert!(error.is_login_denial());
}

#[rstest]
#[tokio::test]
async fn authenticate_reports_corrupt_stored_hash() {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_email()
        .return_once(|_| Ok(Some(stored_account())));
    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_verify()
        .returning(|_, _| Err(CredentialHasherError::corrupt_hash()));

    let error = service(repository, hasher)
        .authenticate(&credentials("correcthorse"))
        .await
        .expect_err("corrupt hash");

    assert_eq!(error, AccountError::CorruptCredential);
}

#[rstest]
#[tokio::test]
async fn apply_update_merges_present_fields() {
    let account = stored_account();
    let id = account.id();
    let mut repository = MockAccountRepository::new();
    let mut patched = account.clone();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account)));
    repository
        .expect_apply_patch()
        .withf(move |patch_id, patch| {
            *patch_id == id
                && patch.full_name() == Some("Jane Q. Doe")
                && patch.phone_number().is_none()
                && patch.date_of_birth().is_none()
        })
        .times(1)
        .return_once(move |_, patch| {
            patched.apply_patch(patch);
            Ok(patched)
        });

    let patch = AccountPatch::new(Some("Jane Q. Doe".to_owned()), None, None);
    let outcome = service(repository, MockCredentialHasher::new())
        .apply_update(&id, &patch)
        .await
        .expect("update succeeds");

    let UpdateOutcome::Updated(updated) = outcome else {
        panic!("expected an applied update");
    };
    assert_eq!(updated.full_name(), "Jane Q. Doe");
    assert_eq!(updated.email(), "jane@example.com");
}

#[rstest]
#[tokio::test]
async fn apply_update_with_empty_patch_is_a_no_op() {
    let account = stored_account();
    let id = account.id();
    let expected = account.clone();
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account)));
    repository.expect_apply_patch().times(0);

    let outcome = service(repository, MockCredentialHasher::new())
        .apply_update(&id, &AccountPatch::default())
        .await
        .expect("no-op succeeds");

    assert_eq!(outcome, UpdateOutcome::Unchanged(expected));
}

#[rstest]
#[tokio::test]
async fn apply_update_fails_fast_on_invalid_field() {
    let account = stored_account();
    let id = account.id();
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account)));
    repository.expect_apply_patch().times(0);

    let patch = AccountPatch::new(Some("Jo".to_owned()), None, Some("555".to_owned()));
    let error = service(repository, MockCredentialHasher::new())
        .apply_update(&id, &patch)
        .await
        .expect_err("invalid patch");

    let AccountError::ValidationFailed(violations) = error else {
        panic!("expected validation failure");
    };
    assert_eq!(violations.len(), 1);
    assert!(violations.get(AccountField::FullName).is_some());
}

#[rstest]
#[tokio::test]
async fn apply_update_reports_account_removed_before_write() {
    let account = stored_account();
    let id = account.id();
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account)));
    repository
        .expect_apply_patch()
        .times(1)
        .return_once(|_, _| Err(AccountRepositoryError::not_found()));

    let patch = AccountPatch::new(Some("Jane Q. Doe".to_owned()), None, None);
    let error = service(repository, MockCredentialHasher::new())
        .apply_update(&id, &patch)
        .await
        .expect_err("account vanished");

    assert_eq!(error, AccountError::NotFound);
}

#[rstest]
#[tokio::test]
async fn apply_update_reports_missing_account() {
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_id().return_once(|_| Ok(None));
    repository.expect_apply_patch().times(0);

    let error = service(repository, MockCredentialHasher::new())
        .apply_update(&AccountId::random(), &AccountPatch::default())
        .await
        .expect_err("missing account");

    assert_eq!(error, AccountError::NotFound);
}

#[rstest]
#[tokio::test]
async fn remove_deletes_live_account() {
    let account = stored_account();
    let id = account.id();
    let mut repository = MockAccountRepository::new();
    repository
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(account)));
    repository
        .expect_delete()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .return_once(|_| Ok(()));

    service(repository, MockCredentialHasher::new())
        .remove(&id)
        .await
        .expect("removal succeeds");
}

#[rstest]
#[tokio::test]
async fn remove_reports_missing_account() {
    let mut repository = MockAccountRepository::new();
    repository.expect_find_by_id().return_once(|_| Ok(None));
    repository.expect_delete().times(0);

    let error = service(repository, MockCredentialHasher::new())
        .remove(&AccountId::random())
        .await
        .expect_err("missing account");

    assert_eq!(error, AccountError::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_accounts_returns_repository_listing() {
    let mut repository = MockAccountRepository::new();
    repository
        .expect_list_all()
        .return_once(|| Ok(vec![stored_account(), stored_account()]));

    let accounts = service(repository, MockCredentialHasher::new())
        .list_accounts()
        .await
        .expect("listing succeeds");

    assert_eq!(accounts.len(), 2);
}
