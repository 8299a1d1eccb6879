use biblioteca::domain::CopyRepository;
use biblioteca::models::copy;
use biblioteca::services::loan_service;
use biblioteca::{DomainError, Library};
use chrono::NaiveDate;
use sea_orm::ConnectOptions;
use std::sync::Arc;

async fn setup_test_library() -> Library {
    Library::connect("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// Helper: one book at one branch with a single copy, plus a borrower
async fn create_loanable_copy(library: &Library, barcode: &str, national_id: &str) -> (i32, i32) {
    let book = library
        .add_book(format!("ISBN-{}", barcode), "Llibre", "Editorial", 2001)
        .await
        .expect("Failed to create book");
    let branch = library
        .add_branch("Branca", "Ciutat", "Adreca", "600000000", "b@t.test")
        .await
        .expect("Failed to create branch");
    let copy = library
        .add_copy(barcode, book.id, branch.id)
        .await
        .expect("Failed to create copy");
    let person = library
        .add_person(national_id, "Lector", "600000001", "l@t.test")
        .await
        .expect("Failed to create person");
    (copy.id, person.id)
}

async fn copy_available(library: &Library, copy_id: i32) -> bool {
    library
        .copies
        .find_by_id(copy_id)
        .await
        .unwrap()
        .expect("copy exists")
        .available
}

async fn assert_consistent(library: &Library) {
    let mismatches = loan_service::audit_availability(library.db()).await.unwrap();
    assert!(mismatches.is_empty(), "inconsistent copies: {:?}", mismatches);
}

#[tokio::test]
async fn test_loan_on_unavailable_copy_is_refused_without_changes() {
    let library = setup_test_library().await;
    let (copy_id, first) = create_loanable_copy(&library, "CB-1", "P-1").await;
    let second = library
        .add_person("P-2", "Altre", "600000002", "a@t.test")
        .await
        .unwrap();

    library
        .add_loan(copy_id, first, date(2024, 3, 1), date(2024, 3, 15))
        .await
        .unwrap();
    let before = library.list_collection::<copy::Entity>().await.unwrap();

    let err = library
        .add_loan(copy_id, second.id, date(2024, 3, 2), date(2024, 3, 16))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::CopyUnavailable { copy_id });

    let after = library.list_collection::<copy::Entity>().await.unwrap();
    assert_eq!(before, after);
    assert_eq!(loan_service::count_loans(library.db()).await.unwrap(), 1);
    assert_consistent(&library).await;
}

#[tokio::test]
async fn test_second_return_is_rejected_and_state_is_stable() {
    let library = setup_test_library().await;
    let (copy_id, person_id) = create_loanable_copy(&library, "CB-2", "P-1").await;

    let loan = library
        .add_loan(copy_id, person_id, date(2024, 3, 1), date(2024, 3, 15))
        .await
        .unwrap();
    assert!(!copy_available(&library, copy_id).await);
    assert_consistent(&library).await;

    let returned = library
        .register_return(loan.id, date(2024, 3, 10))
        .await
        .unwrap();
    assert!(!returned.active);
    assert_eq!(returned.return_date, Some(date(2024, 3, 10)));

    let err = library
        .register_return(loan.id, date(2024, 3, 11))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::AlreadyReturned { loan_id: loan.id });

    assert!(copy_available(&library, copy_id).await);
    let active = loan_service::find_active_loan_for_copy(library.db(), copy_id)
        .await
        .unwrap();
    assert!(active.is_none());
    assert_consistent(&library).await;
}

#[tokio::test]
async fn test_copy_can_be_lent_again_after_return() {
    let library = setup_test_library().await;
    let (copy_id, person_id) = create_loanable_copy(&library, "CB-3", "P-1").await;

    let first = library
        .add_loan(copy_id, person_id, date(2024, 1, 1), date(2024, 1, 10))
        .await
        .unwrap();
    library.register_return(first.id, date(2024, 1, 5)).await.unwrap();

    let second = library
        .add_loan(copy_id, person_id, date(2024, 2, 1), date(2024, 2, 10))
        .await
        .expect("copy is available again");
    assert_ne!(first.id, second.id);

    assert_eq!(loan_service::count_loans(library.db()).await.unwrap(), 2);
    assert_eq!(loan_service::count_active_loans(library.db()).await.unwrap(), 1);
    assert_consistent(&library).await;
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let library = setup_test_library().await;
    let (copy_id, person_id) = create_loanable_copy(&library, "CB-4", "P-1").await;

    let err = library
        .add_loan(999, person_id, date(2024, 1, 1), date(2024, 1, 10))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_found("copy", 999));

    let err = library
        .add_loan(copy_id, 999, date(2024, 1, 1), date(2024, 1, 10))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_found("person", 999));
    assert!(copy_available(&library, copy_id).await);

    let err = library
        .register_return(999, date(2024, 1, 1))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_found("loan", 999));
}

#[tokio::test]
async fn test_date_ordering_is_validated() {
    let library = setup_test_library().await;
    let (copy_id, person_id) = create_loanable_copy(&library, "CB-5", "P-1").await;

    let err = library
        .add_loan(copy_id, person_id, date(2024, 1, 10), date(2024, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert!(copy_available(&library, copy_id).await);

    let loan = library
        .add_loan(copy_id, person_id, date(2024, 1, 10), date(2024, 1, 20))
        .await
        .unwrap();
    let err = library
        .register_return(loan.id, date(2024, 1, 9))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert!(!copy_available(&library, copy_id).await);
    assert_consistent(&library).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_racing_loans_on_one_copy_only_one_wins() {
    // File-backed store with a real pool, so the loans contend for the copy
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("race.db").display());
    let library = Arc::new(
        Library::connect_with(ConnectOptions::new(url).max_connections(8).to_owned())
            .await
            .expect("Failed to open file store"),
    );

    let book = library
        .add_book("ISBN-RACE", "Llibre disputat", "Editorial", 2001)
        .await
        .unwrap();
    let branch = library
        .add_branch("Branca", "Ciutat", "Adreca", "600000000", "b@t.test")
        .await
        .unwrap();
    let mut borrowers = Vec::new();
    for i in 0..6 {
        let person = library
            .add_person(format!("P-RACE-{}", i), "Lector", "600000001", "l@t.test")
            .await
            .unwrap();
        borrowers.push(person.id);
    }

    for round in 0..10 {
        let copy_id = library
            .add_copy(format!("CB-RACE-{}", round), book.id, branch.id)
            .await
            .unwrap()
            .id;

        let tasks: Vec<_> = borrowers
            .iter()
            .map(|&person_id| {
                let library = Arc::clone(&library);
                tokio::spawn(async move {
                    library
                        .add_loan(copy_id, person_id, date(2024, 5, 1), date(2024, 5, 8))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.expect("task panicked") {
                Ok(_) => successes += 1,
                Err(err) => assert_eq!(err, DomainError::CopyUnavailable { copy_id }),
            }
        }
        assert_eq!(successes, 1, "round {} had {} winners", round, successes);
        assert!(!copy_available(&library, copy_id).await);
    }

    assert_eq!(loan_service::count_active_loans(library.db()).await.unwrap(), 10);
    assert_consistent(&library).await;
}

#[tokio::test]
async fn test_overdue_loans() {
    let library = setup_test_library().await;
    let (late_copy, person_id) = create_loanable_copy(&library, "CB-7", "P-1").await;
    let (fresh_copy, _) = create_loanable_copy(&library, "CB-8", "P-2").await;

    let late = library
        .add_loan(late_copy, person_id, date(2024, 1, 1), date(2024, 1, 15))
        .await
        .unwrap();
    library
        .add_loan(fresh_copy, person_id, date(2024, 1, 10), date(2024, 2, 15))
        .await
        .unwrap();

    let overdue = loan_service::find_overdue_loans(library.db(), date(2024, 2, 1))
        .await
        .unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late.id);

    library.register_return(late.id, date(2024, 2, 2)).await.unwrap();
    let overdue = loan_service::find_overdue_loans(library.db(), date(2024, 2, 3))
        .await
        .unwrap();
    assert!(overdue.is_empty());
}
