//! End-to-end scenarios over a fresh store: creation, listing, the three
//! reports and a full loan/return round.

use biblioteca::{DomainError, Library};
use biblioteca::config::Config;
use biblioteca::infrastructure::telemetry;
use biblioteca::models::{author, book, branch, copy, loan, person};
use chrono::{Duration, Local};

// Helper to open an in-memory store
async fn setup_test_library() -> Library {
    telemetry::init_tracing("biblioteca=debug");
    Library::open(&Config::in_memory())
        .await
        .expect("Failed to open library")
}

#[tokio::test]
async fn test_create_basic_entities() {
    let library = setup_test_library().await;

    let author = library.add_author("Test Autor").await.expect("author");
    assert_eq!(author.name, "Test Autor");

    let book = library
        .add_book("ISBN-TEST-1", "Titol Test", "Editorial", 2020)
        .await
        .expect("book");
    let branch = library
        .add_branch("BiblioTest", "Ciutat", "Adreca 1", "600000000", "b@t.test")
        .await
        .expect("branch");
    let person = library
        .add_person("X0000000T", "Persona Test", "600000001", "p@t.test")
        .await
        .expect("person");
    assert_eq!(person.national_id, "X0000000T");

    let copy = library
        .add_copy("CB-TEST-1", book.id, branch.id)
        .await
        .expect("copy");
    assert!(copy.available, "New copies start available");

    let books = library
        .list_collection::<book::Entity>()
        .await
        .expect("list books");
    assert!(books.iter().any(|b| b.isbn == "ISBN-TEST-1"));

    let copies = library
        .list_collection::<copy::Entity>()
        .await
        .expect("list copies");
    assert!(copies.iter().any(|c| c.barcode == "CB-TEST-1"));

    library.close().await.expect("close");
}

#[tokio::test]
async fn test_many_to_many_and_books_with_authors() {
    let library = setup_test_library().await;

    let author = library.add_author("Autor M:N").await.unwrap();
    let book = library
        .add_book("ISBN-TEST-2", "Titol MN", "Editorial", 2019)
        .await
        .unwrap();
    library
        .add_book("ISBN-TEST-2B", "Titol Sense Autor", "Editorial", 2019)
        .await
        .unwrap();

    library
        .update_author(author.id, author.name.clone(), [book.id])
        .await
        .expect("link author");

    let results = library.find_books_with_authors().await.unwrap();
    let found = results
        .iter()
        .find(|r| r.book.isbn == "ISBN-TEST-2")
        .expect("book with author is listed");
    assert_eq!(found.book.title, "Titol MN");
    assert!(!found.authors.is_empty(), "Authors are loaded");
    assert_eq!(found.authors[0].name, "Autor M:N");

    assert!(
        results.iter().all(|r| r.book.isbn != "ISBN-TEST-2B"),
        "Books without authors are left out"
    );
}

#[tokio::test]
async fn test_books_with_branches() {
    let library = setup_test_library().await;

    let book = library
        .add_book("ISBN-TEST-3", "Titol Biblio", "Editorial", 2018)
        .await
        .unwrap();
    let biblio2 = library
        .add_branch("Biblio2", "Ciutat2", "Ad2", "600000002", "b2@t.test")
        .await
        .unwrap();
    let biblio5 = library
        .add_branch("Biblio5", "Ciutat5", "Ad5", "600000009", "b5@t.test")
        .await
        .unwrap();
    library.add_copy("CB-TEST-2", book.id, biblio2.id).await.unwrap();
    library.add_copy("CB-TEST-2B", book.id, biblio2.id).await.unwrap();
    library.add_copy("CB-TEST-2C", book.id, biblio5.id).await.unwrap();

    let rows = library.find_books_with_branches().await.unwrap();

    let pair = ("Titol Biblio".to_string(), "Biblio2".to_string());
    assert_eq!(rows.iter().filter(|r| **r == pair).count(), 1);
    assert!(rows.contains(&("Titol Biblio".to_string(), "Biblio5".to_string())));
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_loan_and_return_flow() {
    let library = setup_test_library().await;

    let book = library
        .add_book("ISBN-TEST-4", "Titol Prestec", "Editorial", 2017)
        .await
        .unwrap();
    let branch = library
        .add_branch("Biblio3", "Ciutat3", "Ad3", "600000003", "b3@t.test")
        .await
        .unwrap();
    let copy = library.add_copy("CB-TEST-3", book.id, branch.id).await.unwrap();
    let person = library
        .add_person("X1111111A", "Persona Prestec", "600000004", "pp@t.test")
        .await
        .unwrap();

    let today = Local::now().date_naive();
    let loan = library
        .add_loan(copy.id, person.id, today, today + Duration::days(7))
        .await
        .expect("loan on an available copy");
    assert!(loan.active);
    assert_eq!(loan.return_date, None);

    let copies = library.list_collection::<copy::Entity>().await.unwrap();
    let on_loan = copies.iter().find(|c| c.barcode == "CB-TEST-3").unwrap();
    assert!(!on_loan.available, "Copy is lent out");

    library
        .register_return(loan.id, today)
        .await
        .expect("return");

    let copies = library.list_collection::<copy::Entity>().await.unwrap();
    let returned = copies.iter().find(|c| c.barcode == "CB-TEST-3").unwrap();
    assert!(returned.available, "Copy is back on the shelf");

    let loans = library.list_collection::<loan::Entity>().await.unwrap();
    let closed = loans.iter().find(|l| l.id == loan.id).unwrap();
    assert!(!closed.active);
    assert_eq!(closed.return_date, Some(today));
}

#[tokio::test]
async fn test_books_on_loan_query() {
    let library = setup_test_library().await;

    let book = library
        .add_book("ISBN-TEST-5", "Titol En Prestec", "Editorial", 2016)
        .await
        .unwrap();
    let branch = library
        .add_branch("Biblio4", "Ciutat4", "Ad4", "600000005", "b4@t.test")
        .await
        .unwrap();
    let copy = library.add_copy("CB-TEST-4", book.id, branch.id).await.unwrap();
    let person = library
        .add_person("X2222222B", "Persona EP", "600000006", "pep@t.test")
        .await
        .unwrap();

    let today = Local::now().date_naive();
    let loan = library
        .add_loan(copy.id, person.id, today, today + Duration::days(5))
        .await
        .unwrap();

    let rows = library.find_books_on_loan().await.unwrap();
    assert_eq!(
        rows,
        vec![("Titol En Prestec".to_string(), "Persona EP".to_string())]
    );

    library.register_return(loan.id, today).await.unwrap();
    let rows = library.find_books_on_loan().await.unwrap();
    assert!(rows.is_empty(), "Returned loans drop out of the report");
}

#[tokio::test]
async fn test_seed_demo_data_runs_once() {
    let library = setup_test_library().await;

    let seeded = biblioteca::seed::seed_demo_data(&library).await.unwrap();
    assert!(seeded);
    let again = biblioteca::seed::seed_demo_data(&library).await.unwrap();
    assert!(!again, "Second run leaves the store alone");

    let books = library.list_collection::<book::Entity>().await.unwrap();
    assert_eq!(books.len(), 4);
    let copies = library.list_collection::<copy::Entity>().await.unwrap();
    assert_eq!(copies.len(), 8);
    assert_eq!(copies.iter().filter(|c| !c.available).count(), 1);

    let with_authors = library.find_books_with_authors().await.unwrap();
    assert_eq!(with_authors.len(), 4);
    assert_eq!(library.find_books_on_loan().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_seed_failure_rolls_back_everything() {
    let library = setup_test_library().await;

    // The demo reader's national id is already taken, so the seed fails late
    library
        .add_person("00000000T", "Persona existent", "600000009", "p@t.test")
        .await
        .unwrap();

    let err = biblioteca::seed::seed_demo_data(&library).await.unwrap_err();
    assert!(matches!(err, DomainError::ConstraintViolation(_)), "got {:?}", err);

    assert!(library.list_collection::<book::Entity>().await.unwrap().is_empty());
    assert!(library.list_collection::<copy::Entity>().await.unwrap().is_empty());
    assert!(library.list_collection::<branch::Entity>().await.unwrap().is_empty());
    assert!(library.list_collection::<author::Entity>().await.unwrap().is_empty());
    assert!(library.list_collection::<loan::Entity>().await.unwrap().is_empty());
    let people = library.list_collection::<person::Entity>().await.unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].name, "Persona existent");
}
