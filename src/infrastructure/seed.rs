use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};
use std::collections::BTreeMap;

use super::repositories::{insert_author, insert_book, insert_branch, insert_copy, insert_person};
use super::state::Library;
use crate::domain::{DomainResult, NewBook, NewBranch, NewCopy, NewPerson};
use crate::models::book;
use crate::services::{author_service, loan_service};

/// Load a small demo catalogue into an empty store.
///
/// Everything is written in one transaction: either the whole catalogue
/// lands or nothing does. Returns `false` without touching anything when
/// books already exist.
pub async fn seed_demo_data(library: &Library) -> DomainResult<bool> {
    let txn = library.db().begin().await?;

    if book::Entity::find().count(&txn).await? > 0 {
        tracing::debug!("Store already has books, skipping demo seed");
        return Ok(false);
    }

    // 1. Branches
    let central = insert_branch(
        &txn,
        NewBranch {
            name: "Biblioteca Central".to_string(),
            city: "Barcelona".to_string(),
            address: "Carrer del Carme 47".to_string(),
            phone: "932701620".to_string(),
            email: "central@biblioteca.test".to_string(),
        },
    )
    .await?;
    let gracia = insert_branch(
        &txn,
        NewBranch {
            name: "Biblioteca Vila de Gràcia".to_string(),
            city: "Barcelona".to_string(),
            address: "Carrer de Torrijos 59".to_string(),
            phone: "932849300".to_string(),
            email: "gracia@biblioteca.test".to_string(),
        },
    )
    .await?;

    // 2. Books, one copy per branch
    let catalogue = [
        ("978-84-9787-478-2", "Mirall trencat", "Club Editor", 1974, "Mercè Rodoreda"),
        ("978-84-9787-001-2", "La plaça del Diamant", "Club Editor", 1962, "Mercè Rodoreda"),
        ("978-84-7727-533-0", "Solitud", "Proa", 1905, "Víctor Català"),
        ("978-84-8256-717-3", "Incerta glòria", "Edicions 62", 1956, "Joan Sales"),
    ];

    let mut books_by_author: BTreeMap<&str, Vec<i32>> = BTreeMap::new();
    let mut copies = Vec::new();
    for (isbn, title, publisher, year, author_name) in catalogue {
        let book = insert_book(
            &txn,
            NewBook {
                isbn: isbn.to_string(),
                title: title.to_string(),
                publisher: publisher.to_string(),
                publication_year: year,
            },
        )
        .await?;
        books_by_author.entry(author_name).or_default().push(book.id);

        for (suffix, branch_id) in [("C", central.id), ("G", gracia.id)] {
            let input = NewCopy {
                barcode: format!("CB-{}-{}", book.id, suffix),
                book_id: book.id,
                branch_id,
            };
            copies.push(insert_copy(&txn, input).await?);
        }
    }

    // 3. Authors and their links
    for (name, book_ids) in books_by_author {
        let author = insert_author(&txn, name.to_string()).await?;
        author_service::relink_author(&txn, author.id, author.name, book_ids).await?;
    }

    // 4. A reader with one open loan
    let reader = insert_person(
        &txn,
        NewPerson {
            national_id: "00000000T".to_string(),
            name: "Lectora de Prova".to_string(),
            phone: "600000000".to_string(),
            email: "lectora@biblioteca.test".to_string(),
        },
    )
    .await?;
    if let Some(first) = copies.first() {
        let today = Utc::now().date_naive();
        loan_service::open_loan(&txn, first.id, reader.id, today, today + Duration::days(21))
            .await?;
    }

    txn.commit().await?;

    tracing::info!("Seeded demo catalogue with {} copies", copies.len());
    Ok(true)
}
