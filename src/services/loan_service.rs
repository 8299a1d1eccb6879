//! Loan Service - the loan lifecycle and copy availability
//!
//! A copy is `AVAILABLE` or `LOANED`. Both transitions run in a single
//! transaction that writes the loan and the copy together, so no reader
//! ever sees one without the other.

use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::collections::HashSet;

use crate::domain::{DomainError, DomainResult};
use crate::models::copy::{self, Entity as Copy};
use crate::models::loan::{self, Entity as Loan};
use crate::models::person::Entity as Person;

/// A copy whose availability flag disagrees with its loans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityMismatch {
    pub copy_id: i32,
    pub barcode: String,
    pub available: bool,
    pub has_active_loan: bool,
}

/// Lend a copy to a person (`AVAILABLE -> LOANED`)
pub async fn add_loan(
    db: &DatabaseConnection,
    copy_id: i32,
    person_id: i32,
    loan_date: NaiveDate,
    due_date: NaiveDate,
) -> DomainResult<loan::Model> {
    let txn = db.begin().await?;
    let saved_loan = open_loan(&txn, copy_id, person_id, loan_date, due_date).await?;
    txn.commit().await?;

    tracing::info!(
        "Loan {} opened: copy {} to person {} until {}",
        saved_loan.id,
        copy_id,
        person_id,
        due_date
    );
    Ok(saved_loan)
}

/// Open a loan on `conn`, which the caller commits
///
/// The copy is claimed with a conditional update issued before any read,
/// so of two writers racing on the same copy only one gets a row back and
/// the other waits on the store lock rather than on a stale snapshot. The
/// partial unique index on active loans backs this up.
pub(crate) async fn open_loan<C>(
    conn: &C,
    copy_id: i32,
    person_id: i32,
    loan_date: NaiveDate,
    due_date: NaiveDate,
) -> DomainResult<loan::Model>
where
    C: ConnectionTrait,
{
    if due_date < loan_date {
        return Err(DomainError::validation(format!(
            "due date {} precedes loan date {}",
            due_date, loan_date
        )));
    }

    let now = chrono::Utc::now().to_rfc3339();

    // 1. Claim the copy
    let claimed = Copy::update_many()
        .col_expr(copy::Column::Available, Expr::value(false))
        .col_expr(copy::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(copy::Column::Id.eq(copy_id))
        .filter(copy::Column::Available.eq(true))
        .exec(conn)
        .await?;

    if claimed.rows_affected == 0 {
        let exists = Copy::find_by_id(copy_id).one(conn).await?.is_some();
        if !exists {
            return Err(DomainError::not_found("copy", copy_id));
        }
        tracing::warn!("Loan refused: copy {} is already on loan", copy_id);
        return Err(DomainError::CopyUnavailable { copy_id });
    }

    // 2. Check the borrower; failing here rolls the claim back with the txn
    Person::find_by_id(person_id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found("person", person_id))?;

    // 3. Create Loan
    let new_loan = loan::ActiveModel {
        copy_id: Set(copy_id),
        person_id: Set(person_id),
        loan_date: Set(loan_date),
        due_date: Set(due_date),
        return_date: Set(None),
        active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(new_loan.insert(conn).await?)
}

/// Register the return of a loan (`LOANED -> AVAILABLE`)
///
/// Returning a loan that is already closed fails with `AlreadyReturned`
/// and changes nothing.
pub async fn register_return(
    db: &DatabaseConnection,
    loan_id: i32,
    return_date: NaiveDate,
) -> DomainResult<loan::Model> {
    let txn = db.begin().await?;
    let updated_loan = close_loan(&txn, loan_id, return_date).await?;
    txn.commit().await?;

    tracing::info!(
        "Loan {} closed: copy {} returned on {}",
        loan_id,
        updated_loan.copy_id,
        return_date
    );
    Ok(updated_loan)
}

async fn close_loan<C>(
    conn: &C,
    loan_id: i32,
    return_date: NaiveDate,
) -> DomainResult<loan::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().to_rfc3339();

    // 1. Close it, guarded on still being active
    let closed = Loan::update_many()
        .col_expr(loan::Column::ReturnDate, Expr::value(return_date))
        .col_expr(loan::Column::Active, Expr::value(false))
        .col_expr(loan::Column::UpdatedAt, Expr::value(now.clone()))
        .filter(loan::Column::Id.eq(loan_id))
        .filter(loan::Column::Active.eq(true))
        .filter(loan::Column::LoanDate.lte(return_date))
        .exec(conn)
        .await?;

    let updated_loan = Loan::find_by_id(loan_id)
        .one(conn)
        .await?
        .ok_or(DomainError::not_found("loan", loan_id))?;

    if closed.rows_affected == 0 {
        if !updated_loan.active {
            return Err(DomainError::AlreadyReturned { loan_id });
        }
        return Err(DomainError::validation(format!(
            "return date {} precedes loan date {}",
            return_date, updated_loan.loan_date
        )));
    }

    // 2. Put the copy back on the shelf
    Copy::update_many()
        .col_expr(copy::Column::Available, Expr::value(true))
        .col_expr(copy::Column::UpdatedAt, Expr::value(now))
        .filter(copy::Column::Id.eq(updated_loan.copy_id))
        .exec(conn)
        .await?;

    Ok(updated_loan)
}

/// The open loan on a copy, if any
pub async fn find_active_loan_for_copy(
    db: &DatabaseConnection,
    copy_id: i32,
) -> DomainResult<Option<loan::Model>> {
    Ok(Loan::find()
        .filter(loan::Column::CopyId.eq(copy_id))
        .filter(loan::Column::Active.eq(true))
        .one(db)
        .await?)
}

/// Active loans whose due date is before `today`
pub async fn find_overdue_loans(
    db: &DatabaseConnection,
    today: NaiveDate,
) -> DomainResult<Vec<loan::Model>> {
    Ok(Loan::find()
        .filter(loan::Column::Active.eq(true))
        .filter(loan::Column::DueDate.lt(today))
        .order_by_asc(loan::Column::DueDate)
        .all(db)
        .await?)
}

/// Count total loans
pub async fn count_loans(db: &DatabaseConnection) -> DomainResult<u64> {
    Ok(Loan::find().count(db).await?)
}

/// Count active loans
pub async fn count_active_loans(db: &DatabaseConnection) -> DomainResult<u64> {
    Ok(Loan::find()
        .filter(loan::Column::Active.eq(true))
        .count(db)
        .await?)
}

/// Every copy whose `available` flag does not match its loans.
///
/// Empty whenever the availability invariant holds.
pub async fn audit_availability(
    db: &DatabaseConnection,
) -> DomainResult<Vec<AvailabilityMismatch>> {
    let on_loan: HashSet<i32> = Loan::find()
        .select_only()
        .column(loan::Column::CopyId)
        .filter(loan::Column::Active.eq(true))
        .into_tuple::<i32>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let copies = Copy::find().all(db).await?;

    Ok(copies
        .into_iter()
        .filter_map(|c| {
            let has_active_loan = on_loan.contains(&c.id);
            (c.available == has_active_loan).then(|| AvailabilityMismatch {
                copy_id: c.id,
                barcode: c.barcode,
                available: c.available,
                has_active_loan,
            })
        })
        .collect())
}
