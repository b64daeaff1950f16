// src/services/check_service.rs

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{RecordRepository, Store, Transaction},
    models::finance::{
        ApprovalHistoryEntry, CheckRelease, CheckRequest, CheckRequestStatus, CreateCheckRequestPayload,
        Expense, ExpensePaymentStatus, ReleasedCheck,
    },
};

/// Primeiro número de cheque emitido (`000123`).
const FIRST_CHECK_NUMBER: u64 = 123;

#[derive(Clone)]
pub struct CheckService {
    store: Store,
    requests: RecordRepository<CheckRequest>,
    releases: RecordRepository<CheckRelease>,
    expenses: RecordRepository<Expense>,
}

impl CheckService {
    pub fn new(store: Store) -> Self {
        Self {
            requests: RecordRepository::new(store.clone()),
            releases: RecordRepository::new(store.clone()),
            expenses: RecordRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list_requests(&self) -> Result<Vec<CheckRequest>, AppError> {
        self.requests.list().await
    }

    pub async fn list_releases(&self) -> Result<Vec<CheckRelease>, AppError> {
        self.releases.list().await
    }

    pub async fn create_request(&self, payload: CreateCheckRequestPayload) -> Result<CheckRequest, AppError> {
        let mut missing = Vec::new();
        if payload.payee.trim().is_empty() {
            missing.push("payee".to_string());
        }
        if payload.amount.is_none() {
            missing.push("amount".to_string());
        }
        if payload.purpose.trim().is_empty() {
            missing.push("purpose".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let amount = payload.amount.unwrap_or_default();
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Please enter a valid amount.".into()));
        }

        let mut tx = self.store.begin().await;
        let request = self
            .create_request_in(&mut tx, payload.payee.trim(), amount, payload.purpose.trim(), None)
            .await?;
        tx.commit().await?;
        Ok(request)
    }

    /// Usado também pelo fluxo de despesas, dentro da transação dele.
    pub async fn create_request_in(
        &self,
        tx: &mut Transaction,
        payee: &str,
        amount: Decimal,
        purpose: &str,
        expense_id: Option<String>,
    ) -> Result<CheckRequest, AppError> {
        let request = CheckRequest {
            id: String::new(),
            date: Some(Utc::now().date_naive()),
            payee: payee.to_string(),
            amount,
            purpose: purpose.to_string(),
            status: CheckRequestStatus::Pending,
            expense_id,
            decided_by: None,
            rejection_reason: None,
        };
        let request = self.requests.create(tx, request).await?;
        tracing::info!(request_id = %request.id, %amount, "Pedido de cheque registrado");
        Ok(request)
    }

    pub async fn approve(&self, id: &str, actor: &str) -> Result<CheckRequest, AppError> {
        let mut tx = self.store.begin().await;
        let request = self.approve_in(&mut tx, id, actor).await?;
        tx.commit().await?;
        Ok(request)
    }

    pub async fn approve_in(&self, tx: &mut Transaction, id: &str, actor: &str) -> Result<CheckRequest, AppError> {
        self.requests
            .update(tx, id, |request| {
                ensure_status(request, CheckRequestStatus::Pending, "approve")?;
                request.status = CheckRequestStatus::Approved;
                request.decided_by = Some(actor.to_string());
                Ok(())
            })
            .await
    }

    pub async fn reject(&self, id: &str, reason: &str, actor: &str) -> Result<CheckRequest, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("Please provide a reason for rejection.".into()));
        }

        let mut tx = self.store.begin().await;
        let request = self
            .requests
            .update(&mut tx, id, |request| {
                ensure_status(request, CheckRequestStatus::Pending, "reject")?;
                request.status = CheckRequestStatus::Rejected;
                request.decided_by = Some(actor.to_string());
                request.rejection_reason = Some(reason.to_string());
                Ok(())
            })
            .await?;
        tx.commit().await?;
        Ok(request)
    }

    pub async fn release(&self, id: &str, actor: &str) -> Result<ReleasedCheck, AppError> {
        let mut tx = self.store.begin().await;
        let released = self.release_in(&mut tx, id, actor).await?;
        tx.commit().await?;
        Ok(released)
    }

    /// Emite o cheque de um pedido aprovado. Se o pedido veio de uma despesa,
    /// ela é marcada como paga no mesmo lote.
    pub async fn release_in(&self, tx: &mut Transaction, id: &str, actor: &str) -> Result<ReleasedCheck, AppError> {
        let request = self
            .requests
            .update(tx, id, |request| {
                ensure_status(request, CheckRequestStatus::Approved, "release")?;
                request.status = CheckRequestStatus::Released;
                Ok(())
            })
            .await?;

        let existing = self.releases.list_in(tx).await?;
        let check_no = next_check_number(&existing);
        let today = Utc::now().date_naive();

        let release = self
            .releases
            .create(
                tx,
                CheckRelease {
                    id: String::new(),
                    request_id: request.id.clone(),
                    release_date: Some(today),
                    check_no: format!("{:06}", check_no),
                    payee: request.payee.clone(),
                    released_by: actor.to_string(),
                    amount: request.amount,
                },
            )
            .await?;

        let expense = match &request.expense_id {
            Some(expense_id) => self.mark_expense_paid(tx, expense_id, &release, actor).await?,
            None => None,
        };

        tracing::info!(request_id = %request.id, check_no = %release.check_no, "💸 Cheque liberado");
        Ok(ReleasedCheck { request, release, expense })
    }

    pub async fn delete_request(&self, id: &str, reason: &str, actor: &str) -> Result<CheckRequest, AppError> {
        let mut tx = self.store.begin().await;
        let removed = self.requests.delete(&mut tx, id, reason, actor).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn mark_expense_paid(
        &self,
        tx: &mut Transaction,
        expense_id: &str,
        release: &CheckRelease,
        actor: &str,
    ) -> Result<Option<Expense>, AppError> {
        let known = self.expenses.list_in(tx).await?.iter().any(|e| e.id == expense_id);
        if !known {
            tracing::warn!(expense_id, "Despesa vinculada ao cheque não existe mais");
            return Ok(None);
        }

        let expense = self
            .expenses
            .update(tx, expense_id, |expense| {
                expense.payment_status = ExpensePaymentStatus::Paid;
                expense.check_release_date = release.release_date;
                expense.approval_history.push(ApprovalHistoryEntry {
                    action: "Check Released".into(),
                    status: ExpensePaymentStatus::Paid.label().into(),
                    timestamp: Some(Utc::now()),
                    user: actor.to_string(),
                    note: format!("Check {} released to {}", release.check_no, release.payee),
                });
                Ok(())
            })
            .await?;
        Ok(Some(expense))
    }
}

fn ensure_status(request: &CheckRequest, expected: CheckRequestStatus, action: &'static str) -> Result<(), AppError> {
    if request.status != expected {
        return Err(AppError::InvalidTransition {
            entity: "check request",
            id: request.id.clone(),
            status: request.status.label().to_string(),
            action,
        });
    }
    Ok(())
}

fn next_check_number(releases: &[CheckRelease]) -> u64 {
    releases
        .iter()
        .filter_map(|r| r.check_no.trim().parse::<u64>().ok())
        .max()
        .map_or(FIRST_CHECK_NUMBER, |n| n + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(amount: i64) -> CreateCheckRequestPayload {
        CreateCheckRequestPayload {
            payee: "Meralco".into(),
            amount: Some(Decimal::from(amount)),
            purpose: "Electric bill".into(),
        }
    }

    #[tokio::test]
    async fn release_requires_approval_and_numbers_checks() {
        let service = CheckService::new(Store::in_memory());
        let first = service.create_request(payload(1200)).await.unwrap();
        let second = service.create_request(payload(800)).await.unwrap();

        let early = service.release(&first.id, "Executive").await;
        assert!(matches!(early, Err(AppError::InvalidTransition { .. })));

        service.approve(&first.id, "Manager").await.unwrap();
        service.approve(&second.id, "Manager").await.unwrap();
        let a = service.release(&first.id, "Executive").await.unwrap();
        let b = service.release(&second.id, "Executive").await.unwrap();

        assert_eq!(a.release.check_no, "000123");
        assert_eq!(b.release.check_no, "000124");
        assert_eq!(a.request.status, CheckRequestStatus::Released);
        assert!(a.expense.is_none());
        assert_eq!(service.list_releases().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let service = CheckService::new(Store::in_memory());

        let err = service
            .create_request(CreateCheckRequestPayload {
                payee: "Meralco".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFields(f) if f == vec!["amount", "purpose"]));

        let err = service.create_request(payload(-5)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejected_requests_cannot_be_released() {
        let service = CheckService::new(Store::in_memory());
        let request = service.create_request(payload(500)).await.unwrap();

        assert!(service.reject(&request.id, "", "Manager").await.is_err());
        let rejected = service.reject(&request.id, "Duplicate", "Manager").await.unwrap();
        assert_eq!(rejected.status, CheckRequestStatus::Rejected);

        assert!(service.approve(&request.id, "Manager").await.is_err());
        assert!(service.release(&request.id, "Executive").await.is_err());
        assert!(service.list_releases().await.unwrap().is_empty());
    }
}
