// src/services/expense_service.rs

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, lenient::parse_date},
    db::{RecordRepository, Store},
    models::finance::{
        ApprovalHistoryEntry, Approver, CreateExpensePayload, Expense, ExpensePaymentStatus, ExpenseStatus,
        MANAGER, MARKET_MASTER, ReleasedCheck,
    },
    services::{check_service::CheckService, document_service::DocumentService},
};

/// Acima deste valor (em pesos) a despesa vai para o gerente.
pub const MARKET_MASTER_LIMIT: i64 = 50_000;

pub fn approver_for(amount_php: Decimal) -> Approver {
    if amount_php <= Decimal::from(MARKET_MASTER_LIMIT) {
        MARKET_MASTER
    } else {
        MANAGER
    }
}

#[derive(Clone)]
pub struct ExpenseService {
    store: Store,
    expenses: RecordRepository<Expense>,
    checks: CheckService,
    documents: DocumentService,
}

impl ExpenseService {
    pub fn new(store: Store, checks: CheckService, documents: DocumentService) -> Self {
        Self {
            expenses: RecordRepository::new(store.clone()),
            store,
            checks,
            documents,
        }
    }

    pub async fn list(&self, status: Option<ExpenseStatus>) -> Result<Vec<Expense>, AppError> {
        let expenses = self.expenses.list().await?;
        Ok(match status {
            Some(wanted) => expenses.into_iter().filter(|e| e.approval_status == wanted).collect(),
            None => expenses,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Expense, AppError> {
        self.expenses.get(id).await
    }

    pub async fn record(&self, payload: CreateExpensePayload, actor: &str) -> Result<Expense, AppError> {
        let mut missing = Vec::new();
        if payload.expense_date.trim().is_empty() {
            missing.push("expenseDate".to_string());
        }
        if payload.expense_category.trim().is_empty() {
            missing.push("expenseCategory".to_string());
        }
        if payload.expense_amount.is_none() {
            missing.push("expenseAmount".to_string());
        }
        if payload.expense_description.trim().is_empty() {
            missing.push("expenseDescription".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let amount = payload.expense_amount.unwrap_or_default();
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("Please enter a valid amount.".into()));
        }

        let expense_date = parse_date(&payload.expense_date)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid expense date: {}", payload.expense_date)))?;

        let currency = payload
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "PhP".to_string());
        let exchange_rate = if currency == "PhP" {
            Decimal::ONE
        } else {
            match payload.exchange_rate {
                Some(rate) if rate > Decimal::ZERO => rate,
                _ => {
                    return Err(AppError::InvalidInput(
                        "Please enter a valid exchange rate for foreign currency.".into(),
                    ));
                }
            }
        };

        let receipt = payload.receipt.map(|r| self.documents.validate(r)).transpose()?;

        let auto = approver_for(amount * exchange_rate);
        let chosen = payload.approver.filter(|a| !a.trim().is_empty());
        let now = Utc::now();

        let expense = Expense {
            id: String::new(),
            expense_date: Some(expense_date),
            expense_category: payload.expense_category.trim().to_string(),
            expense_amount: amount,
            expense_description: payload.expense_description.trim().to_string(),
            payment_method: payload.payment_method,
            charged_to: payload.charged_to,
            supplier_id: payload.supplier_id,
            project_code: payload.project_code,
            priority: payload.priority.unwrap_or_else(|| "Medium".to_string()),
            currency,
            exchange_rate,
            due_date: parse_date(&payload.due_date),
            approval_status: ExpenseStatus::Pending,
            payment_status: ExpensePaymentStatus::Pending,
            auto_assigned_approver: chosen.is_none().then(|| auto.name.to_string()),
            current_approver: chosen.unwrap_or_else(|| auto.id.to_string()),
            submitted_by: actor.to_string(),
            approval_history: vec![ApprovalHistoryEntry {
                action: "Submitted".into(),
                status: ExpenseStatus::Pending.label().into(),
                timestamp: Some(now),
                user: actor.to_string(),
                note: "Expense submitted for approval".into(),
            }],
            approved_by: None,
            rejection_reason: None,
            check_request_id: None,
            check_request_date: None,
            check_release_date: None,
            receipt,
            created_at: Some(now),
        };

        let mut tx = self.store.begin().await;
        let expense = self.expenses.create(&mut tx, expense).await?;
        tx.commit().await?;

        tracing::info!(expense_id = %expense.id, approver = %expense.current_approver, "🧾 Despesa registrada");
        Ok(expense)
    }

    pub async fn approve(&self, id: &str, note: &str, actor: &str) -> Result<Expense, AppError> {
        self.decide(id, ExpenseStatus::Approved, "Approved", note, actor, |expense| {
            expense.approved_by = Some(actor.to_string());
        })
        .await
    }

    pub async fn reject(&self, id: &str, reason: &str, actor: &str) -> Result<Expense, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("Please provide a reason for rejection.".into()));
        }
        self.decide(id, ExpenseStatus::Rejected, "Rejected", reason, actor, |expense| {
            expense.rejection_reason = Some(reason.to_string());
        })
        .await
    }

    pub async fn mark_under_review(&self, id: &str, note: &str, actor: &str) -> Result<Expense, AppError> {
        self.decide(id, ExpenseStatus::UnderReview, "Marked for Review", note, actor, |_| {})
            .await
    }

    // Pending e Under Review são os únicos estados que aceitam decisão
    async fn decide<F>(
        &self,
        id: &str,
        target: ExpenseStatus,
        action: &str,
        note: &str,
        actor: &str,
        extra: F,
    ) -> Result<Expense, AppError>
    where
        F: FnOnce(&mut Expense),
    {
        let mut tx = self.store.begin().await;
        let expense = self
            .expenses
            .update(&mut tx, id, |expense| {
                let open = matches!(expense.approval_status, ExpenseStatus::Pending | ExpenseStatus::UnderReview);
                if !open || expense.approval_status == target {
                    return Err(AppError::InvalidTransition {
                        entity: "expense",
                        id: expense.id.clone(),
                        status: expense.approval_status.label().to_string(),
                        action: transition_verb(target),
                    });
                }

                expense.approval_status = target;
                extra(expense);
                expense.approval_history.push(ApprovalHistoryEntry {
                    action: action.to_string(),
                    status: target.label().to_string(),
                    timestamp: Some(Utc::now()),
                    user: actor.to_string(),
                    note: note.trim().to_string(),
                });
                Ok(())
            })
            .await?;
        tx.commit().await?;

        tracing::info!(expense_id = %expense.id, status = target.label(), "Despesa atualizada");
        Ok(expense)
    }

    /// Despesa aprovada → "Ready for Payment", com um pedido de cheque vinculado no mesmo lote.
    pub async fn generate_check_request(&self, id: &str, actor: &str) -> Result<Expense, AppError> {
        let mut tx = self.store.begin().await;
        let expense = self.expenses.get_in(&mut tx, id).await?;

        if expense.approval_status != ExpenseStatus::Approved {
            return Err(AppError::InvalidTransition {
                entity: "expense",
                id: expense.id,
                status: expense.approval_status.label().to_string(),
                action: "request a check for",
            });
        }
        if expense.payment_status != ExpensePaymentStatus::Pending {
            return Err(AppError::InvalidTransition {
                entity: "expense",
                id: expense.id,
                status: expense.payment_status.label().to_string(),
                action: "request a check for",
            });
        }

        let payee = [&expense.supplier_id, &expense.charged_to, &expense.expense_category]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_default();
        let request = self
            .checks
            .create_request_in(
                &mut tx,
                &payee,
                expense.expense_amount * expense.exchange_rate,
                &expense.expense_description,
                Some(expense.id.clone()),
            )
            .await?;

        let today = Utc::now().date_naive();
        let expense = self
            .expenses
            .update(&mut tx, id, |expense| {
                expense.payment_status = ExpensePaymentStatus::ReadyForPayment;
                expense.check_request_id = Some(request.id.clone());
                expense.check_request_date = Some(today);
                expense.approval_history.push(ApprovalHistoryEntry {
                    action: "Check Requested".into(),
                    status: ExpensePaymentStatus::ReadyForPayment.label().into(),
                    timestamp: Some(Utc::now()),
                    user: actor.to_string(),
                    note: format!("Check request {} generated", request.id),
                });
                Ok(())
            })
            .await?;
        tx.commit().await?;
        Ok(expense)
    }

    /// Autorização do executivo: aprova (se preciso) e libera o cheque vinculado;
    /// a liberação marca a despesa como paga.
    pub async fn authorize_release(&self, id: &str, actor: &str) -> Result<ReleasedCheck, AppError> {
        let mut tx = self.store.begin().await;
        let expense = self.expenses.get_in(&mut tx, id).await?;

        if expense.payment_status != ExpensePaymentStatus::ReadyForPayment {
            return Err(AppError::InvalidTransition {
                entity: "expense",
                id: expense.id,
                status: expense.payment_status.label().to_string(),
                action: "release payment for",
            });
        }
        let check_id = expense
            .check_request_id
            .clone()
            .ok_or_else(|| AppError::Conflict(format!("Expense {} has no check request", expense.id)))?;

        let pending = self
            .checks
            .approve_in(&mut tx, &check_id, actor)
            .await;
        if let Err(err) = pending {
            // Já aprovado é aceitável; qualquer outro estado não
            if !matches!(err, AppError::InvalidTransition { ref status, .. } if status == "Approved") {
                return Err(err);
            }
        }

        let released = self.checks.release_in(&mut tx, &check_id, actor).await?;
        tx.commit().await?;
        Ok(released)
    }

    pub async fn delete(&self, id: &str, reason: &str, actor: &str) -> Result<Expense, AppError> {
        let mut tx = self.store.begin().await;
        let removed = self.expenses.delete(&mut tx, id, reason, actor).await?;
        tx.commit().await?;
        Ok(removed)
    }
}

fn transition_verb(target: ExpenseStatus) -> &'static str {
    match target {
        ExpenseStatus::Approved => "approve",
        ExpenseStatus::Rejected => "reject",
        ExpenseStatus::UnderReview => "review",
        ExpenseStatus::Pending => "reopen",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::finance::CheckRequestStatus, services::document_service::DEFAULT_MAX_UPLOAD_BYTES};

    fn service() -> ExpenseService {
        let store = Store::in_memory();
        ExpenseService::new(
            store.clone(),
            CheckService::new(store),
            DocumentService::new(DEFAULT_MAX_UPLOAD_BYTES),
        )
    }

    fn payload(amount: i64) -> CreateExpensePayload {
        CreateExpensePayload {
            expense_date: "2025-02-14".into(),
            expense_category: "Utilities".into(),
            expense_amount: Some(Decimal::from(amount)),
            expense_description: "Water pump repair".into(),
            supplier_id: "SUP-01".into(),
            ..Default::default()
        }
    }

    #[test]
    fn approver_threshold() {
        assert_eq!(approver_for(Decimal::from(50_000)).id, "MM-001");
        assert_eq!(approver_for(Decimal::from(50_001)).id, "MGR-001");
    }

    #[tokio::test]
    async fn record_assigns_approver_and_history() {
        let service = service();
        let small = service.record(payload(1_500), "Clerk").await.unwrap();
        let large = service.record(payload(75_000), "Clerk").await.unwrap();

        assert_eq!(small.current_approver, "MM-001");
        assert_eq!(small.auto_assigned_approver.as_deref(), Some("Juan Dela Cruz"));
        assert_eq!(large.current_approver, "MGR-001");
        assert_eq!(small.approval_history.len(), 1);
        assert_eq!(small.approval_history[0].action, "Submitted");

        // Mais recente primeiro
        let listed = service.list(None).await.unwrap();
        assert_eq!(listed[0].id, large.id);
    }

    #[tokio::test]
    async fn record_validates_required_fields_and_currency() {
        let service = service();

        let err = service.record(CreateExpensePayload::default(), "Clerk").await.unwrap_err();
        assert!(matches!(err, AppError::MissingFields(f) if f.len() == 4));

        let mut foreign = payload(100);
        foreign.currency = Some("USD".into());
        assert!(matches!(service.record(foreign, "Clerk").await, Err(AppError::InvalidInput(_))));

        let mut zero = payload(0);
        zero.currency = None;
        assert!(matches!(service.record(zero, "Clerk").await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn full_payment_flow_marks_expense_paid() {
        let service = service();
        let expense = service.record(payload(12_000), "Clerk").await.unwrap();

        let early = service.generate_check_request(&expense.id, "Clerk").await;
        assert!(matches!(early, Err(AppError::InvalidTransition { .. })));

        service.mark_under_review(&expense.id, "Need quotation", "Market Master").await.unwrap();
        service.approve(&expense.id, "", "Market Master").await.unwrap();
        let ready = service.generate_check_request(&expense.id, "Clerk").await.unwrap();
        assert_eq!(ready.payment_status, ExpensePaymentStatus::ReadyForPayment);
        assert!(ready.check_request_id.is_some());

        let released = service.authorize_release(&expense.id, "Executive").await.unwrap();
        assert_eq!(released.request.status, CheckRequestStatus::Released);
        assert_eq!(released.release.check_no, "000123");
        assert_eq!(released.release.payee, "SUP-01");

        let paid = service.get(&expense.id).await.unwrap();
        assert_eq!(paid.payment_status, ExpensePaymentStatus::Paid);
        assert!(paid.check_release_date.is_some());
        let actions: Vec<&str> = paid.approval_history.iter().map(|h| h.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["Submitted", "Marked for Review", "Approved", "Check Requested", "Check Released"]
        );
    }

    #[tokio::test]
    async fn rejection_needs_reason_and_closes_expense() {
        let service = service();
        let expense = service.record(payload(900), "Clerk").await.unwrap();

        assert!(service.reject(&expense.id, "  ", "Market Master").await.is_err());
        let rejected = service.reject(&expense.id, "No receipt", "Market Master").await.unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("No receipt"));

        let again = service.approve(&expense.id, "", "Market Master").await;
        assert!(matches!(again, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn delete_requires_reason() {
        let service = service();
        let expense = service.record(payload(900), "Clerk").await.unwrap();

        assert!(service.delete(&expense.id, "", "Admin").await.is_err());
        service.delete(&expense.id, "Duplicate entry", "Admin").await.unwrap();
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
