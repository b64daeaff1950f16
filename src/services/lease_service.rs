// src/services/lease_service.rs

use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::{error::AppError, ids, lenient::parse_date},
    db::{LeaseRepository, RecordRepository, Store, Transaction},
    models::{
        lease::{
            ApproveLeasePayload, ApprovedLease, LeaseRequest, LeaseStatus, RenewLeasePayload,
            RenewalEntry, SubmitLeasePayload, TenantInfo,
        },
        stall::{Stall, StallStatus},
        tenant::{Tenant, TenantStatus},
    },
    services::document_service::DocumentService,
};

/// Ciclo de vida dos contratos: solicitação, aprovação, rejeição e renovação.
///
/// Cada operação roda numa única transação; os efeitos colaterais (inquilino criado,
/// espelhos do contrato, cache de status da banca) entram no mesmo lote.
#[derive(Clone)]
pub struct LeaseService {
    store: Store,
    leases: LeaseRepository,
    stalls: RecordRepository<Stall>,
    tenants: RecordRepository<Tenant>,
    documents: DocumentService,
}

impl LeaseService {
    pub fn new(store: Store, documents: DocumentService) -> Self {
        Self {
            leases: LeaseRepository::new(store.clone()),
            stalls: RecordRepository::new(store.clone()),
            tenants: RecordRepository::new(store.clone()),
            store,
            documents,
        }
    }

    pub async fn list_leases(&self) -> Result<Vec<LeaseRequest>, AppError> {
        self.leases.list().await
    }

    pub async fn list_requests(&self, status: Option<LeaseStatus>) -> Result<Vec<LeaseRequest>, AppError> {
        let requests = self.leases.list_requests().await?;
        Ok(match status {
            Some(wanted) => requests.into_iter().filter(|l| l.status == wanted).collect(),
            None => requests,
        })
    }

    pub async fn list_approved(&self) -> Result<Vec<LeaseRequest>, AppError> {
        self.leases.list_approved().await
    }

    /// Contratos que podem ser renovados (vigentes).
    pub async fn list_renewable(&self) -> Result<Vec<LeaseRequest>, AppError> {
        Ok(self
            .leases
            .list()
            .await?
            .into_iter()
            .filter(|l| l.status.is_in_force())
            .collect())
    }

    pub async fn get_lease(&self, id: &str) -> Result<LeaseRequest, AppError> {
        self.leases
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lease {} not found", id)))
    }

    pub async fn submit(&self, payload: SubmitLeasePayload, actor: &str) -> Result<LeaseRequest, AppError> {
        let mut missing = Vec::new();
        if payload.tenant_name.trim().is_empty() {
            missing.push("tenantName".to_string());
        }
        if payload.stall_id.trim().is_empty() {
            missing.push("stallId".to_string());
        }
        if payload.lease_start.trim().is_empty() {
            missing.push("leaseStart".to_string());
        }
        if payload.monthly_rate.is_none() {
            missing.push("monthlyRate".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
        payload.validate()?;

        let monthly_rate = payload.monthly_rate.unwrap_or_default();
        ensure_positive_rate(monthly_rate)?;

        let lease_start = required_date("leaseStart", &payload.lease_start)?;
        let lease_end = if payload.lease_end.trim().is_empty() {
            default_lease_end(lease_start)?
        } else {
            required_date("leaseEnd", &payload.lease_end)?
        };
        ensure_date_order(lease_start, lease_end)?;

        let documents = self.documents.validate_lease_documents(payload.documents)?;
        let stall_id = payload.stall_id.trim().to_string();
        let now = Utc::now();

        let mut tx = self.store.begin().await;
        self.ensure_stall_available(&mut tx, &stall_id, None).await?;

        let lease = LeaseRequest {
            id: ids::lease_id(now.year()),
            status: LeaseStatus::PendingApproval,
            stall_id,
            tenant_info: TenantInfo {
                name: payload.tenant_name.trim().to_string(),
                business: payload.tenant_business_name.trim().to_string(),
                contact: payload.tenant_contact.trim().to_string(),
                email: payload.tenant_email.unwrap_or_default().trim().to_string(),
                address: payload.tenant_address.trim().to_string(),
            },
            tenant_id: String::new(),
            lease_start: Some(lease_start),
            lease_end: Some(lease_end),
            monthly_rate,
            security_deposit: payload.security_deposit,
            payment_terms: payload.payment_terms.unwrap_or_else(|| "Monthly".to_string()),
            remarks: payload.remarks,
            documents,
            renewal_history: Vec::new(),
            payment_status: "Pending".to_string(),
            balance: monthly_rate,
            created_by: actor.to_string(),
            date_created: Some(now),
            approved_by: None,
            approved_date: None,
            rejection_reason: None,
            rejected_by: None,
            rejected_date: None,
            renewed_at: None,
        };

        self.leases.insert(&mut tx, &lease).await?;
        tx.commit().await?;

        tracing::info!(lease_id = %lease.id, stall_id = %lease.stall_id, "📝 Solicitação de locação registrada");
        Ok(lease)
    }

    pub async fn approve(&self, id: &str, payload: ApproveLeasePayload, actor: &str) -> Result<ApprovedLease, AppError> {
        let mut tx = self.store.begin().await;
        let mut lease = self.leases.find_request_in(&mut tx, id).await?;

        if lease.status != LeaseStatus::PendingApproval {
            return Err(transition_error(&lease, "approve"));
        }

        let documents = payload.documents.merged_over(&lease.documents);
        if documents.valid_id.is_none() {
            return Err(AppError::InvalidInput("Valid ID is required for approval.".into()));
        }
        let documents = self.documents.validate_lease_documents(documents)?;

        self.ensure_stall_available(&mut tx, &lease.stall_id, Some(&lease.id)).await?;

        let now = Utc::now();
        let tenant = self
            .tenants
            .create(
                &mut tx,
                Tenant {
                    id: String::new(),
                    name: lease.tenant_info.name.clone(),
                    business: lease.tenant_info.business.clone(),
                    contact: lease.tenant_info.contact.clone(),
                    email: lease.tenant_info.email.clone(),
                    address: lease.tenant_info.address.clone(),
                    status: TenantStatus::Active,
                    stall_id: lease.stall_id.clone(),
                    lease_id: lease.id.clone(),
                    lease_start: lease.lease_start,
                    lease_end: lease.lease_end,
                    monthly_rate: lease.monthly_rate,
                    payment_terms: lease.payment_terms.clone(),
                    documents: documents.clone(),
                    date_registered: Some(now),
                },
            )
            .await?;

        lease.status = LeaseStatus::Approved;
        lease.tenant_id = tenant.id.clone();
        lease.approved_by = Some(actor.to_string());
        lease.approved_date = Some(now);
        lease.documents = documents;
        self.leases.record_approval(&mut tx, &lease).await?;

        self.mark_stall_occupied(&mut tx, &lease, &tenant.name).await?;
        tx.commit().await?;

        tracing::info!(lease_id = %lease.id, tenant_id = %tenant.id, "✅ Locação aprovada");
        Ok(ApprovedLease { tenant, lease })
    }

    pub async fn reject(&self, id: &str, reason: &str, actor: &str) -> Result<LeaseRequest, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::InvalidInput("Please provide a reason for rejection.".into()));
        }

        let mut tx = self.store.begin().await;
        let mut lease = self.leases.find_request_in(&mut tx, id).await?;
        if lease.status != LeaseStatus::PendingApproval {
            return Err(transition_error(&lease, "reject"));
        }

        lease.status = LeaseStatus::Rejected;
        lease.rejection_reason = Some(reason.to_string());
        lease.rejected_by = Some(actor.to_string());
        lease.rejected_date = Some(Utc::now());

        self.leases.record_rejection(&mut tx, &lease).await?;
        tx.commit().await?;

        tracing::info!(lease_id = %lease.id, "Locação rejeitada");
        Ok(lease)
    }

    pub async fn renew(&self, id: &str, payload: RenewLeasePayload, actor: &str) -> Result<LeaseRequest, AppError> {
        let mut missing = Vec::new();
        if payload.lease_start.trim().is_empty() {
            missing.push("leaseStart".to_string());
        }
        if payload.lease_end.trim().is_empty() {
            missing.push("leaseEnd".to_string());
        }
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let new_start = required_date("leaseStart", &payload.lease_start)?;
        let new_end = required_date("leaseEnd", &payload.lease_end)?;
        ensure_date_order(new_start, new_end)?;

        let mut tx = self.store.begin().await;
        let mut lease = self.leases.find_in(&mut tx, id).await?;
        if !lease.status.is_in_force() {
            return Err(transition_error(&lease, "renew"));
        }

        let new_rate = payload.monthly_rate.unwrap_or(lease.monthly_rate);
        ensure_positive_rate(new_rate)?;

        let now = Utc::now();
        lease.renewal_history.push(RenewalEntry {
            date: Some(now),
            previous_end: lease.lease_end,
            new_start: Some(new_start),
            new_end: Some(new_end),
            rate_change: new_rate - lease.monthly_rate,
        });
        lease.lease_start = Some(new_start);
        lease.lease_end = Some(new_end);
        lease.monthly_rate = new_rate;
        lease.security_deposit = payload.security_deposit.or(lease.security_deposit);
        if let Some(terms) = payload.payment_terms.filter(|t| !t.trim().is_empty()) {
            lease.payment_terms = terms;
        }
        let remarks = payload.remarks.trim();
        if !remarks.is_empty() {
            lease.remarks = remarks.to_string();
        }
        lease.status = LeaseStatus::Active;
        lease.renewed_at = Some(now);

        let request_remarks = format!("Renewed on {}. {}", now.format("%Y-%m-%d"), remarks)
            .trim_end()
            .to_string();
        self.leases.record_renewal(&mut tx, &lease, request_remarks).await?;

        if !lease.tenant_id.is_empty() {
            let known = self.tenants.list_in(&mut tx).await?.iter().any(|t| t.id == lease.tenant_id);
            if known {
                self.tenants
                    .update(&mut tx, &lease.tenant_id, |tenant| {
                        tenant.lease_start = lease.lease_start;
                        tenant.lease_end = lease.lease_end;
                        tenant.monthly_rate = lease.monthly_rate;
                        tenant.payment_terms = lease.payment_terms.clone();
                        Ok(())
                    })
                    .await?;
            }
        }

        let owner = lease.tenant_info.name.clone();
        self.mark_stall_occupied(&mut tx, &lease, &owner).await?;
        tx.commit().await?;

        let trend = lease.renewal_history.last().map(RenewalEntry::trend);
        tracing::info!(lease_id = %lease.id, actor, ?trend, "🔁 Locação renovada");
        Ok(lease)
    }

    /// Recusa bancas inativas/em manutenção ou já cobertas por outro contrato ativo.
    /// Banca desconhecida é aceita: a referência não é obrigatória.
    async fn ensure_stall_available(&self, tx: &mut Transaction, stall_id: &str, ignoring: Option<&str>) -> Result<(), AppError> {
        let stalls = self.stalls.list_in(tx).await?;
        if let Some(stall) = stalls.iter().find(|s| s.id == stall_id) {
            if !stall.status.is_leasable() {
                return Err(AppError::Conflict(format!(
                    "Stall {} is not available for lease (status: {})",
                    stall_id,
                    stall.status.label()
                )));
            }
        }

        let leases = self.leases.list_in(tx).await?;
        let taken = leases
            .iter()
            .any(|l| l.occupies(stall_id) && Some(l.id.as_str()) != ignoring);
        if taken {
            return Err(AppError::Conflict(format!(
                "Stall {} is already covered by an active lease",
                stall_id
            )));
        }
        Ok(())
    }

    // Status da banca é só um cache do estado dos contratos, gravado no mesmo lote
    async fn mark_stall_occupied(&self, tx: &mut Transaction, lease: &LeaseRequest, owner: &str) -> Result<(), AppError> {
        let exists = self.stalls.list_in(tx).await?.iter().any(|s| s.id == lease.stall_id);
        if !exists {
            return Ok(());
        }

        self.stalls
            .update(tx, &lease.stall_id, |stall| {
                stall.status = StallStatus::Occupied;
                stall.lease_id = lease.id.clone();
                if !owner.is_empty() {
                    stall.recent_owner = owner.to_string();
                }
                stall.last_updated = Some(Utc::now());
                Ok(())
            })
            .await?;
        Ok(())
    }
}

fn transition_error(lease: &LeaseRequest, action: &'static str) -> AppError {
    AppError::InvalidTransition {
        entity: "lease",
        id: lease.id.clone(),
        status: lease.status.label().to_string(),
        action,
    }
}

fn required_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    parse_date(raw).ok_or_else(|| AppError::InvalidInput(format!("Invalid date for {}: {}", field, raw.trim())))
}

fn default_lease_end(start: NaiveDate) -> Result<NaiveDate, AppError> {
    start
        .checked_add_months(Months::new(12))
        .ok_or_else(|| AppError::InvalidInput("Lease start date is out of range.".into()))
}

fn ensure_date_order(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::InvalidInput("Lease end date cannot be before the start date.".into()));
    }
    Ok(())
}

fn ensure_positive_rate(rate: Decimal) -> Result<(), AppError> {
    if rate <= Decimal::ZERO {
        return Err(AppError::InvalidInput("Monthly rate must be a positive number.".into()));
    }
    Ok(())
}
