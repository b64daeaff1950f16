// src/db/lease_repo.rs

use crate::{
    common::error::AppError,
    db::record_store::{Collection, Store, Transaction},
    models::lease::{LeaseRequest, LeaseStatus},
};

// O repositório de contratos. É o único lugar que conhece as três coleções
// espelhadas (`leases`, `leaseRequests`, `approvedLeases`) e as mantém em sincronia.
#[derive(Clone)]
pub struct LeaseRepository {
    store: Store,
}

impl LeaseRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Todos os contratos (`leases` é a visão completa).
    pub async fn list(&self) -> Result<Vec<LeaseRequest>, AppError> {
        self.store.load(Collection::Leases).await
    }

    pub async fn list_requests(&self) -> Result<Vec<LeaseRequest>, AppError> {
        self.store.load(Collection::LeaseRequests).await
    }

    pub async fn list_approved(&self) -> Result<Vec<LeaseRequest>, AppError> {
        self.store.load(Collection::ApprovedLeases).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<LeaseRequest>, AppError> {
        Ok(self.list().await?.into_iter().find(|l| l.id == id))
    }

    pub async fn list_in(&self, tx: &mut Transaction) -> Result<Vec<LeaseRequest>, AppError> {
        tx.load(Collection::Leases).await
    }

    /// Solicitação como vista pelo fluxo de aprovação; cai para `leases` se só existir lá.
    pub async fn find_request_in(&self, tx: &mut Transaction, id: &str) -> Result<LeaseRequest, AppError> {
        let requests: Vec<LeaseRequest> = tx.load(Collection::LeaseRequests).await?;
        if let Some(found) = requests.into_iter().find(|l| l.id == id) {
            return Ok(found);
        }
        self.find_in(tx, id).await
    }

    pub async fn find_in(&self, tx: &mut Transaction, id: &str) -> Result<LeaseRequest, AppError> {
        self.list_in(tx)
            .await?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Lease {} not found", id)))
    }

    /// Nova solicitação: entra em `leaseRequests` e em `leases`.
    pub async fn insert(&self, tx: &mut Transaction, lease: &LeaseRequest) -> Result<(), AppError> {
        let mut requests: Vec<LeaseRequest> = tx.load(Collection::LeaseRequests).await?;
        let mut leases = self.list_in(tx).await?;
        if leases.iter().chain(requests.iter()).any(|l| l.id == lease.id) {
            return Err(AppError::Conflict(format!("Lease {} already exists", lease.id)));
        }

        requests.push(lease.clone());
        leases.push(lease.clone());
        tx.stage(Collection::LeaseRequests, &requests)?;
        tx.stage(Collection::Leases, &leases)?;
        Ok(())
    }

    /// Aprovação: a solicitação fica `Approved`, uma cópia vai para `approvedLeases`
    /// e `leases` passa a refletir o contrato como `Active`.
    pub async fn record_approval(&self, tx: &mut Transaction, approved: &LeaseRequest) -> Result<LeaseRequest, AppError> {
        self.upsert(tx, Collection::LeaseRequests, approved.clone()).await?;

        let mut history: Vec<LeaseRequest> = tx.load(Collection::ApprovedLeases).await?;
        history.push(approved.clone());
        tx.stage(Collection::ApprovedLeases, &history)?;

        let mut active = approved.clone();
        active.status = LeaseStatus::Active;
        self.upsert(tx, Collection::Leases, active.clone()).await?;
        Ok(active)
    }

    /// Rejeição gravada na solicitação e espelhada em `leases`.
    pub async fn record_rejection(&self, tx: &mut Transaction, rejected: &LeaseRequest) -> Result<(), AppError> {
        self.upsert(tx, Collection::LeaseRequests, rejected.clone()).await?;
        self.upsert(tx, Collection::Leases, rejected.clone()).await
    }

    /// Renovação: `leases` recebe o registro inteiro; em `leaseRequests` só datas,
    /// valor e observações mudam, e só se a solicitação existir lá.
    pub async fn record_renewal(&self, tx: &mut Transaction, renewed: &LeaseRequest, request_remarks: String) -> Result<(), AppError> {
        self.upsert(tx, Collection::Leases, renewed.clone()).await?;

        let mut requests: Vec<LeaseRequest> = tx.load(Collection::LeaseRequests).await?;
        if let Some(request) = requests.iter_mut().find(|l| l.id == renewed.id) {
            request.lease_start = renewed.lease_start;
            request.lease_end = renewed.lease_end;
            request.monthly_rate = renewed.monthly_rate;
            request.remarks = request_remarks;
            tx.stage(Collection::LeaseRequests, &requests)?;
        }
        Ok(())
    }

    async fn upsert(&self, tx: &mut Transaction, collection: Collection, lease: LeaseRequest) -> Result<(), AppError> {
        let mut all: Vec<LeaseRequest> = tx.load(collection).await?;
        match all.iter_mut().find(|l| l.id == lease.id) {
            Some(existing) => *existing = lease,
            None => all.push(lease),
        }
        tx.stage(collection, &all)
    }
}
