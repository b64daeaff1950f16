// src/services/tenant_service.rs

use validator::Validate;

use crate::{
    common::error::AppError,
    db::{RecordRepository, Store},
    models::tenant::{Tenant, TenantStatus, UpdateTenantPayload},
};

/// Inquilinos só nascem na aprovação de um contrato; aqui ficam consulta e edição.
#[derive(Clone)]
pub struct TenantService {
    store: Store,
    tenants: RecordRepository<Tenant>,
}

impl TenantService {
    pub fn new(store: Store) -> Self {
        Self {
            tenants: RecordRepository::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, status: Option<TenantStatus>) -> Result<Vec<Tenant>, AppError> {
        let tenants = self.tenants.list().await?;
        Ok(match status {
            Some(wanted) => tenants.into_iter().filter(|t| t.status == wanted).collect(),
            None => tenants,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Tenant, AppError> {
        self.tenants.get(id).await
    }

    pub async fn update(&self, id: &str, payload: UpdateTenantPayload) -> Result<Tenant, AppError> {
        payload.validate()?;

        let mut tx = self.store.begin().await;
        let tenant = self
            .tenants
            .update(&mut tx, id, |tenant| {
                if let Some(name) = payload.name {
                    tenant.name = name.trim().to_string();
                }
                if let Some(business) = payload.business {
                    tenant.business = business;
                }
                if let Some(contact) = payload.contact {
                    tenant.contact = contact;
                }
                if let Some(email) = payload.email {
                    tenant.email = email;
                }
                if let Some(address) = payload.address {
                    tenant.address = address;
                }
                if let Some(terms) = payload.payment_terms {
                    tenant.payment_terms = terms;
                }
                if let Some(status) = payload.status {
                    tenant.status = status;
                }
                Ok(())
            })
            .await?;
        tx.commit().await?;
        Ok(tenant)
    }

    /// Exclusão lógica: contratos e pagamentos continuam apontando para o inquilino.
    pub async fn deactivate(&self, id: &str) -> Result<Tenant, AppError> {
        let mut tx = self.store.begin().await;
        let tenant = self
            .tenants
            .update(&mut tx, id, |tenant| {
                tenant.status = TenantStatus::Inactive;
                Ok(())
            })
            .await?;
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, "Inquilino desativado");
        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collection;

    async fn seeded() -> TenantService {
        let store = Store::in_memory();
        let tenant: Tenant = serde_json::from_value(serde_json::json!({
            "id": "TEN-2025-042",
            "name": "Ana Cruz",
            "stallId": "ST-010",
            "monthlyRate": "5000",
        }))
        .unwrap();
        store.save(Collection::Tenants, &[tenant]).await.unwrap();
        TenantService::new(store)
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let service = seeded().await;
        let updated = service
            .update(
                "TEN-2025-042",
                UpdateTenantPayload {
                    contact: Some("0917-000-0000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana Cruz");
        assert_eq!(updated.contact, "0917-000-0000");
        assert_eq!(updated.stall_id, "ST-010");
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let service = seeded().await;
        let err = service
            .update(
                "TEN-2025-042",
                UpdateTenantPayload {
                    email: Some("not-an-email".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn blank_email_from_the_form_is_ignored() {
        let service = seeded().await;
        let payload: UpdateTenantPayload =
            serde_json::from_value(serde_json::json!({ "email": "", "business": "Cruz Rice" })).unwrap();

        let updated = service.update("TEN-2025-042", payload).await.unwrap();
        assert_eq!(updated.business, "Cruz Rice");
        assert_eq!(updated.email, "");
    }

    #[tokio::test]
    async fn delete_marks_inactive() {
        let service = seeded().await;
        service.deactivate("TEN-2025-042").await.unwrap();

        let active = service.list(Some(TenantStatus::Active)).await.unwrap();
        let all = service.list(None).await.unwrap();
        assert!(active.is_empty());
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, TenantStatus::Inactive);
    }
}
