pub mod audit;
pub mod auth;
pub mod document;
pub mod finance;
pub mod inventory;
pub mod lease;
pub mod payment;
pub mod stall;
pub mod tenant;

#[cfg(test)]
mod tests {
    use serde::{de::DeserializeOwned, Serialize};
    use serde_json::{json, Value};
    use std::fmt::Debug;

    use super::{
        audit::DeletionRecord,
        auth::User,
        finance::{CheckRelease, CheckRequest, Expense},
        inventory::{InventoryAdjustment, InventoryItem, PurchaseOrder},
        lease::LeaseRequest,
        payment::{Collector, Payment},
        stall::Stall,
        tenant::Tenant,
    };
    use crate::db::{Collection, FileStore, Store};

    // Grava em disco, reabre e relê: todo registro volta idêntico
    async fn assert_round_trip<T>(collection: Collection, raw: Vec<Value>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned + PartialEq + Debug,
    {
        let records: Vec<T> = raw
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap())
            .collect();

        let dir = tempfile::tempdir().unwrap();
        Store::new(FileStore::open(dir.path()).await.unwrap())
            .save(collection, &records)
            .await
            .unwrap();

        let reopened = Store::new(FileStore::open(dir.path()).await.unwrap());
        let loaded: Vec<T> = reopened.load(collection).await.unwrap();
        assert_eq!(loaded, records);
        loaded
    }

    #[tokio::test]
    async fn stalls_survive_storage() {
        let stalls: Vec<Stall> = assert_round_trip(Collection::Stalls, vec![
            json!({
                "id": "ST-001", "type": "Food", "section": "Center", "location": "C1",
                "dimensions": "2x3m", "capacity": 2, "status": "Occupied", "leaseId": "LEASE-2025-AB12",
                "originalOwner": "Ana Cruz", "recentOwner": "Ben Cruz",
                "hasElectricity": true, "electricityType": "Metered", "hasWater": true, "waterType": "Dedicated",
                "hasDrainage": true, "stallStructure": "Non-Fixed",
                "x": 20.5, "y": -15.25, "w": 3, "h": 4,
                "dateAdded": "2025-01-10T08:00:00Z", "lastUpdated": "2025-02-01T09:30:00Z",
            }),
            json!({ "id": "ST-002", "status": "Under Maintenance", "hasVentilation": true }),
        ])
        .await;
        assert!(stalls[0].utilities.has_drainage);
    }

    #[tokio::test]
    async fn lease_requests_keep_documents_and_renewals() {
        let id_photo = json!({
            "fileName": "id.jpg", "fileType": "image/jpeg", "fileSize": 1024,
            "uploadDate": "2025-01-02T10:00:00Z", "content": "data:image/jpeg;base64,/9j/4AAQ",
        });
        let leases: Vec<LeaseRequest> = assert_round_trip(Collection::LeaseRequests, vec![
            json!({
                "id": "LEASE-2025-AB12", "status": "Active", "stallId": "ST-001",
                "tenantInfo": { "name": "Ana Cruz", "business": "Cruz Rice", "contact": "0917", "email": "ana@x.ph", "address": "Tondo" },
                "tenantId": "TEN-2025-042",
                "leaseStart": "2025-01-01", "leaseEnd": "2026-01-01",
                "monthlyRate": 5500.5, "securityDeposit": 10000, "paymentTerms": "Quarterly", "remarks": "Corner stall",
                "documents": {
                    "validId": id_photo,
                    "businessPermit": { "fileName": "permit.pdf", "fileType": "application/pdf", "fileSize": 2048, "content": "data:application/pdf;base64,JVBERi0=" },
                },
                "renewalHistory": [
                    { "date": "2025-06-01T00:00:00Z", "previousEnd": "2025-12-31", "newStart": "2026-01-01", "newEnd": "2026-12-31", "rateChange": 500 },
                    { "date": "2026-06-01T00:00:00Z", "previousEnd": "2026-12-31", "newStart": "2027-01-01", "newEnd": "2027-12-31", "rateChange": -250.25 },
                ],
                "paymentStatus": "Paid", "balance": 0, "createdBy": "Admin",
                "dateCreated": "2024-12-20T08:00:00Z",
                "approvedBy": "Maria Santos", "approvedDate": "2024-12-21T08:00:00Z",
                "renewedAt": "2026-06-01T00:00:00Z",
            }),
            json!({
                "id": "LEASE-2025-CD34", "status": "Rejected", "stallId": "ST-002",
                "rejectionReason": "Incomplete documents", "rejectedBy": "Maria Santos",
                "rejectedDate": "2025-01-05T08:00:00Z",
            }),
        ])
        .await;
        assert_eq!(leases[0].renewal_history.len(), 2);
        assert!(leases[0].documents.business_permit.is_some());
    }

    #[tokio::test]
    async fn tenants_survive_storage() {
        assert_round_trip::<Tenant>(Collection::Tenants, vec![
            json!({
                "id": "TEN-2025-042", "name": "Ana Cruz", "business": "Cruz Rice", "contact": "0917",
                "email": "ana@x.ph", "address": "Tondo", "status": "Overdue", "stallId": "ST-001",
                "leaseId": "LEASE-2025-AB12", "leaseStart": "2025-01-01", "leaseEnd": "2026-01-01",
                "monthlyRate": 5500.5, "paymentTerms": "Monthly",
                "documents": { "validId": { "fileName": "id.jpg", "fileType": "image/jpeg", "content": "data:image/jpeg;base64,/9j/" } },
                "dateRegistered": "2025-01-01T08:00:00Z",
            }),
            json!({ "id": "TEN-2025-007", "name": "Pedro Reyes" }),
        ])
        .await;
    }

    #[tokio::test]
    async fn payments_survive_storage() {
        assert_round_trip::<Payment>(Collection::Payments, vec![
            json!({
                "id": "PAY-1", "receiptNumber": "OR-00012", "receiptType": "OR",
                "tenantId": "TEN-2025-042", "tenantName": "Ana Cruz", "stallId": "ST-001", "stallName": "ST-001 - C1",
                "paymentType": "electricity", "paymentTypeLabel": "Electricity Bill",
                "date": "2025-03-01T10:15:00Z", "amount": 1250.75,
                "breakdown": { "electric": 1000.75, "water": 0, "rent": 0, "rights": 0, "others": 250 },
                "method": "GCash", "collectorId": "C-002", "collectorName": "Maria Santos",
                "status": "completed", "category": "tenant", "isManual": false,
            }),
            json!({
                "id": "PAY-2", "receiptNumber": "MANUAL", "receiptType": "MANUAL", "paymentType": "special_event",
                "amount": 300, "category": "event", "isManual": true,
            }),
        ])
        .await;
    }

    #[tokio::test]
    async fn expenses_keep_history_and_receipt() {
        let expenses: Vec<Expense> = assert_round_trip(Collection::Expenses, vec![
            json!({
                "id": "EXP-1", "expenseDate": "2025-02-14", "expenseCategory": "Utilities",
                "expenseAmount": 15000.25, "expenseDescription": "Meralco bill", "paymentMethod": "Check",
                "chargedTo": "Operations", "supplierId": "SUP-9", "projectCode": "P-1", "priority": "High",
                "currency": "USD", "exchangeRate": 56.5, "dueDate": "2025-03-01",
                "approvalStatus": "Approved", "paymentStatus": "Ready for Payment",
                "currentApprover": "Maria Santos", "autoAssignedApprover": "Maria Santos", "submittedBy": "Clerk",
                "approvalHistory": [
                    { "action": "Submitted", "status": "Pending", "timestamp": "2025-02-14T08:00:00Z", "user": "Clerk", "note": "" },
                    { "action": "Approved", "status": "Approved", "timestamp": "2025-02-15T08:00:00Z", "user": "Maria Santos", "note": "OK" },
                ],
                "approvedBy": "Maria Santos", "checkRequestId": "CHK-3", "checkRequestDate": "2025-02-16",
                "receipt": { "fileName": "bill.png", "fileType": "image/png", "fileSize": 10, "content": "data:image/png;base64,iVBORw0K" },
                "createdAt": "2025-02-14T08:00:00Z",
            }),
            json!({ "id": "EXP-2", "approvalStatus": "Under Review", "rejectionReason": "Missing receipt" }),
        ])
        .await;
        assert_eq!(expenses[0].approval_history.len(), 2);
        assert!(expenses[0].receipt.is_some());
    }

    #[tokio::test]
    async fn check_requests_and_releases_survive_storage() {
        assert_round_trip::<CheckRequest>(Collection::CheckRequests, vec![
            json!({
                "id": "CHK-1", "date": "2025-02-16", "payee": "Meralco", "amount": 15000.25,
                "purpose": "Electric bill", "status": "Released", "expenseId": "EXP-1", "decidedBy": "Maria Santos",
            }),
            json!({ "id": "CHK-2", "status": "Rejected", "rejectionReason": "Duplicate" }),
        ])
        .await;
        assert_round_trip::<CheckRelease>(Collection::CheckReleases, vec![
            json!({
                "id": "REL-1", "requestId": "CHK-1", "releaseDate": "2025-02-20", "checkNo": "000123",
                "payee": "Meralco", "releasedBy": "Juan Dela Cruz", "amount": 15000.25,
            }),
            json!({ "id": "REL-2", "requestId": "CHK-9", "checkNo": "000124" }),
        ])
        .await;
    }

    #[tokio::test]
    async fn inventory_records_survive_storage() {
        assert_round_trip::<InventoryItem>(Collection::Inventory, vec![
            json!({ "id": "ITEM-001", "name": "Rice (25kg)", "qty": 200, "unitPrice": 45.5, "minStock": 50 }),
            json!({ "id": "ITEM-002", "name": "Salt", "qty": 0, "unitPrice": 12, "minStock": 10 }),
        ])
        .await;
        assert_round_trip::<InventoryAdjustment>(Collection::InventoryAdjustments, vec![
            json!({
                "id": "ADJ-1", "itemId": "ITEM-001", "itemName": "Rice (25kg)", "previousQty": 200, "newQty": 195,
                "adjustment": -5, "reason": "Sold", "date": "2025-03-01T08:00:00Z", "type": "subtract", "adjustedBy": "Clerk",
            }),
            json!({ "id": "ADJ-2", "itemId": "ITEM-002", "adjustment": 10, "type": "add" }),
        ])
        .await;
        assert_round_trip::<PurchaseOrder>(Collection::PurchaseOrders, vec![
            json!({
                "id": "PO-0002", "vendor": "Manila Rice Traders", "date": "2025-03-01",
                "items": [
                    { "itemId": "ITEM-001", "name": "Rice (25kg)", "qty": 10, "price": 40.5, "lineTotal": 405 },
                    { "itemId": "ITEM-050", "name": "Vinegar (1L)", "qty": 5, "price": 20, "lineTotal": 100 },
                ],
                "total": 505, "status": "Received",
                "createdAt": "2025-03-01T08:00:00Z", "receivedAt": "2025-03-03T08:00:00Z",
            }),
            json!({ "id": "PO-0001", "vendor": "Salt Co", "status": "Pending" }),
        ])
        .await;
    }

    #[tokio::test]
    async fn collectors_users_and_deletion_log_survive_storage() {
        assert_round_trip::<Collector>(Collection::Collectors, vec![
            json!({ "id": "C-001", "name": "Juan Dela Cruz", "area": "Stall Area A", "collectionType": "special" }),
            json!({ "id": "C-002", "name": "Maria Santos" }),
        ])
        .await;
        assert_round_trip::<User>(Collection::Users, vec![
            json!({
                "id": "3f2a9c0e-4b6d-4e1f-8a7b-5c3d2e1f0a9b", "username": "maria", "email": "maria@palengke.ph",
                "password_hash": "$2b$04$abcdefghijklmnopqrstuv", "first_name": "Maria", "last_name": "Santos",
                "phone": "0917", "role": "market_manager", "department": "Finance", "status": "inactive",
                "is_active": false, "is_staff": true,
                "last_login": "2025-03-01T08:00:00Z", "date_joined": "2025-01-01T08:00:00Z",
            }),
            json!({ "id": "6f1b7c2d-0000-4000-8000-000000000001", "username": "juan" }),
        ])
        .await;
        assert_round_trip::<DeletionRecord>(Collection::DeletionLog, vec![
            json!({
                "id": "DEL-1", "collection": "paymentHistory", "recordId": "PAY-1", "reason": "Wrong tenant",
                "deletedBy": "Admin", "deletedAt": "2025-03-02T08:00:00Z",
                "snapshot": { "id": "PAY-1", "amount": 1250.75, "breakdown": { "rent": 0 } },
            }),
            json!({ "id": "DEL-2", "collection": "stalls", "recordId": "ST-009", "snapshot": null }),
        ])
        .await;
    }
}
