// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::update_user,
        handlers::auth::delete_user,

        // --- Stalls ---
        handlers::stalls::list_stalls,
        handlers::stalls::list_available,
        handlers::stalls::get_stall,
        handlers::stalls::create_stall,
        handlers::stalls::update_stall,
        handlers::stalls::delete_stall,

        // --- Leases ---
        handlers::leases::list_leases,
        handlers::leases::list_requests,
        handlers::leases::list_approved,
        handlers::leases::list_renewable,
        handlers::leases::get_lease,
        handlers::leases::submit_lease,
        handlers::leases::approve_lease,
        handlers::leases::reject_lease,
        handlers::leases::renew_lease,

        // --- Tenants ---
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::delete_tenant,

        // --- Expenses ---
        handlers::expenses::list_expenses,
        handlers::expenses::get_expense,
        handlers::expenses::create_expense,
        handlers::expenses::approve_expense,
        handlers::expenses::reject_expense,
        handlers::expenses::review_expense,
        handlers::expenses::generate_check_request,
        handlers::expenses::authorize_release,
        handlers::expenses::delete_expense,

        // --- Checks ---
        handlers::checks::list_requests,
        handlers::checks::list_releases,
        handlers::checks::create_request,
        handlers::checks::approve_request,
        handlers::checks::reject_request,
        handlers::checks::release_request,
        handlers::checks::delete_request,

        // --- Inventory ---
        handlers::inventory::list_items,
        handlers::inventory::get_summary,
        handlers::inventory::create_item,
        handlers::inventory::adjust_stock,
        handlers::inventory::list_adjustments,
        handlers::inventory::delete_adjustment,
        handlers::inventory::list_purchase_orders,
        handlers::inventory::create_purchase_order,
        handlers::inventory::receive_purchase_order,
        handlers::inventory::cancel_purchase_order,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::get_payment,
        handlers::payments::record_payment,
        handlers::payments::record_bulk,
        handlers::payments::daily_breakdown,
        handlers::payments::delete_payment,

        // --- Collectors ---
        handlers::payments::list_collectors,
        handlers::payments::assign_collector,

        // --- Documents ---
        handlers::documents::validate_upload,
        handlers::documents::capture_photo,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserStatus,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Stalls ---
            models::stall::StallStatus,
            models::stall::ElectricityType,
            models::stall::WaterType,
            models::stall::StallStructure,
            models::stall::StallUtilities,
            models::stall::Stall,
            models::stall::StallPayload,

            // --- Leases ---
            models::lease::LeaseStatus,
            models::lease::TenantInfo,
            models::lease::RenewalEntry,
            models::lease::RateTrend,
            models::lease::LeaseRequest,
            models::lease::SubmitLeasePayload,
            models::lease::ApproveLeasePayload,
            models::lease::RejectLeasePayload,
            models::lease::RenewLeasePayload,
            models::lease::ApprovedLease,
            models::document::DocumentFile,
            models::document::LeaseDocuments,

            // --- Tenants ---
            models::tenant::TenantStatus,
            models::tenant::Tenant,
            models::tenant::UpdateTenantPayload,

            // --- Finance ---
            models::finance::ExpenseStatus,
            models::finance::ExpensePaymentStatus,
            models::finance::ApprovalHistoryEntry,
            models::finance::Expense,
            models::finance::CreateExpensePayload,
            models::finance::ExpenseDecisionPayload,
            models::finance::ReasonPayload,
            models::finance::CheckRequestStatus,
            models::finance::CheckRequest,
            models::finance::CheckRelease,
            models::finance::CreateCheckRequestPayload,
            models::finance::ReleasedCheck,

            // --- Inventory ---
            models::inventory::InventoryItem,
            models::inventory::StockStatus,
            models::inventory::AdjustmentType,
            models::inventory::InventoryAdjustment,
            models::inventory::CreateInventoryItemPayload,
            models::inventory::AdjustInventoryPayload,
            models::inventory::InventoryItemView,
            models::inventory::InventorySummary,
            models::inventory::PurchaseOrderStatus,
            models::inventory::PurchaseOrderLine,
            models::inventory::PurchaseOrder,
            models::inventory::PurchaseOrderLinePayload,
            models::inventory::CreatePurchaseOrderPayload,

            // --- Payments ---
            models::payment::PaymentCategory,
            models::payment::PaymentType,
            models::payment::ReceiptType,
            models::payment::PaymentBreakdown,
            models::payment::Payment,
            models::payment::RecordPaymentPayload,
            models::payment::ManualPaymentEntry,
            models::payment::BulkPaymentPayload,
            models::payment::DailyBreakdown,
            models::payment::Collector,
            models::payment::AssignCollectorPayload,

            // --- Audit ---
            models::audit::DeletionRecord,

            // --- Documents ---
            handlers::documents::CapturePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Registro e emissão de token"),
        (name = "Users", description = "Usuários administrativos"),
        (name = "Stalls", description = "Cadastro de bancas"),
        (name = "Leases", description = "Solicitação, aprovação, rejeição e renovação de contratos"),
        (name = "Tenants", description = "Inquilinos criados na aprovação"),
        (name = "Expenses", description = "Despesas e fluxo de aprovação"),
        (name = "Checks", description = "Pedidos e liberação de cheques"),
        (name = "Inventory", description = "Estoque, ajustes e pedidos de compra"),
        (name = "Payments", description = "Cobranças e recibos"),
        (name = "Collectors", description = "Cobradores e suas áreas"),
        (name = "Documents", description = "Validação de anexos e captura de fotos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
