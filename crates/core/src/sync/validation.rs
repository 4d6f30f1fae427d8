//! Record validation and transformation
//!
//! Raw wire records are checked against the required fields of their entity
//! and turned into storage-ready records. A record that fails the check is
//! dropped and logged; the rest of its page is kept. Nothing here returns an
//! error.

use fieldsync_domain::constants::{
    CUSTOMER_REQUIRED_FIELDS, DEFAULT_LEAD_PRIORITY, KYC_DOCUMENT_REQUIRED_FIELDS,
    LEAD_REQUIRED_FIELDS, QUOTATION_REQUIRED_FIELDS,
};
use fieldsync_domain::{
    Customer, EntityType, KycDocument, KycStatus, Lead, Quotation, RawPage, RawRecord,
    SyncStatus, ValidatedPage,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Why a single record was dropped
type Rejection = Vec<&'static str>;

/// Required fields that are absent, `null`, blank strings or empty arrays.
pub fn missing_fields(raw: &RawRecord, required: &[&'static str]) -> Vec<&'static str> {
    required.iter().copied().filter(|field| is_missing(raw.get(*field))).collect()
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

pub fn validate_leads(page: &RawPage) -> ValidatedPage<Lead> {
    validate_page(page, LEAD_REQUIRED_FIELDS, to_lead)
}

pub fn validate_customers(page: &RawPage) -> ValidatedPage<Customer> {
    validate_page(page, CUSTOMER_REQUIRED_FIELDS, to_customer)
}

pub fn validate_documents(page: &RawPage) -> ValidatedPage<KycDocument> {
    validate_page(page, KYC_DOCUMENT_REQUIRED_FIELDS, to_document)
}

pub fn validate_quotations(page: &RawPage) -> ValidatedPage<Quotation> {
    validate_page(page, QUOTATION_REQUIRED_FIELDS, to_quotation)
}

/// Aggregate KYC status of a customer from its documents.
///
/// Any rejected document makes the customer rejected. Otherwise all approved
/// means approved, any documents at all means submitted, none means pending.
/// Document statuses compare case-insensitively.
pub fn derive_kyc_status(documents: &[KycDocument]) -> KycStatus {
    if documents.is_empty() {
        return KycStatus::Pending;
    }
    if documents.iter().any(|doc| doc.status.eq_ignore_ascii_case("rejected")) {
        return KycStatus::Rejected;
    }
    if documents.iter().all(|doc| doc.status.eq_ignore_ascii_case("approved")) {
        return KycStatus::Approved;
    }
    KycStatus::Submitted
}

fn validate_page<T>(
    page: &RawPage,
    required: &[&'static str],
    transform: fn(&RawRecord) -> Result<T, Rejection>,
) -> ValidatedPage<T> {
    let entity = page.entity;
    let mut records = Vec::with_capacity(page.items.len());

    for raw in &page.items {
        let missing = missing_fields(raw, required);
        let outcome = if missing.is_empty() { transform(raw) } else { Err(missing) };
        match outcome {
            Ok(record) => records.push(record),
            Err(fields) => log_rejection(entity, page.page_number, raw, &fields),
        }
    }

    let validated = ValidatedPage { page_number: page.page_number, records, total_count: page.items.len() };
    debug!(
        entity = %entity,
        page = page.page_number,
        valid = validated.valid_count(),
        total = validated.total_count,
        validation_rate = format!("{:.1}%", validated.validation_rate() * 100.0),
        "Validated page"
    );
    validated
}

fn log_rejection(entity: EntityType, page: u32, raw: &RawRecord, fields: &[&'static str]) {
    let id = optional_string(raw, "id").unwrap_or_else(|| "<none>".to_string());
    warn!(
        entity = %entity,
        page,
        id = %id,
        missing = ?fields,
        "Dropping record with missing or invalid fields"
    );
}

fn to_lead(raw: &RawRecord) -> Result<Lead, Rejection> {
    Ok(Lead {
        id: required_string(raw, "id")?,
        customer_name: required_string(raw, "customerName")?,
        phone: required_string(raw, "phone")?,
        email: optional_string(raw, "email"),
        address: required_string(raw, "address")?,
        status: required_string(raw, "status")?,
        services: string_list(raw, "services")?,
        assigned_to: required_string(raw, "assignedTo")?,
        priority: optional_string(raw, "priority")
            .unwrap_or_else(|| DEFAULT_LEAD_PRIORITY.to_string()),
        notes: optional_string(raw, "notes"),
        created_at: required_string(raw, "createdAt")?,
        updated_at: required_string(raw, "updatedAt")?,
        sync_status: SyncStatus::Synced,
        local_changes: None,
    })
}

fn to_customer(raw: &RawRecord) -> Result<Customer, Rejection> {
    Ok(Customer {
        id: required_string(raw, "id")?,
        name: required_string(raw, "name")?,
        phone: required_string(raw, "phone")?,
        email: optional_string(raw, "email"),
        address: optional_string(raw, "address"),
        lead_id: optional_string(raw, "leadId"),
        // Replaced by the derived status once documents are known
        kyc_status: KycStatus::Pending,
        created_at: required_string(raw, "createdAt")?,
        updated_at: required_string(raw, "updatedAt")?,
        sync_status: SyncStatus::Synced,
        local_changes: None,
    })
}

fn to_document(raw: &RawRecord) -> Result<KycDocument, Rejection> {
    Ok(KycDocument {
        id: required_string(raw, "id")?,
        customer_id: required_string(raw, "customerId")?,
        document_type: required_string(raw, "documentType")?,
        status: required_string(raw, "status")?,
        file_url: optional_string(raw, "fileUrl"),
        uploaded_at: optional_string(raw, "uploadedAt"),
        remarks: optional_string(raw, "remarks"),
        sync_status: SyncStatus::Synced,
        local_changes: None,
    })
}

fn to_quotation(raw: &RawRecord) -> Result<Quotation, Rejection> {
    Ok(Quotation {
        id: required_string(raw, "id")?,
        lead_id: required_string(raw, "leadId")?,
        customer_name: required_string(raw, "customerName")?,
        total_amount: amount(raw, "totalAmount")?,
        status: required_string(raw, "status")?,
        valid_until: optional_string(raw, "validUntil"),
        items: raw.get("items").filter(|v| !v.is_null()).cloned(),
        created_at: required_string(raw, "createdAt")?,
        updated_at: optional_string(raw, "updatedAt"),
        sync_status: SyncStatus::Synced,
        local_changes: None,
    })
}

/// Strings pass through; numbers and booleans are rendered. Objects and
/// arrays are not scalar.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn required_string(raw: &RawRecord, field: &'static str) -> Result<String, Rejection> {
    raw.get(field).and_then(scalar_string).ok_or_else(|| vec![field])
}

fn optional_string(raw: &RawRecord, field: &str) -> Option<String> {
    raw.get(field).and_then(scalar_string).filter(|s| !s.trim().is_empty())
}

/// Scalar entries of an array field. No usable entry counts as missing.
fn string_list(raw: &RawRecord, field: &'static str) -> Result<Vec<String>, Rejection> {
    let values: Vec<String> = match raw.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_string)
            .filter(|value| !value.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    };
    if values.is_empty() {
        Err(vec![field])
    } else {
        Ok(values)
    }
}

/// A JSON number or a numeric string.
fn amount(raw: &RawRecord, field: &'static str) -> Result<f64, Rejection> {
    let parsed = match raw.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|value| value.is_finite()).ok_or_else(|| vec![field])
}
