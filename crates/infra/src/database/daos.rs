//! Per-entity upsert helpers
//!
//! Each DAO writes inside a caller-owned transaction so the record store can
//! commit or roll back a whole entity batch at once.

use fieldsync_domain::{Customer, EntityType, KycDocument, Lead, Quotation};
use rusqlite::{params, Connection, Transaction};

/// Upserts for one local table.
pub trait EntityDao {
    type Record;

    const TABLE: &'static str;

    /// Insert or update `records`, tagging rows with the page they came from.
    fn upsert_many(
        tx: &Transaction<'_>,
        records: &[Self::Record],
        page_number: u32,
    ) -> rusqlite::Result<usize>;
}

pub struct LeadDao;
pub struct CustomerDao;
pub struct KycDocumentDao;
pub struct QuotationDao;

impl EntityDao for LeadDao {
    type Record = Lead;

    const TABLE: &'static str = "leads";

    fn upsert_many(tx: &Transaction<'_>, records: &[Lead], page_number: u32) -> rusqlite::Result<usize> {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO leads (id, customer_name, phone, email, address, status, services,
                                assigned_to, priority, notes, created_at, updated_at,
                                sync_status, local_changes, page_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                customer_name = excluded.customer_name,
                phone = excluded.phone,
                email = excluded.email,
                address = excluded.address,
                status = excluded.status,
                services = excluded.services,
                assigned_to = excluded.assigned_to,
                priority = excluded.priority,
                notes = excluded.notes,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                sync_status = excluded.sync_status,
                local_changes = excluded.local_changes,
                page_number = excluded.page_number",
        )?;

        let mut written = 0;
        for lead in records {
            written += stmt.execute(params![
                lead.id,
                lead.customer_name,
                lead.phone,
                lead.email,
                lead.address,
                lead.status,
                to_json_text(&lead.services)?,
                lead.assigned_to,
                lead.priority,
                lead.notes,
                lead.created_at,
                lead.updated_at,
                lead.sync_status.as_str(),
                optional_json_text(lead.local_changes.as_ref())?,
                page_number,
            ])?;
        }
        Ok(written)
    }
}

impl EntityDao for CustomerDao {
    type Record = Customer;

    const TABLE: &'static str = "customers";

    fn upsert_many(
        tx: &Transaction<'_>,
        records: &[Customer],
        page_number: u32,
    ) -> rusqlite::Result<usize> {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO customers (id, name, phone, email, address, lead_id, kyc_status,
                                    created_at, updated_at, sync_status, local_changes, page_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                email = excluded.email,
                address = excluded.address,
                lead_id = excluded.lead_id,
                kyc_status = excluded.kyc_status,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                sync_status = excluded.sync_status,
                local_changes = excluded.local_changes,
                page_number = excluded.page_number",
        )?;

        let mut written = 0;
        for customer in records {
            written += stmt.execute(params![
                customer.id,
                customer.name,
                customer.phone,
                customer.email,
                customer.address,
                customer.lead_id,
                customer.kyc_status.as_str(),
                customer.created_at,
                customer.updated_at,
                customer.sync_status.as_str(),
                optional_json_text(customer.local_changes.as_ref())?,
                page_number,
            ])?;
        }
        Ok(written)
    }
}

impl EntityDao for KycDocumentDao {
    type Record = KycDocument;

    const TABLE: &'static str = "kyc_documents";

    /// `page_number` is the page of the owning customer.
    fn upsert_many(
        tx: &Transaction<'_>,
        records: &[KycDocument],
        page_number: u32,
    ) -> rusqlite::Result<usize> {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO kyc_documents (id, customer_id, document_type, status, file_url,
                                        uploaded_at, remarks, sync_status, local_changes, page_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                customer_id = excluded.customer_id,
                document_type = excluded.document_type,
                status = excluded.status,
                file_url = excluded.file_url,
                uploaded_at = excluded.uploaded_at,
                remarks = excluded.remarks,
                sync_status = excluded.sync_status,
                local_changes = excluded.local_changes,
                page_number = excluded.page_number",
        )?;

        let mut written = 0;
        for document in records {
            written += stmt.execute(params![
                document.id,
                document.customer_id,
                document.document_type,
                document.status,
                document.file_url,
                document.uploaded_at,
                document.remarks,
                document.sync_status.as_str(),
                optional_json_text(document.local_changes.as_ref())?,
                page_number,
            ])?;
        }
        Ok(written)
    }
}

impl EntityDao for QuotationDao {
    type Record = Quotation;

    const TABLE: &'static str = "quotations";

    fn upsert_many(
        tx: &Transaction<'_>,
        records: &[Quotation],
        page_number: u32,
    ) -> rusqlite::Result<usize> {
        let mut stmt = tx.prepare_cached(
            "INSERT INTO quotations (id, lead_id, customer_name, total_amount, status, valid_until,
                                     items, created_at, updated_at, sync_status, local_changes,
                                     page_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                lead_id = excluded.lead_id,
                customer_name = excluded.customer_name,
                total_amount = excluded.total_amount,
                status = excluded.status,
                valid_until = excluded.valid_until,
                items = excluded.items,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                sync_status = excluded.sync_status,
                local_changes = excluded.local_changes,
                page_number = excluded.page_number",
        )?;

        let mut written = 0;
        for quotation in records {
            written += stmt.execute(params![
                quotation.id,
                quotation.lead_id,
                quotation.customer_name,
                quotation.total_amount,
                quotation.status,
                quotation.valid_until,
                optional_json_text(quotation.items.as_ref())?,
                quotation.created_at,
                quotation.updated_at,
                quotation.sync_status.as_str(),
                optional_json_text(quotation.local_changes.as_ref())?,
                page_number,
            ])?;
        }
        Ok(written)
    }
}

/// Local table backing an entity.
pub fn table_for(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Leads => LeadDao::TABLE,
        EntityType::Customers => CustomerDao::TABLE,
        EntityType::KycDocuments => KycDocumentDao::TABLE,
        EntityType::Quotations => QuotationDao::TABLE,
    }
}

/// Number of cached rows for an entity.
pub fn count_rows(conn: &Connection, entity: EntityType) -> rusqlite::Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table_for(entity));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

fn to_json_text<T: serde::Serialize + ?Sized>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn optional_json_text(value: Option<&serde_json::Value>) -> rusqlite::Result<Option<String>> {
    value.map(to_json_text).transpose()
}
