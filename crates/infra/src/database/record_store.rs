//! SQLite implementation of the record store
//!
//! One transaction per entity batch. A failing row rolls the whole batch back.

use std::sync::Arc;

use async_trait::async_trait;
use fieldsync_core::RecordStore;
use fieldsync_domain::{
    CustomerBundle, EntityBatch, EntityType, PersistSummary, Result as DomainResult,
    ValidatedPage,
};
use rusqlite::Transaction;
use tokio::task;
use tracing::{debug, info, instrument};

use super::daos::{self, CustomerDao, EntityDao, KycDocumentDao, LeadDao, QuotationDao};
use super::manager::{map_sql_error, DbManager};
use crate::errors::map_join_error;

/// [`RecordStore`] writing to the local SQLite cache
pub struct SqliteRecordStore {
    db: Arc<DbManager>,
}

impl SqliteRecordStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Number of cached rows for an entity.
    pub async fn count(&self, entity: EntityType) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            daos::count_rows(&conn, entity).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self, batch), fields(entity = %batch.entity()))]
    async fn persist_all(&self, batch: EntityBatch) -> DomainResult<PersistSummary> {
        let db = Arc::clone(&self.db);

        let summary = task::spawn_blocking(move || -> DomainResult<PersistSummary> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            let summary = write_batch(&tx, &batch).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;
            Ok(summary)
        })
        .await
        .map_err(map_join_error)??;

        info!(
            records = summary.records,
            documents = summary.documents,
            pages = summary.pages.len(),
            "batch committed"
        );
        Ok(summary)
    }
}

fn write_batch(tx: &Transaction<'_>, batch: &EntityBatch) -> rusqlite::Result<PersistSummary> {
    let mut summary = PersistSummary { pages: batch.page_numbers(), ..PersistSummary::default() };

    match batch {
        EntityBatch::Leads(pages) => {
            summary.records = write_pages::<LeadDao>(tx, pages)?;
        }
        EntityBatch::Quotations(pages) => {
            summary.records = write_pages::<QuotationDao>(tx, pages)?;
        }
        EntityBatch::Customers(pages) => {
            let (customers, documents) = write_customer_pages(tx, pages)?;
            summary.records = customers;
            summary.documents = documents;
        }
    }

    Ok(summary)
}

fn write_pages<D: EntityDao>(
    tx: &Transaction<'_>,
    pages: &[ValidatedPage<D::Record>],
) -> rusqlite::Result<usize> {
    let mut written = 0;
    for page in pages {
        written += D::upsert_many(tx, &page.records, page.page_number)?;
        debug!(table = D::TABLE, page = page.page_number, rows = page.records.len(), "page written");
    }
    Ok(written)
}

/// Customers of every page first, then their documents.
fn write_customer_pages(
    tx: &Transaction<'_>,
    pages: &[ValidatedPage<CustomerBundle>],
) -> rusqlite::Result<(usize, usize)> {
    let mut customers = 0;
    for page in pages {
        let rows: Vec<_> = page.records.iter().map(|bundle| bundle.customer.clone()).collect();
        customers += CustomerDao::upsert_many(tx, &rows, page.page_number)?;
    }

    let mut documents = 0;
    for page in pages {
        for bundle in &page.records {
            documents += KycDocumentDao::upsert_many(tx, &bundle.documents, page.page_number)?;
        }
    }

    Ok((customers, documents))
}
