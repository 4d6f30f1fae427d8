//! Page-aware fetch loop

use fieldsync_domain::constants::MAX_PAGES_PER_ENTITY;
use fieldsync_domain::{EntityType, FieldSyncError, RawPage, SyncEvent, SyncProgress};
use tracing::{debug, info, warn};

use super::errors::EntitySyncError;
use super::ports::RemoteSource;
use super::progress::ProgressEmitter;

/// Number of pages needed to cover `total` records at `limit` per page.
///
/// A zero limit or an empty collection still counts as one page.
pub fn total_pages(total: u64, limit: u64) -> u32 {
    if limit == 0 || total == 0 {
        return 1;
    }
    u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX)
}

/// Zero-based offset of a 1-based page.
pub fn page_offset(page_number: u32, page_size: u32) -> u64 {
    u64::from(page_number.saturating_sub(1)) * u64::from(page_size)
}

/// Page size the server actually serves, as reported by page 1.
///
/// A missing, zero or out-of-range limit keeps the requested size.
fn served_page_size(limit: u64, requested: u32) -> u32 {
    u32::try_from(limit).ok().filter(|served| *served > 0).unwrap_or(requested)
}

/// Fetch page 1, derive the page count from its envelope, then fetch the
/// remaining pages one after another.
///
/// Pages after the first are requested with the page size the server
/// reported, so offsets line up with what it serves. A page count above
/// [`MAX_PAGES_PER_ENTITY`] is rejected before any further request. The
/// first failing page aborts the entity. A progress event follows every
/// fetched page.
pub async fn fetch_all_pages(
    source: &dyn RemoteSource,
    emitter: &ProgressEmitter,
    entity: EntityType,
    page_size: u32,
) -> Result<Vec<RawPage>, EntitySyncError> {
    let first = source.fetch_page(entity, 1, page_size).await.map_err(|err| EntitySyncError::PageFetch {
        entity,
        page: 1,
        total_pages: None,
        source: err,
    })?;

    let total_records = first.total;
    let pages_needed = total_pages(first.total, first.limit);
    if pages_needed > MAX_PAGES_PER_ENTITY {
        warn!(
            entity = %entity,
            total = total_records,
            limit = first.limit,
            pages = pages_needed,
            "Envelope reports an implausible page count; aborting entity"
        );
        return Err(EntitySyncError::PageFetch {
            entity,
            page: 1,
            total_pages: Some(pages_needed),
            source: FieldSyncError::Validation(format!(
                "{entity} reports {total_records} records at {} per page, \
                 {pages_needed} pages exceeds the limit of {MAX_PAGES_PER_ENTITY}",
                first.limit
            )),
        });
    }

    let page_size = served_page_size(first.limit, page_size);
    info!(entity = %entity, total = total_records, pages = pages_needed, page_size, "Fetching entity");

    let mut pages = Vec::new();
    let mut processed = first.items.len();
    pages.push(RawPage { entity, page_number: 1, items: first.items });
    emit_progress(emitter, entity, 1, pages_needed, processed, total_records);

    for page_number in 2..=pages_needed {
        let envelope = match source.fetch_page(entity, page_number, page_size).await {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(
                    entity = %entity,
                    page = page_number,
                    total_pages = pages_needed,
                    error = %err,
                    "Page fetch failed; aborting entity"
                );
                return Err(EntitySyncError::PageFetch {
                    entity,
                    page: page_number,
                    total_pages: Some(pages_needed),
                    source: err,
                });
            }
        };
        processed += envelope.items.len();
        debug!(entity = %entity, page = page_number, items = envelope.items.len(), "Fetched page");
        pages.push(RawPage { entity, page_number, items: envelope.items });
        emit_progress(emitter, entity, page_number, pages_needed, processed, total_records);
    }

    Ok(pages)
}

fn emit_progress(
    emitter: &ProgressEmitter,
    entity: EntityType,
    current_page: u32,
    total_pages: u32,
    processed_records: usize,
    total_records: u64,
) {
    emitter.emit(SyncEvent::Progress(SyncProgress {
        entity,
        current_page,
        total_pages,
        processed_records,
        total_records,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(47, 25), 2);
        assert_eq!(total_pages(50, 25), 2);
        assert_eq!(total_pages(51, 25), 3);
        assert_eq!(total_pages(5, 25), 1);
    }

    #[test]
    fn degenerate_envelopes_are_one_page() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(40, 0), 1);
    }

    #[test]
    fn offsets_are_zero_based() {
        assert_eq!(page_offset(1, 25), 0);
        assert_eq!(page_offset(2, 25), 25);
        assert_eq!(page_offset(0, 25), 0);
    }

    #[test]
    fn served_page_size_prefers_the_reported_limit() {
        assert_eq!(served_page_size(10, 25), 10);
        assert_eq!(served_page_size(25, 25), 25);
        assert_eq!(served_page_size(0, 25), 25);
        assert_eq!(served_page_size(u64::MAX, 25), 25);
    }
}
