use std::fmt;

use crate::event_sourcing::store::{
    EventData, ExpectedVersion, StoreClient, StoreError, WriteResult,
};

// ============================================================================
// Write Planner
// ============================================================================
//
// Prepared → SingleWrite          → Committed | Conflict
// Prepared → TransactionalWrite   → Committed | Conflict
//
// Batches smaller than `write_page_size` go out as one append. Larger ones
// open a transaction, write consecutive pages of at most `write_page_size`
// and commit. The expected version is checked exactly once either way: by
// the append, or by the commit.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    Single,
    Transaction,
}

impl WritePath {
    pub fn plan(event_count: usize, write_page_size: u64) -> Self {
        if (event_count as u64) < write_page_size {
            Self::Single
        } else {
            Self::Transaction
        }
    }

    /// Metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Transaction => "transaction",
        }
    }
}

impl fmt::Display for WritePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream version the aggregate was loaded at, as the store expects it.
pub fn expected_version_for(version: u64, pending: usize) -> ExpectedVersion {
    let pending = pending as u64;
    debug_assert!(
        pending <= version,
        "aggregate version {version} is lower than its {pending} uncommitted events"
    );

    match version.saturating_sub(pending) {
        0 => ExpectedVersion::NoStream,
        loaded => ExpectedVersion::Exact(loaded),
    }
}

pub(super) async fn write_events<C>(
    client: &C,
    stream: &str,
    expected: ExpectedVersion,
    events: Vec<EventData>,
    write_page_size: u64,
) -> Result<(WritePath, WriteResult), StoreError>
where
    C: StoreClient + ?Sized,
{
    let path = WritePath::plan(events.len(), write_page_size);

    let result = match path {
        WritePath::Single => client.append_to_stream(stream, expected, events).await?,
        WritePath::Transaction => {
            let page_size = write_page_size as usize;
            let mut transaction = client.start_transaction(stream, expected).await?;

            let mut remaining = events.into_iter();
            let mut page_number = 0u64;
            loop {
                let page: Vec<EventData> = remaining.by_ref().take(page_size).collect();
                if page.is_empty() {
                    break;
                }
                page_number += 1;
                tracing::debug!(
                    stream = %stream,
                    page = page_number,
                    event_count = page.len(),
                    "Writing transaction page"
                );
                transaction.write(page).await?;
            }

            transaction.commit().await?
        }
    };

    Ok((path, result))
}
