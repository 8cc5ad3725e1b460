//! Forward-only cursor over a tiberius query stream

use crate::{MssqlError, row_to_values};
use async_trait::async_trait;
use futures::TryStreamExt;
use sproc_core::{
    AsyncCursor, CancellationToken, CursorSchema, ProcError, Result, ResultCursor, Value,
};
use tiberius::{QueryItem, QueryStream};

/// Which part of the response the stream is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    BeforeRows,
    Rows,
    Trailing,
    Finished,
}

/// Keeps the first result set of a response and counts the rows of any
/// later ones.
#[derive(Debug)]
pub(crate) struct ResultSetFilter {
    section: Section,
    discarded: usize,
}

impl ResultSetFilter {
    pub(crate) fn new() -> Self {
        Self {
            section: Section::BeforeRows,
            discarded: 0,
        }
    }

    pub(crate) fn section(&self) -> Section {
        self.section
    }

    #[cfg(test)]
    pub(crate) fn discarded(&self) -> usize {
        self.discarded
    }

    /// Whether this metadata opens the first result set
    pub(crate) fn on_metadata(&mut self) -> bool {
        if self.section == Section::BeforeRows {
            self.section = Section::Rows;
            true
        } else {
            self.section = Section::Trailing;
            false
        }
    }

    /// Whether the row belongs to the first result set
    pub(crate) fn on_row(&mut self) -> bool {
        if self.section == Section::Rows {
            return true;
        }
        self.discarded += 1;
        false
    }

    pub(crate) fn finish(&mut self) {
        if self.discarded > 0 {
            tracing::debug!(discarded = self.discarded, "discarded trailing result sets");
        }
        self.section = Section::Finished;
    }
}

/// Exposes the first result set of a procedure call as an [`AsyncCursor`].
///
/// Result sets after the first are read through and discarded, so the
/// cursor only reports its end once the whole response has been consumed
/// and the connection is free for the next request.
///
/// A row whose cells cannot be converted still counts as fetched; reading
/// any of its cells reports the conversion error. Only transport failures
/// fail the fetch itself, so the rest of the response can still be drained.
pub struct TiberiusCursor<'a> {
    stream: QueryStream<'a>,
    schema: CursorSchema,
    current: Option<std::result::Result<Vec<Value>, String>>,
    filter: ResultSetFilter,
}

impl<'a> TiberiusCursor<'a> {
    pub fn new(stream: QueryStream<'a>) -> Self {
        Self {
            stream,
            schema: CursorSchema::default(),
            current: None,
            filter: ResultSetFilter::new(),
        }
    }

    async fn next_item(&mut self, cancel: &CancellationToken) -> Result<Option<QueryItem>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProcError::Cancelled),
            item = self.stream.try_next() => item.map_err(|e| MssqlError::from(e).into()),
        }
    }
}

#[async_trait]
impl AsyncCursor for TiberiusCursor<'_> {
    async fn advance_async(&mut self, cancel: &CancellationToken) -> Result<bool> {
        self.current = None;
        loop {
            if self.filter.section() == Section::Finished {
                return Ok(false);
            }
            let Some(item) = self.next_item(cancel).await? else {
                self.filter.finish();
                return Ok(false);
            };

            match item {
                QueryItem::Metadata(meta) => {
                    if self.filter.on_metadata() {
                        self.schema = CursorSchema::new(meta.columns().iter().map(|c| c.name()));
                        tracing::trace!(
                            columns = self.schema.column_count(),
                            "result set metadata received"
                        );
                    }
                }
                QueryItem::Row(row) => {
                    if self.filter.on_row() {
                        let values = row_to_values(row).map_err(|e| {
                            tracing::warn!(error = %e, "row cells could not be converted");
                            e.to_string()
                        });
                        self.current = Some(values);
                        return Ok(true);
                    }
                }
            }
        }
    }
}

impl ResultCursor for TiberiusCursor<'_> {
    fn schema(&self) -> &CursorSchema {
        &self.schema
    }

    fn value(&self, ordinal: usize) -> Result<&Value> {
        let row = match self.current.as_ref().ok_or(ProcError::NoCurrentRow)? {
            Ok(row) => row,
            Err(reason) => return Err(ProcError::Conversion(reason.clone())),
        };
        row.get(ordinal).ok_or(ProcError::OrdinalOutOfRange {
            ordinal,
            count: row.len(),
        })
    }
}

impl std::fmt::Debug for TiberiusCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiberiusCursor")
            .field("schema", &self.schema)
            .field("filter", &self.filter)
            .finish()
    }
}
