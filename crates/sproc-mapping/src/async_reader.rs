//! Suspending cursor projections

use crate::protocol::{
    Candidate, ReadState, Terminal, lazy_mapper, map_one, read_cell, read_named_cell,
};
use crate::{FromRow, RowMapper};
use futures::stream::Stream;
use indexmap::IndexSet;
use sproc_core::{AsyncCursor, CancellationToken, ColumnValue, ProcError, Result};
use std::collections::HashMap;
use std::hash::Hash;

/// Suspending counterpart of [`CursorReader`](crate::CursorReader).
///
/// A fetch in flight races the cancellation token; if the token fires
/// first the fetch is abandoned and the operation reports
/// [`ProcError::Cancelled`].
pub struct AsyncCursorReader<'c, C: AsyncCursor + ?Sized> {
    cursor: &'c mut C,
    cancel: CancellationToken,
    state: ReadState,
}

impl<'c, C: AsyncCursor + ?Sized> AsyncCursorReader<'c, C> {
    pub fn new(cursor: &'c mut C, cancel: CancellationToken) -> Self {
        Self {
            cursor,
            cancel,
            state: ReadState::NotStarted,
        }
    }

    pub fn without_cancellation(cursor: &'c mut C) -> Self {
        Self::new(cursor, CancellationToken::new())
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn cursor(&self) -> &C {
        &*self.cursor
    }

    async fn fetch(&mut self) -> Result<bool> {
        if self.state.is_finished() {
            return Ok(false);
        }
        if self.state == ReadState::Failed {
            return Err(ProcError::Transport(
                "cursor failed on an earlier fetch".into(),
            ));
        }
        if self.cancel.is_cancelled() {
            tracing::debug!("cancellation observed before fetch");
            self.state = ReadState::Cancelled;
            return Err(ProcError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("cancellation observed during fetch");
                Err(ProcError::Cancelled)
            }
            outcome = self.cursor.advance_async(&self.cancel) => outcome,
        };
        self.state = ReadState::after_fetch(&outcome);
        outcome
    }

    /// Fetch and discard every remaining row, returning how many were skipped
    pub async fn drain(&mut self) -> Result<usize> {
        let mut skipped = 0;
        while self.fetch().await? {
            skipped += 1;
        }
        if skipped > 0 {
            tracing::trace!(skipped, "drained unread rows");
        }
        Ok(skipped)
    }

    async fn finalize<T>(&mut self, candidate: Candidate<T>) -> Result<T> {
        match candidate {
            Candidate::Aborted(err) => Err(err),
            Candidate::Ready(result) => {
                self.drain().await?;
                self.state = ReadState::Completed;
                result
            }
        }
    }

    async fn terminal<T>(
        &mut self,
        shape: Terminal,
        read: impl FnOnce(&C) -> Result<T>,
        default: impl FnOnce() -> T,
    ) -> Result<T> {
        let candidate = match self.fetch().await {
            Err(err) => Candidate::Aborted(err),
            Ok(false) if shape.or_default => Candidate::Ready(Ok(default())),
            Ok(false) => Candidate::Ready(Err(ProcError::EmptySequence)),
            Ok(true) => {
                let value = read(&*self.cursor);
                if !shape.single {
                    Candidate::Ready(value)
                } else {
                    match self.fetch().await {
                        Err(err) => Candidate::Aborted(err),
                        Ok(true) => Candidate::Ready(Err(ProcError::MultipleElements)),
                        Ok(false) => Candidate::Ready(value),
                    }
                }
            }
        };
        self.finalize(candidate).await
    }

    async fn collect_rows<T>(
        &mut self,
        mut read: impl FnMut(&C) -> Result<T>,
        mut sink: impl FnMut(T),
    ) -> Result<usize> {
        let mut rows = 0;
        let outcome = loop {
            match self.fetch().await {
                Err(err) => return Err(err),
                Ok(false) => break Ok(rows),
                Ok(true) => match read(&*self.cursor) {
                    Ok(value) => {
                        sink(value);
                        rows += 1;
                    }
                    Err(err) => break Err(err),
                },
            }
        };
        let rows = self.finalize(Candidate::Ready(outcome)).await?;
        tracing::debug!(rows, "projection completed");
        Ok(rows)
    }

    pub async fn first<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST, map_one::<T, C>, T::default)
            .await
    }

    pub async fn first_or_default<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST_OR_DEFAULT, map_one::<T, C>, T::default)
            .await
    }

    pub async fn single<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::SINGLE, map_one::<T, C>, T::default)
            .await
    }

    pub async fn single_or_default<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::SINGLE_OR_DEFAULT, map_one::<T, C>, T::default)
            .await
    }

    pub async fn scalar<T: ColumnValue + Default>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST, |cursor| read_cell(cursor, 0), T::default)
            .await
    }

    pub async fn scalar_or_default<T: ColumnValue + Default>(&mut self) -> Result<T> {
        self.terminal(
            Terminal::FIRST_OR_DEFAULT,
            |cursor| read_cell(cursor, 0),
            T::default,
        )
        .await
    }

    pub async fn to_list<T: FromRow>(&mut self) -> Result<Vec<T>> {
        let mut list: Vec<T> = Vec::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| list.push(value))
            .await?;
        Ok(list)
    }

    /// Rows keyed by `key`; a later row replaces an earlier one
    pub async fn to_dictionary<T, K, F>(&mut self, key: F) -> Result<HashMap<K, T>>
    where
        T: FromRow,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut map: HashMap<K, T> = HashMap::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| {
            map.insert(key(&value), value);
        })
        .await?;
        Ok(map)
    }

    pub async fn to_lookup<T, K, F>(&mut self, key: F) -> Result<HashMap<K, Vec<T>>>
    where
        T: FromRow,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut map: HashMap<K, Vec<T>> = HashMap::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| {
            map.entry(key(&value)).or_default().push(value);
        })
        .await?;
        Ok(map)
    }

    pub async fn to_set<T>(&mut self) -> Result<IndexSet<T>>
    where
        T: ColumnValue + Default + Eq + Hash,
    {
        let mut set: IndexSet<T> = IndexSet::new();
        self.collect_rows(|cursor| read_cell(cursor, 0), |value| {
            set.insert(value);
        })
        .await?;
        Ok(set)
    }

    pub async fn column<T: ColumnValue + Default>(&mut self, ordinal: usize) -> Result<Vec<T>> {
        let mut values: Vec<T> = Vec::new();
        self.collect_rows(|cursor| read_cell(cursor, ordinal), |value| values.push(value))
            .await?;
        Ok(values)
    }

    pub async fn column_by_name<T: ColumnValue + Default>(
        &mut self,
        name: &str,
    ) -> Result<Vec<T>> {
        let mut values: Vec<T> = Vec::new();
        let mut resolved = None;
        self.collect_rows(
            |cursor| read_named_cell(cursor, name, &mut resolved),
            |value| values.push(value),
        )
        .await?;
        Ok(values)
    }

    /// Stream of mapped rows; ends after the first error.
    ///
    /// Like [`CursorReader::map_all`](crate::CursorReader::map_all) this does
    /// not drain when dropped early.
    pub fn map_all<T: FromRow>(&mut self) -> impl Stream<Item = Result<T>> + '_ {
        futures::stream::unfold(
            (self, None::<RowMapper<T>>, false),
            |(reader, mut mapper, done)| async move {
                if done {
                    return None;
                }
                match reader.fetch().await {
                    Ok(true) => {
                        let cursor = &*reader.cursor;
                        let item = mapper
                            .get_or_insert_with(|| RowMapper::bind(cursor.schema()))
                            .map_row(cursor);
                        let failed = item.is_err();
                        Some((item, (reader, mapper, failed)))
                    }
                    Ok(false) => {
                        reader.state = ReadState::Completed;
                        None
                    }
                    Err(err) => Some((Err(err), (reader, mapper, true))),
                }
            },
        )
    }
}
