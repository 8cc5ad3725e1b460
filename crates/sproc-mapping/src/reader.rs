//! Blocking cursor projections

use crate::protocol::{
    Candidate, ReadState, Terminal, lazy_mapper, map_one, read_cell, read_named_cell,
};
use crate::{FromRow, RowMapper};
use indexmap::IndexSet;
use sproc_core::{CancellationToken, ColumnValue, Cursor, ProcError, Result};
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

/// Projects a forward-only cursor into typed values.
///
/// Every operation reads the rows it needs and then drains the rest of the
/// cursor. Cancellation is checked before each fetch, including the fetches
/// of the drain, so a value that was already mapped is never returned once
/// cancellation has been observed.
pub struct CursorReader<'c, C: Cursor + ?Sized> {
    cursor: &'c mut C,
    cancel: CancellationToken,
    state: ReadState,
}

impl<'c, C: Cursor + ?Sized> CursorReader<'c, C> {
    pub fn new(cursor: &'c mut C, cancel: CancellationToken) -> Self {
        Self {
            cursor,
            cancel,
            state: ReadState::NotStarted,
        }
    }

    /// Reader whose token is never cancelled
    pub fn without_cancellation(cursor: &'c mut C) -> Self {
        Self::new(cursor, CancellationToken::new())
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn cursor(&self) -> &C {
        &*self.cursor
    }

    fn fetch(&mut self) -> Result<bool> {
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
        let outcome = self.cursor.advance();
        self.state = ReadState::after_fetch(&outcome);
        outcome
    }

    /// Fetch and discard every remaining row, returning how many were skipped
    pub fn drain(&mut self) -> Result<usize> {
        let mut skipped = 0;
        while self.fetch()? {
            skipped += 1;
        }
        if skipped > 0 {
            tracing::trace!(skipped, "drained unread rows");
        }
        Ok(skipped)
    }

    fn finalize<T>(&mut self, candidate: Candidate<T>) -> Result<T> {
        match candidate {
            Candidate::Aborted(err) => Err(err),
            Candidate::Ready(result) => {
                self.drain()?;
                self.state = ReadState::Completed;
                result
            }
        }
    }

    fn terminal<T>(
        &mut self,
        shape: Terminal,
        read: impl FnOnce(&C) -> Result<T>,
        default: impl FnOnce() -> T,
    ) -> Result<T> {
        let candidate = match self.fetch() {
            Err(err) => Candidate::Aborted(err),
            Ok(false) if shape.or_default => Candidate::Ready(Ok(default())),
            Ok(false) => Candidate::Ready(Err(ProcError::EmptySequence)),
            Ok(true) => {
                let value = read(&*self.cursor);
                if shape.single {
                    match self.fetch() {
                        Err(err) => Candidate::Aborted(err),
                        Ok(true) => Candidate::Ready(Err(ProcError::MultipleElements)),
                        Ok(false) => Candidate::Ready(value),
                    }
                } else {
                    Candidate::Ready(value)
                }
            }
        };
        self.finalize(candidate)
    }

    fn collect_rows<T>(
        &mut self,
        mut read: impl FnMut(&C) -> Result<T>,
        mut sink: impl FnMut(T),
    ) -> Result<usize> {
        let mut rows = 0;
        let outcome = loop {
            match self.fetch() {
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
        let rows = self.finalize(Candidate::Ready(outcome))?;
        tracing::debug!(rows, "projection completed");
        Ok(rows)
    }

    /// First row mapped to `T`; fails on an empty cursor
    pub fn first<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST, map_one::<T, C>, T::default)
    }

    /// First row mapped to `T`, or `T::default()` on an empty cursor
    pub fn first_or_default<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST_OR_DEFAULT, map_one::<T, C>, T::default)
    }

    /// The only row mapped to `T`; fails on zero or several rows
    pub fn single<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::SINGLE, map_one::<T, C>, T::default)
    }

    /// The only row mapped to `T`, or `T::default()` on an empty cursor;
    /// fails on several rows
    pub fn single_or_default<T: FromRow>(&mut self) -> Result<T> {
        self.terminal(Terminal::SINGLE_OR_DEFAULT, map_one::<T, C>, T::default)
    }

    /// First column of the first row
    pub fn scalar<T: ColumnValue + Default>(&mut self) -> Result<T> {
        self.terminal(Terminal::FIRST, |cursor| read_cell(cursor, 0), T::default)
    }

    pub fn scalar_or_default<T: ColumnValue + Default>(&mut self) -> Result<T> {
        self.terminal(
            Terminal::FIRST_OR_DEFAULT,
            |cursor| read_cell(cursor, 0),
            T::default,
        )
    }

    /// Every row mapped to `T`, in cursor order
    pub fn to_list<T: FromRow>(&mut self) -> Result<Vec<T>> {
        let mut list: Vec<T> = Vec::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| list.push(value))?;
        Ok(list)
    }

    /// Rows keyed by `key`; a later row replaces an earlier one with the
    /// same key
    pub fn to_dictionary<T, K, F>(&mut self, key: F) -> Result<HashMap<K, T>>
    where
        T: FromRow,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut map: HashMap<K, T> = HashMap::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| {
            map.insert(key(&value), value);
        })?;
        Ok(map)
    }

    /// Rows grouped by `key`, each group in cursor order
    pub fn to_lookup<T, K, F>(&mut self, key: F) -> Result<HashMap<K, Vec<T>>>
    where
        T: FromRow,
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let mut map: HashMap<K, Vec<T>> = HashMap::new();
        self.collect_rows(lazy_mapper::<T, C>(), |value| {
            map.entry(key(&value)).or_default().push(value);
        })?;
        Ok(map)
    }

    /// Distinct values of the first column, in first-seen order
    pub fn to_set<T>(&mut self) -> Result<IndexSet<T>>
    where
        T: ColumnValue + Default + Eq + Hash,
    {
        let mut set: IndexSet<T> = IndexSet::new();
        self.collect_rows(|cursor| read_cell(cursor, 0), |value| {
            set.insert(value);
        })?;
        Ok(set)
    }

    /// Every value of one column by ordinal; NULL yields `T::default()`
    pub fn column<T: ColumnValue + Default>(&mut self, ordinal: usize) -> Result<Vec<T>> {
        let mut values: Vec<T> = Vec::new();
        self.collect_rows(|cursor| read_cell(cursor, ordinal), |value| values.push(value))?;
        Ok(values)
    }

    /// Every value of one column by name (ignoring ASCII case)
    pub fn column_by_name<T: ColumnValue + Default>(&mut self, name: &str) -> Result<Vec<T>> {
        let mut values: Vec<T> = Vec::new();
        let mut resolved = None;
        self.collect_rows(
            |cursor| read_named_cell(cursor, name, &mut resolved),
            |value| values.push(value),
        )?;
        Ok(values)
    }

    /// Lazily map rows one at a time.
    ///
    /// Unlike the collecting operations this does not drain: dropping the
    /// iterator early leaves the remaining rows unread. Call
    /// [`drain`](Self::drain) afterwards when the cursor must be consumed.
    pub fn map_all<T: FromRow>(&mut self) -> MappedRows<'_, 'c, C, T> {
        MappedRows {
            reader: self,
            mapper: None,
            done: false,
        }
    }
}

/// Iterator returned by [`CursorReader::map_all`]; stops after the first error
pub struct MappedRows<'r, 'c, C: Cursor + ?Sized, T> {
    reader: &'r mut CursorReader<'c, C>,
    mapper: Option<RowMapper<T>>,
    done: bool,
}

impl<C: Cursor + ?Sized, T: FromRow> Iterator for MappedRows<'_, '_, C, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.fetch() {
            Ok(true) => {
                let cursor = &*self.reader.cursor;
                let item = self
                    .mapper
                    .get_or_insert_with(|| RowMapper::bind(cursor.schema()))
                    .map_row(cursor);
                self.done = item.is_err();
                Some(item)
            }
            Ok(false) => {
                self.done = true;
                self.reader.state = ReadState::Completed;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<C: Cursor + ?Sized, T: FromRow> FusedIterator for MappedRows<'_, '_, C, T> {}
