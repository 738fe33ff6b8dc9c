//! # Store
//!
//! Everything the game needs from persistence, as one trait.
//!
//! - Roster: append-only at startup, read on every selection
//! - History: one record per date, replaced in place, pruned by the game
//!
//! `put_selection` replaces whatever is stored for that date in a single
//! operation, so a date never holds two records and never transiently holds none.
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    person::{DailySelection, Person},
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_persons(&self) -> Result<Vec<Person>, AppError>;

    /// Only used when seeding the roster.
    async fn insert_persons(&self, persons: &[Person]) -> Result<(), AppError>;

    async fn get_selection(&self, date: NaiveDate) -> Result<Option<DailySelection>, AppError>;

    /// All selections, oldest date first.
    async fn list_selections(&self) -> Result<Vec<DailySelection>, AppError>;

    /// Stores `person` for `date`, replacing any existing record, and assigns a fresh id.
    async fn put_selection(
        &self,
        date: NaiveDate,
        person: Person,
    ) -> Result<DailySelection, AppError>;

    /// Deleting a date with no record is not an error.
    async fn delete_selection(&self, date: NaiveDate) -> Result<(), AppError>;
}

#[derive(Default)]
struct Inner {
    persons: Vec<Person>,
    history: BTreeMap<NaiveDate, DailySelection>,
    next_id: u64,
}

/// Process-local store. Used by tests and by `STORE=memory` deployments.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_persons(&self) -> Result<Vec<Person>, AppError> {
        Ok(self.inner.read().await.persons.clone())
    }

    async fn insert_persons(&self, persons: &[Person]) -> Result<(), AppError> {
        self.inner.write().await.persons.extend_from_slice(persons);
        Ok(())
    }

    async fn get_selection(&self, date: NaiveDate) -> Result<Option<DailySelection>, AppError> {
        Ok(self.inner.read().await.history.get(&date).cloned())
    }

    async fn list_selections(&self) -> Result<Vec<DailySelection>, AppError> {
        Ok(self.inner.read().await.history.values().cloned().collect())
    }

    async fn put_selection(
        &self,
        date: NaiveDate,
        person: Person,
    ) -> Result<DailySelection, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let selection = DailySelection {
            id: inner.next_id,
            date,
            person,
        };
        inner.history.insert(date, selection.clone());

        Ok(selection)
    }

    async fn delete_selection(&self, date: NaiveDate) -> Result<(), AppError> {
        self.inner.write().await.history.remove(&date);
        Ok(())
    }
}
