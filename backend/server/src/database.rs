//! # Redis
//!
//! RAM database.
//!
//! Core purpose is to store the roster and the person of the day history.
//!
//! ## Requirements
//!
//! - Fast lookups by date
//! - Tiny dataset: a few hundred people, at most ~10 history records after pruning
//! - Replacing a day must never leave zero or two records behind
//!
//! ## Implementation
//!
//! - `dodle:persons`: list of JSON persons, appended once when seeding
//! - `dodle:history`: hash of `YYYY-MM-DD` to JSON selection
//! - `dodle:history:next_id`: counter, INCR on every insert gives the round id
//! - The `dodle` prefix is configurable per store, tests run under their own
//! - `HSET` overwrites the field atomically, so replacing today's record is a single command
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::{
    error::AppError,
    person::{DailySelection, Person},
    store::Store,
    utils::format,
};

pub const KEY_PREFIX: &str = "dodle";
pub const PERSONS_KEY: &str = "persons";
pub const HISTORY_KEY: &str = "history";
pub const NEXT_ID_KEY: &str = "history:next_id";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, AppError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            connection: init_redis(redis_url).await?,
            prefix: KEY_PREFIX.to_string(),
        })
    }

    /// Namespaces every key under `prefix` instead of `dodle`.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    fn key(&self, name: &str) -> String {
        format!("{}:{name}", self.prefix)
    }
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    Ok(serde_json::from_str(raw)?)
}

#[async_trait]
impl Store for RedisStore {
    async fn list_persons(&self) -> Result<Vec<Person>, AppError> {
        let mut conn = self.connection.clone();
        let raw: Vec<String> = conn.lrange(self.key(PERSONS_KEY), 0, -1).await?;

        raw.iter().map(|person| decode(person)).collect()
    }

    async fn insert_persons(&self, persons: &[Person]) -> Result<(), AppError> {
        if persons.is_empty() {
            return Ok(());
        }

        let raw = persons
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.connection.clone();
        conn.rpush::<_, _, ()>(self.key(PERSONS_KEY), raw).await?;

        Ok(())
    }

    async fn get_selection(&self, date: NaiveDate) -> Result<Option<DailySelection>, AppError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .hget(self.key(HISTORY_KEY), format(date))
            .await?;

        raw.as_deref().map(decode).transpose()
    }

    async fn list_selections(&self) -> Result<Vec<DailySelection>, AppError> {
        let mut conn = self.connection.clone();
        let raw: HashMap<String, String> = conn.hgetall(self.key(HISTORY_KEY)).await?;

        let mut selections = raw
            .values()
            .map(|selection| decode::<DailySelection>(selection))
            .collect::<Result<Vec<_>, _>>()?;
        selections.sort_by_key(|selection| selection.date);

        Ok(selections)
    }

    async fn put_selection(
        &self,
        date: NaiveDate,
        person: Person,
    ) -> Result<DailySelection, AppError> {
        let mut conn = self.connection.clone();
        let id: u64 = conn.incr(self.key(NEXT_ID_KEY), 1).await?;

        let selection = DailySelection { id, date, person };
        let raw = serde_json::to_string(&selection)?;
        conn.hset::<_, _, _, ()>(self.key(HISTORY_KEY), format(date), raw)
            .await?;

        Ok(selection)
    }

    async fn delete_selection(&self, date: NaiveDate) -> Result<(), AppError> {
        let mut conn = self.connection.clone();
        conn.hdel::<_, _, ()>(self.key(HISTORY_KEY), format(date)).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn named(firstname: &str) -> Person {
        Person {
            firstname: firstname.into(),
            lastname: "Test".into(),
            ..Person::default()
        }
    }

    /// Needs a live server: `REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_redis_round_trip() {
        let Ok(redis_url) = env::var("REDIS_URL") else {
            return;
        };

        let prefix = format!("dodle-test-{}", std::process::id());
        let store = RedisStore::connect(&redis_url)
            .await
            .unwrap()
            .with_prefix(&prefix);

        store
            .insert_persons(&[named("Ada"), named("Alan")])
            .await
            .unwrap();
        assert_eq!(store.list_persons().await.unwrap().len(), 2);

        store.put_selection(day(12), named("Grace")).await.unwrap();
        let first = store.put_selection(day(3), named("Ada")).await.unwrap();
        let replaced = store.put_selection(day(3), named("Alan")).await.unwrap();
        assert!(replaced.id > first.id);

        let history = store.list_selections().await.unwrap();
        assert_eq!(
            history.iter().map(|s| s.date).collect::<Vec<_>>(),
            vec![day(3), day(12)]
        );
        assert_eq!(history[0], replaced);

        store.delete_selection(day(12)).await.unwrap();
        store.delete_selection(day(20)).await.unwrap();
        assert!(store.get_selection(day(12)).await.unwrap().is_none());
        assert_eq!(store.get_selection(day(3)).await.unwrap(), Some(replaced));

        let mut conn = store.connection.clone();
        let keys = [PERSONS_KEY, HISTORY_KEY, NEXT_ID_KEY].map(|name| store.key(name));
        conn.del::<_, ()>(keys.to_vec()).await.unwrap();
    }
}
