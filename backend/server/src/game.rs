//! # Game
//!
//! Person of the day selection and guess evaluation.
//!
//! ## Daily Selection
//! 1. Load every person that already appears in the history.
//!
//! 2. Draw a random roster member up to roster-size times, keep the first one not seen before.
//!
//! 3. No luck drawing? Walk the roster for anyone unseen. If everyone has had their day,
//!    settle for the last draw. The game must always have a person of the day.
//!
//! 4. Store it under today's date, replacing whatever was there.
//!
//! 5. Prune everything dated `RETENTION_DAYS` or more before today.
//!
//! Selections are serialized through a mutex so overlapping triggers cannot interleave.
//!
//! ## Guessing
//! - Correct iff first and last name match exactly
//! - Every field that matches is revealed, correct or not
use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, NaiveDate};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::AppError,
    person::{DailySelection, GuessResult, PartialPerson, Person},
    store::Store,
    utils::{format, today},
};

pub const RETENTION_DAYS: i64 = 10;

pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct Game {
    store: Arc<dyn Store>,
    clock: Clock,
    selecting: Mutex<()>,
}

impl Game {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            clock: Arc::new(today),
            selecting: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub async fn select_person_of_the_day(&self) -> Result<DailySelection, AppError> {
        let _guard = self.selecting.lock().await;

        let roster = self.store.list_persons().await?;
        if roster.is_empty() {
            return Err(AppError::EmptyRoster);
        }

        let history = self.store.list_selections().await?;
        let seen: HashSet<(&str, &str)> = history.iter().map(|s| s.person.identity()).collect();

        let person = pick_candidate(&roster, &seen, &mut rand::thread_rng()).clone();

        let today = self.today();
        let selection = self.store.put_selection(today, person).await?;

        info!(
            "Person of the day for {} is {} {} (round {})",
            format(today),
            selection.person.firstname,
            selection.person.lastname,
            selection.id
        );

        self.prune(today, &history).await?;

        Ok(selection)
    }

    /// Selects only if today has no person yet.
    pub async fn ensure_selection(&self) -> Result<DailySelection, AppError> {
        match self.today_selection().await {
            Err(AppError::NoSelection) => self.select_person_of_the_day().await,
            existing => existing,
        }
    }

    async fn prune(&self, today: NaiveDate, history: &[DailySelection]) -> Result<(), AppError> {
        let cutoff = today - Duration::days(RETENTION_DAYS);

        let mut stale: Vec<NaiveDate> = history
            .iter()
            .map(|selection| selection.date)
            .filter(|date| *date < cutoff)
            .collect();
        stale.push(cutoff);

        for date in stale {
            debug!("Pruning selection for {}", format(date));
            self.store.delete_selection(date).await?;
        }

        Ok(())
    }

    pub async fn today_selection(&self) -> Result<DailySelection, AppError> {
        self.store
            .get_selection(self.today())
            .await?
            .ok_or(AppError::NoSelection)
    }

    pub async fn evaluate_guess(&self, guess: &Person) -> Result<GuessResult, AppError> {
        let answer = self.today_selection().await?.person;

        Ok(GuessResult {
            correct: guess.same_identity(&answer),
            person: PartialPerson::reveal(guess, &answer),
        })
    }

    pub async fn hint(&self) -> Result<String, AppError> {
        Ok(self.today_selection().await?.person.hint)
    }

    pub async fn yesterday(&self) -> Result<Person, AppError> {
        let yesterday = self.today() - Duration::days(1);

        self.store
            .get_selection(yesterday)
            .await?
            .map(|selection| selection.person)
            .ok_or_else(|| AppError::NotFound(format!("no person for {}", format(yesterday))))
    }

    /// Id of the most recently inserted selection.
    pub async fn current_round_id(&self) -> Result<String, AppError> {
        self.store
            .list_selections()
            .await?
            .iter()
            .map(|selection| selection.id)
            .max()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::NotFound("no rounds played yet".into()))
    }

    pub async fn history(&self) -> Result<Vec<DailySelection>, AppError> {
        self.store.list_selections().await
    }

    pub async fn roster(&self) -> Result<Vec<Person>, AppError> {
        self.store.list_persons().await
    }
}

/// `roster` must not be empty.
fn pick_candidate<'a, R: Rng + ?Sized>(
    roster: &'a [Person],
    seen: &HashSet<(&str, &str)>,
    rng: &mut R,
) -> &'a Person {
    let mut last = &roster[0];

    for _ in 0..roster.len() {
        let candidate = &roster[rng.gen_range(0..roster.len())];
        if !seen.contains(&candidate.identity()) {
            return candidate;
        }
        last = candidate;
    }

    roster
        .iter()
        .find(|person| !seen.contains(&person.identity()))
        .unwrap_or(last)
}
