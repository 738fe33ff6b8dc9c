//! # Persons
//!
//! Roster entries, daily selections and guess results.
//!
//! ## Shapes
//! - Person: `{firstname, lastname, gender, type, workplace, image, hint}`, all strings
//! - Selection: `{id, date: "YYYY-MM-DD", person}`, keyed uniquely by **date**
//! - Guess result: `{correct, person}` where `person` only carries the fields that matched
//!
//! Identity is the (firstname, lastname) pair. Everything else is feedback for the guesser.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Person {
    pub firstname: String,
    pub lastname: String,
    pub gender: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub workplace: String,
    pub image: String,
    pub hint: String,
}

impl Person {
    pub fn identity(&self) -> (&str, &str) {
        (self.firstname.as_str(), self.lastname.as_str())
    }

    /// Case-sensitive, names only.
    pub fn same_identity(&self, other: &Person) -> bool {
        self.identity() == other.identity()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Persons {
    pub persons: Vec<Person>,
}

/// One person of the day. `id` is handed out by the store on every insert and
/// doubles as the round id clients use to tell days apart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DailySelection {
    pub id: u64,
    pub date: NaiveDate,
    pub person: Person,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialPerson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl PartialPerson {
    /// Copies each field of `answer` that `guess` got exactly right.
    pub fn reveal(guess: &Person, answer: &Person) -> Self {
        fn matched(guess: &str, answer: &str) -> Option<String> {
            (guess == answer).then(|| answer.to_string())
        }

        Self {
            firstname: matched(&guess.firstname, &answer.firstname),
            lastname: matched(&guess.lastname, &answer.lastname),
            gender: matched(&guess.gender, &answer.gender),
            kind: matched(&guess.kind, &answer.kind),
            workplace: matched(&guess.workplace, &answer.workplace),
            image: matched(&guess.image, &answer.image),
            hint: matched(&guess.hint, &answer.hint),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GuessResult {
    pub correct: bool,
    pub person: PartialPerson,
}
