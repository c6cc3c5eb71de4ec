//! # Records
//!
//! Every persisted entity implements [`Record`]. A record lives in exactly one
//! collection directory as `<id>.json`; the store assigns the [`RecordId`] and
//! calls the lifecycle hooks so each record type decides which of its fields
//! are stamped on creation and which survive an update untouched.
//!
//! - [`Answer`]: a question/answer pair with a free-text tag field.
//! - [`User`]: a login with a display name, hashed credential and [`Level`].

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// A store-assigned positive integer key, unique within one collection.
///
/// Serialized as a decimal string, which is also the file stem on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    pub const FIRST: RecordId = RecordId(1);

    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(RecordId(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The id after this one, or `None` once the id space is used up.
    pub fn next(self) -> Option<RecordId> {
        self.0.checked_add(1).map(RecordId)
    }

    /// Parse a file stem, accepting only the canonical form written by the store.
    pub(crate) fn from_stem(stem: &str) -> Option<Self> {
        let id: RecordId = stem.parse().ok()?;
        (id.to_string() == stem).then_some(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StoreError::InvalidIdentifier(s.to_string());
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let value: u64 = s.parse().map_err(|_| invalid())?;
        RecordId::new(value).ok_or_else(invalid)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Reads a document's `id` field without failing the whole document. The
/// store takes the id from the filename, so a missing or malformed value in
/// the body only yields `None`.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RecordId>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(RecordId::new),
        _ => None,
    })
}

/// A type the store can persist.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection, used for log lines and error messages.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<RecordId>;

    fn set_id(&mut self, id: RecordId);

    /// Called once, just before a new record is first written.
    fn before_create(&mut self, _now: DateTime<Utc>) {}

    /// Called before an update is written, with the version currently on disk.
    /// Implementations restore every field that must not change after creation.
    fn before_update(&mut self, _previous: &Self, _now: DateTime<Utc>) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<RecordId>,
    pub question: String,
    pub answer: String,
    /// Whitespace separated tag tokens.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by_id: String,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            question: question.into(),
            answer: answer.into(),
            tags: tags.into(),
            created_by_id: String::new(),
            created_at: now,
            updated_by_id: String::new(),
            updated_at: now,
        }
    }

    /// The distinct tag tokens of this answer, in lexicographic order.
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags.split_whitespace().collect()
    }
}

impl Record for Answer {
    const COLLECTION: &'static str = "answers";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn before_create(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn before_update(&mut self, previous: &Self, now: DateTime<Utc>) {
        self.created_by_id = previous.created_by_id.clone();
        self.created_at = previous.created_at;
        self.updated_at = now;
    }
}

/// A one-way hashed password. Never holds plaintext.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Credential(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<unset>)")
        } else {
            f.write_str("Credential(<hashed>)")
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::User => f.write_str("user"),
            Level::Admin => f.write_str("admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub login: String,
    #[serde(default)]
    pub password: Credential,
    #[serde(default)]
    pub level: Level,
}

impl User {
    pub fn new(name: impl Into<String>, login: impl Into<String>, level: Level) -> Self {
        Self {
            id: None,
            name: name.into(),
            login: login.into(),
            password: Credential::default(),
            level,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.level == Level::Admin
    }
}

impl Record for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn before_update(&mut self, previous: &Self, _now: DateTime<Utc>) {
        // An update without a new password keeps the stored one.
        if self.password.is_empty() {
            self.password = previous.password.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn record_id_parsing() {
        assert_eq!("1".parse::<RecordId>().unwrap().get(), 1);
        assert_eq!("0042".parse::<RecordId>().unwrap().get(), 42);
        for bad in ["", "0", "-1", "+1", "abc", " 3", "3.0", "99999999999999999999999"] {
            let err = bad.parse::<RecordId>().unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidIdentifier(ref s) if s == bad),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn stems_must_be_canonical() {
        assert_eq!(RecordId::from_stem("12"), RecordId::new(12));
        assert_eq!(RecordId::from_stem("012"), None);
        assert_eq!(RecordId::from_stem("0"), None);
        assert_eq!(RecordId::from_stem("notes"), None);
    }

    #[test]
    fn record_id_serializes_as_string() {
        let id = RecordId::new(7).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
        let back: RecordId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RecordId>("\"x\"").is_err());
    }

    #[test]
    fn answer_tag_set_dedups() {
        let answer = Answer::new("q", "a", "  rust  io rust\tlinux ");
        let tags: Vec<&str> = answer.tag_set().into_iter().collect();
        assert_eq!(tags, vec!["io", "linux", "rust"]);
    }

    #[test]
    fn answer_update_restores_creation_fields() {
        let t0 = Utc::now() - Duration::days(3);
        let mut stored = Answer::new("q", "a", "t");
        stored.created_by_id = "1".into();
        stored.created_at = t0;
        stored.updated_at = t0;

        let mut incoming = stored.clone();
        incoming.created_by_id = "9".into();
        incoming.created_at = Utc::now();
        incoming.updated_by_id = "2".into();

        let now = Utc::now();
        incoming.before_update(&stored, now);
        assert_eq!(incoming.created_by_id, "1");
        assert_eq!(incoming.created_at, t0);
        assert_eq!(incoming.updated_by_id, "2");
        assert_eq!(incoming.updated_at, now);
    }

    #[test]
    fn user_update_keeps_password_when_blank() {
        let mut stored = User::new("Ann", "ann", Level::Admin);
        stored.password = Credential::from_hash("sha3$aa$bb");

        let mut incoming = User::new("Ann B", "ann", Level::Admin);
        incoming.before_update(&stored, Utc::now());
        assert_eq!(incoming.password, stored.password);

        let mut changed = User::new("Ann B", "ann", Level::Admin);
        changed.password = Credential::from_hash("sha3$cc$dd");
        changed.before_update(&stored, Utc::now());
        assert_eq!(changed.password.as_str(), "sha3$cc$dd");
    }

    #[test]
    fn unknown_level_reads_as_user() {
        let user: User =
            serde_json::from_str(r#"{"name":"x","login":"x","level":"guest"}"#).unwrap();
        assert_eq!(user.level, Level::User);
        let admin: User =
            serde_json::from_str(r#"{"name":"x","login":"x","level":"admin"}"#).unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Level::User).unwrap(), "\"user\"");
        assert_eq!(Level::default(), Level::User);
        let user: User = serde_json::from_str(r#"{"name":"x","login":"x"}"#).unwrap();
        assert_eq!(user.level, Level::User);
    }

    #[test]
    fn record_id_next_stops_at_the_end_of_the_id_space() {
        assert_eq!(RecordId::FIRST.next(), RecordId::new(2));
        assert_eq!(RecordId::new(u64::MAX).unwrap().next(), None);
    }

    #[test]
    fn malformed_document_id_reads_as_none() {
        for raw in [r#""""#, r#""abc""#, r#""0""#, "null", "true", "-4"] {
            let json = format!(
                r#"{{"id":{raw},"name":"x","login":"x","level":"user"}}"#
            );
            let user: User = serde_json::from_str(&json).unwrap();
            assert_eq!(user.id, None, "id {raw}");
        }
        let numeric: User =
            serde_json::from_str(r#"{"id":5,"name":"x","login":"x"}"#).unwrap();
        assert_eq!(numeric.id, RecordId::new(5));
        let stringly: User =
            serde_json::from_str(r#"{"id":"6","name":"x","login":"x"}"#).unwrap();
        assert_eq!(stringly.id, RecordId::new(6));
    }

    #[test]
    fn credential_debug_hides_hash() {
        let c = Credential::from_hash("sha3$salt$digest");
        assert!(!format!("{c:?}").contains("digest"));
    }
}
