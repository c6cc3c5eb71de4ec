//! # Database Facade
//!
//! [`Database`] is the single handle the rest of an application holds. It owns
//! the answers and users collections, hashes passwords on their way in, and
//! turns identifier strings (as they arrive from request paths or the command
//! line) into [`RecordId`]s before any lock is taken or any file touched.
//!
//! The two collections lock independently. No facade method ever holds both
//! locks at once: [`Database::describe_answer`] reads the answer first and
//! resolves user names afterwards, as a separate step.

use crate::config::StoreConfig;
use crate::credential::{CredentialHasher, Sha3Hasher};
use crate::error::{Result, StoreError};
use crate::index::{LoginIndex, TagIndex};
use crate::model::{Answer, RecordId, User};
use crate::store::Collection;
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub type Answers = Collection<Answer, TagIndex>;
pub type Users = Collection<User, LoginIndex>;

/// An answer with its creator and updater ids resolved to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    #[serde(flatten)]
    pub answer: Answer,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

pub struct Database<H: CredentialHasher = Sha3Hasher> {
    root: PathBuf,
    answers: Answers,
    users: Users,
    hasher: H,
}

impl Database<Sha3Hasher> {
    /// Open the store at `root` with its saved configuration and the default
    /// password hasher.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::load(root.as_ref())?;
        Self::open_with(root, config, Sha3Hasher)
    }
}

impl<H: CredentialHasher> Database<H> {
    /// Create both collection directories if missing and index every document.
    /// Fails on the first unreadable directory or bad document.
    pub fn open_with(root: impl AsRef<Path>, config: StoreConfig, hasher: H) -> Result<Self> {
        config.validate()?;
        let root = root.as_ref().to_path_buf();

        let answers = Answers::open(root.join(&config.answers_dir), &config)?;
        let users = Users::open(root.join(&config.users_dir), &config)?;

        Ok(Self {
            root,
            answers,
            users,
            hasher,
        })
    }

    /// Wait for in-flight operations on each collection to finish.
    pub fn close(&self) {
        self.answers.drain();
        self.users.drain();
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn users(&self) -> &Users {
        &self.users
    }

    // --- Answers ---

    /// Store a new answer, stamping `actor` as both creator and updater.
    pub fn create_answer(&self, mut answer: Answer, actor: &str) -> Result<RecordId> {
        answer.created_by_id = actor.to_string();
        answer.updated_by_id = actor.to_string();
        self.answers.create(answer)
    }

    pub fn find_answer(&self, id: &str) -> Result<Answer> {
        self.answers.find(id.parse()?)
    }

    /// Every answer, in id order.
    pub fn find_answers(&self) -> Result<Vec<Answer>> {
        self.answers.find_all()
    }

    /// Overwrite an answer, stamping `actor` as updater. The creator and
    /// creation time always come from the stored version.
    pub fn update_answer(&self, mut answer: Answer, actor: &str) -> Result<RecordId> {
        answer.updated_by_id = actor.to_string();
        self.answers.update(answer)
    }

    pub fn delete_answer(&self, id: &str) -> Result<()> {
        self.answers.delete(id.parse()?)
    }

    /// Answers tagged with every tag in `query`. An empty query finds nothing;
    /// use [`Database::find_answers`] to browse.
    pub fn search_answers(&self, query: &str) -> Result<Vec<Answer>> {
        self.answers.find_where(|tags| tags.search(query))
    }

    /// Every tag currently in use, sorted.
    pub fn available_tags(&self) -> Vec<String> {
        self.answers.inspect(|tags| tags.available_tags().to_vec())
    }

    pub fn describe_answer(&self, answer: Answer) -> AnswerView {
        let created_by = self.display_name(&answer.created_by_id);
        let updated_by = self.display_name(&answer.updated_by_id);
        AnswerView {
            answer,
            created_by,
            updated_by,
        }
    }

    fn display_name(&self, user_id: &str) -> Option<String> {
        if user_id.is_empty() {
            return None;
        }
        match self.find_user(user_id) {
            Ok(user) => Some(user.name),
            Err(e) => {
                warn!("could not resolve user {user_id:?}: {e}");
                None
            }
        }
    }

    // --- Users ---

    /// Store a new user with `password` hashed.
    pub fn create_user(&self, mut user: User, password: &str) -> Result<RecordId> {
        user.password = self.hasher.hash(password);
        self.users.create(user)
    }

    pub fn find_user(&self, id: &str) -> Result<User> {
        self.users.find(id.parse()?)
    }

    pub fn find_users(&self) -> Result<Vec<User>> {
        self.users.find_all()
    }

    /// Overwrite a user. A new non-empty `password` replaces the stored
    /// credential; otherwise the user's current credential is kept.
    pub fn update_user(&self, mut user: User, password: Option<&str>) -> Result<RecordId> {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            user.password = self.hasher.hash(password);
        }
        self.users.update(user)
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.users.delete(id.parse()?)
    }

    pub fn find_user_by_login(&self, login: &str) -> Result<User> {
        self.users
            .find_where(|logins| logins.lookup(login).into_iter().collect())?
            .pop()
            .ok_or_else(|| StoreError::LoginNotFound(login.to_string()))
    }

    /// Look up `login` and check `password` against its stored credential.
    pub fn authenticate(&self, login: &str, password: &str) -> Result<User> {
        let user = self.find_user_by_login(login)?;
        if self.hasher.verify(&user.password, password) {
            Ok(user)
        } else {
            Err(StoreError::BadCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_open_lays_out_collections() {
        let (dir, db) = setup();
        assert!(dir.path().join("answers").is_dir());
        assert!(dir.path().join("users").is_dir());
        assert_eq!(db.root(), dir.path());
    }

    #[test]
    fn test_open_respects_saved_config() {
        let dir = TempDir::new().unwrap();
        StoreConfig {
            answers_dir: "kb".into(),
            users_dir: "people".into(),
            ..StoreConfig::default()
        }
        .save(dir.path())
        .unwrap();

        let db = Database::open(dir.path()).unwrap();
        db.create_answer(Answer::new("q", "a", "t"), "1").unwrap();
        assert!(dir.path().join("kb/1.json").exists());
        assert_eq!(db.users().dir(), dir.path().join("people"));
    }

    #[test]
    fn test_actor_is_stamped() {
        let (_dir, db) = setup();
        let id = db.create_answer(Answer::new("q", "a", "t"), "3").unwrap();
        let created = db.find_answer(&id.to_string()).unwrap();
        assert_eq!(created.created_by_id, "3");
        assert_eq!(created.updated_by_id, "3");

        db.update_answer(created, "5").unwrap();
        let updated = db.find_answer("1").unwrap();
        assert_eq!(updated.created_by_id, "3");
        assert_eq!(updated.updated_by_id, "5");
    }

    #[test]
    fn test_create_with_taken_id_keeps_original_creator() {
        let (_dir, db) = setup();
        let id = db.create_answer(Answer::new("q", "a", "t"), "X").unwrap();
        let before = db.find_answer("1").unwrap();

        let mut again = Answer::new("q2", "a2", "t");
        again.id = Some(id);
        let err = db.create_answer(again, "Y").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let after = db.find_answer("1").unwrap();
        assert_eq!(after.created_by_id, "X");
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.question, "q");
    }

    #[test]
    fn test_invalid_ids_are_rejected_before_io() {
        let (_dir, db) = setup();
        for bad in ["", "abc", "0", "-2"] {
            assert!(matches!(
                db.find_answer(bad),
                Err(StoreError::InvalidIdentifier(_))
            ));
            assert!(matches!(
                db.delete_user(bad),
                Err(StoreError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_describe_answer_resolves_names() {
        let (_dir, db) = setup();
        let ann = db
            .create_user(User::new("Ann", "ann", Level::Admin), "pw")
            .unwrap();
        let id = db
            .create_answer(Answer::new("q", "a", ""), &ann.to_string())
            .unwrap();

        let mut answer = db.find_answer(&id.to_string()).unwrap();
        let view = db.describe_answer(answer.clone());
        assert_eq!(view.created_by.as_deref(), Some("Ann"));
        assert_eq!(view.updated_by.as_deref(), Some("Ann"));

        answer.updated_by_id = "77".into();
        let view = db.describe_answer(answer);
        assert_eq!(view.created_by.as_deref(), Some("Ann"));
        assert_eq!(view.updated_by, None);
    }

    #[test]
    fn test_authenticate() {
        let (_dir, db) = setup();
        db.create_user(User::new("Bob", "bob", Level::User), "s3cret")
            .unwrap();

        let user = db.authenticate("bob", "s3cret").unwrap();
        assert_eq!(user.name, "Bob");
        assert!(matches!(
            db.authenticate("bob", "wrong"),
            Err(StoreError::BadCredentials)
        ));
        assert!(matches!(
            db.authenticate("nobody", "s3cret"),
            Err(StoreError::LoginNotFound(_))
        ));
    }

    #[test]
    fn test_update_user_password_handling() {
        let (_dir, db) = setup();
        let id = db
            .create_user(User::new("Cy", "cy", Level::User), "first")
            .unwrap();

        let mut renamed = User::new("Cyrus", "cy", Level::User);
        renamed.id = Some(id);
        db.update_user(renamed, None).unwrap();
        assert!(db.authenticate("cy", "first").is_ok());
        assert_eq!(db.find_user("1").unwrap().name, "Cyrus");

        let user = db.find_user("1").unwrap();
        db.update_user(user, Some("second")).unwrap();
        assert!(db.authenticate("cy", "second").is_ok());
        assert!(db.authenticate("cy", "first").is_err());
    }

    #[test]
    fn test_login_change_moves_index_entry() {
        let (_dir, db) = setup();
        db.create_user(User::new("Di", "di", Level::User), "pw")
            .unwrap();
        let mut user = db.find_user("1").unwrap();
        user.login = "diana".into();
        db.update_user(user, None).unwrap();

        assert!(db.find_user_by_login("di").unwrap_err().is_not_found());
        assert_eq!(db.find_user_by_login("diana").unwrap().name, "Di");
    }

    #[test]
    fn test_password_is_not_stored_in_plaintext() {
        let (dir, db) = setup();
        db.create_user(User::new("Eve", "eve", Level::User), "plaintext-pw")
            .unwrap();
        let doc = std::fs::read_to_string(dir.path().join("users/1.json")).unwrap();
        assert!(!doc.contains("plaintext-pw"));
    }
}
