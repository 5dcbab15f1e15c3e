//! User accounts
//!
//! The directory is stored as `{ "<username>": { "password_hash", "role" } }`
//! with accounts in creation order.

use crate::error::{AccessError, AccessResult};
use crate::password::{hash_password, is_password_hash, verify_password};
use crate::role::Role;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the built-in administrator, which can never be deleted
pub const BUILTIN_ADMIN: &str = "admin";

/// A login identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub role: Role,
}

impl UserAccount {
    /// Create account from an already hashed password
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    password_hash: String,
    #[serde(default)]
    role: Role,
}

/// All accounts, keyed by username
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, AccountRecord>", into = "IndexMap<String, AccountRecord>")]
pub struct UserDirectory {
    accounts: IndexMap<String, UserAccount>,
}

impl From<IndexMap<String, AccountRecord>> for UserDirectory {
    fn from(records: IndexMap<String, AccountRecord>) -> Self {
        let accounts = records
            .into_iter()
            .map(|(name, r)| (name.clone(), UserAccount::new(name, r.password_hash, r.role)))
            .collect();
        Self { accounts }
    }
}

impl From<UserDirectory> for IndexMap<String, AccountRecord> {
    fn from(directory: UserDirectory) -> Self {
        directory
            .accounts
            .into_iter()
            .map(|(name, a)| {
                (
                    name,
                    AccountRecord {
                        password_hash: a.password_hash,
                        role: a.role,
                    },
                )
            })
            .collect()
    }
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<&UserAccount> {
        self.accounts.get(username)
    }

    #[must_use]
    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// Accounts in creation order
    pub fn iter(&self) -> impl Iterator<Item = &UserAccount> {
        self.accounts.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Create an account, hashing `password`
    ///
    /// # Errors
    /// - `InvalidUsername` for blank names or names with surrounding whitespace
    /// - `DuplicateUser` if the name is taken
    /// - `PasswordHash` if hashing fails
    pub fn add_user(&mut self, username: &str, password: &str, role: Role) -> AccessResult<&UserAccount> {
        validate_username(username)?;
        if self.contains(username) {
            return Err(AccessError::DuplicateUser(username.to_string()));
        }
        let account = UserAccount::new(username, hash_password(password)?, role);
        tracing::info!(user = username, role = %role, "user added");
        let (index, _) = self.accounts.insert_full(username.to_string(), account);
        self.accounts
            .get_index(index)
            .map(|(_, account)| account)
            .ok_or_else(|| AccessError::UnknownUser(username.to_string()))
    }

    /// Change the role and/or password of an account
    ///
    /// # Errors
    /// - `UnknownUser` if no such account
    /// - `PasswordHash` if hashing fails
    pub fn update_user(&mut self, username: &str, role: Option<Role>, password: Option<&str>) -> AccessResult<()> {
        let new_hash = password.map(hash_password).transpose()?;
        let account = self
            .accounts
            .get_mut(username)
            .ok_or_else(|| AccessError::UnknownUser(username.to_string()))?;
        if let Some(role) = role {
            account.role = role;
        }
        if let Some(hash) = new_hash {
            account.password_hash = hash;
        }
        tracing::info!(
            user = username,
            role_changed = role.is_some(),
            password_changed = password.is_some(),
            "user updated"
        );
        Ok(())
    }

    /// Delete an account
    ///
    /// # Errors
    /// - `ProtectedAccount` for the built-in admin
    /// - `UnknownUser` if no such account
    pub fn remove_user(&mut self, username: &str) -> AccessResult<UserAccount> {
        if username == BUILTIN_ADMIN {
            return Err(AccessError::ProtectedAccount(username.to_string()));
        }
        let account = self
            .accounts
            .shift_remove(username)
            .ok_or_else(|| AccessError::UnknownUser(username.to_string()))?;
        tracing::info!(user = username, "user removed");
        Ok(account)
    }

    /// Check credentials
    ///
    /// Returns `None` for unknown users, wrong passwords and unreadable hashes.
    /// A plaintext value left in `users.json` never matches, not even itself.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&UserAccount> {
        let account = self.accounts.get(username)?;
        if !is_password_hash(&account.password_hash) {
            tracing::warn!(user = username, "stored password is not a hash");
            return None;
        }
        match verify_password(password, &account.password_hash) {
            Ok(true) => Some(account),
            Ok(false) => {
                tracing::debug!(user = username, "password mismatch");
                None
            }
            Err(e) => {
                tracing::warn!(user = username, error = %e, "stored hash unreadable");
                None
            }
        }
    }

    /// Seed the built-in admin when it is missing
    ///
    /// Returns `true` if the account was created.
    ///
    /// # Errors
    /// `PasswordHash` if hashing fails
    pub fn ensure_admin(&mut self, initial_password: &str) -> AccessResult<bool> {
        if self.contains(BUILTIN_ADMIN) {
            return Ok(false);
        }
        self.add_user(BUILTIN_ADMIN, initial_password, Role::Admin)?;
        Ok(true)
    }
}

/// Reject blank names and names with surrounding whitespace
///
/// # Errors
/// `InvalidUsername`
pub fn validate_username(username: &str) -> AccessResult<()> {
    if username.trim().is_empty() || username.trim() != username {
        return Err(AccessError::InvalidUsername(username.to_string()));
    }
    Ok(())
}
