//! 凭据存储：用户记录、密码哈希与校验。

use std::{collections::HashMap, fmt};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// 凭据存储错误。
#[derive(Debug, Error)]
pub(crate) enum CredentialError {
    #[error("user already exists")]
    AlreadyExists,
    /// 邮箱不存在与密码错误共用此变体。
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// 用户记录，注册后不可变。
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct UserRecord {
    pub(crate) name: Option<String>,
    pub(crate) email: String,
    /// Argon2id PHC 字符串（含盐与参数）。
    password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// 内存用户表，按邮箱（大小写敏感）索引。
pub(crate) struct CredentialStore {
    users: RwLock<HashMap<String, UserRecord>>,
    hasher: Argon2<'static>,
    /// 邮箱不存在时仍校验一次，抹平响应耗时差异。
    dummy_hash: String,
}

impl CredentialStore {
    /// 使用 Argon2id 默认参数创建存储。
    pub(crate) fn new() -> Result<Self, CredentialError> {
        Self::with_hasher(Argon2::default())
    }

    /// 使用指定哈希参数创建存储。
    pub(crate) fn with_hasher(hasher: Argon2<'static>) -> Result<Self, CredentialError> {
        let dummy_hash = hash_password(&hasher, &Uuid::new_v4().simple().to_string())?;
        Ok(Self {
            users: RwLock::new(HashMap::new()),
            hasher,
            dummy_hash,
        })
    }

    /// 注册用户；同邮箱并发注册只有一个成功。
    pub(crate) async fn register(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
    ) -> Result<(), CredentialError> {
        if self.users.read().await.contains_key(email) {
            return Err(CredentialError::AlreadyExists);
        }

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&hasher, &password))
                .await
                .map_err(|err| CredentialError::Hashing(err.to_string()))??;

        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(CredentialError::AlreadyExists);
        }
        users.insert(
            email.to_string(),
            UserRecord {
                name,
                email: email.to_string(),
                password_hash,
            },
        );
        info!(total = users.len(), "user registered");
        Ok(())
    }

    /// 校验邮箱与密码，成功返回用户记录。
    pub(crate) async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError> {
        let user = self.find(email).await;
        let stored_hash = user
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |user| user.password_hash.clone());

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || {
            password_matches(&hasher, &password, &stored_hash)
        })
        .await
        .map_err(|err| CredentialError::Hashing(err.to_string()))?;

        match user {
            Some(user) if matched => Ok(user),
            _ => {
                debug!("credential check rejected");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }

    /// 只读查询。
    pub(crate) async fn find(&self, email: &str) -> Option<UserRecord> {
        self.users.read().await.get(email).cloned()
    }

    /// 已注册用户数。
    pub(crate) async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

/// 生成带随机盐的 PHC 哈希串。
fn hash_password(hasher: &Argon2<'_>, password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialError::Hashing(err.to_string()))
}

/// 比对明文与 PHC 哈希；哈希串无法解析视为不匹配。
fn password_matches(hasher: &Argon2<'_>, password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// 测试用低成本哈希参数。
#[cfg(test)]
pub(crate) fn test_hasher() -> Argon2<'static> {
    use argon2::{Algorithm, Params, Version};

    let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{CredentialError, CredentialStore, test_hasher};

    fn store() -> CredentialStore {
        CredentialStore::with_hasher(test_hasher()).unwrap()
    }

    #[tokio::test]
    async fn register_then_verify_round_trip() {
        let store = store();
        store
            .register("alice@example.com", Some("Alice".to_string()), "pw123")
            .await
            .unwrap();

        let user = store.verify("alice@example.com", "pw123").await.unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = store();
        store.register("a@example.com", None, "one").await.unwrap();
        let err = store.register("a@example.com", None, "two").await.unwrap_err();
        assert!(matches!(err, CredentialError::AlreadyExists));

        // 首次注册的密码保持有效
        assert!(store.verify("a@example.com", "one").await.is_ok());
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = store();
        store.register("a@example.com", None, "pw").await.unwrap();
        assert!(store.register("A@example.com", None, "pw").await.is_ok());
        assert!(store.find("A@EXAMPLE.COM").await.is_none());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_fail_alike() {
        let store = store();
        store.register("a@example.com", None, "pw").await.unwrap();

        let wrong = store.verify("a@example.com", "nope").await.unwrap_err();
        let unknown = store.verify("ghost@example.com", "pw").await.unwrap_err();
        assert!(matches!(wrong, CredentialError::InvalidCredentials));
        assert!(matches!(unknown, CredentialError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn hashes_are_salted_per_user() {
        let store = store();
        store.register("a@example.com", None, "same").await.unwrap();
        store.register("b@example.com", None, "same").await.unwrap();

        let a = store.find("a@example.com").await.unwrap();
        let b = store.find("b@example.com").await.unwrap();
        assert_ne!(a.password_hash, b.password_hash);
        assert!(!a.password_hash.contains("same"));
        assert!(a.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn debug_output_omits_hash() {
        let store = store();
        store.register("a@example.com", None, "pw").await.unwrap();
        let user = store.find("a@example.com").await.unwrap();
        assert!(!format!("{user:?}").contains("argon2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_signups_for_one_email_create_one_user() {
        let store = Arc::new(store());
        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .register("race@example.com", None, &format!("pw{i}"))
                    .await
            }));
        }

        for task in tasks {
            match task.await.unwrap() {
                Ok(()) | Err(CredentialError::AlreadyExists) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(store.len().await, 1);
        assert!(store.find("race@example.com").await.is_some());
    }

    #[tokio::test]
    async fn len_counts_distinct_emails() {
        let store = store();
        assert_eq!(store.len().await, 0);
        store.register("a@example.com", None, "pw").await.unwrap();
        store.register("b@example.com", None, "pw").await.unwrap();
        let _ = store.register("a@example.com", None, "pw").await;
        assert_eq!(store.len().await, 2);
    }
}
