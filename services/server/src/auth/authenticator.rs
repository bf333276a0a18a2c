//! 请求鉴权：`Authorization` 头 → token → 用户记录。

use thiserror::Error;
use tracing::debug;

use crate::{
    api::types::AUTH_SCHEME,
    auth::{credentials::UserRecord, token::TokenError},
    state::AppState,
};

/// 请求鉴权错误。
#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("Missing auth header")]
    MissingHeader,
    #[error("Malformed auth header")]
    Malformed,
    #[error("Invalid or expired token")]
    InvalidToken(#[source] TokenError),
    /// token 有效但用户已不在存储中。
    #[error("User not found")]
    UserNotFound,
}

/// 拆分 `Bearer <token>`，必须恰好两段。
pub(crate) fn parse_bearer(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case(AUTH_SCHEME) || token.is_empty() || parts.next().is_some() {
        return Err(AuthError::Malformed);
    }
    Ok(token)
}

impl AppState {
    /// 解析鉴权头并返回当前用户。
    pub(crate) async fn authenticate(
        &self,
        header_value: Option<&str>,
    ) -> Result<UserRecord, AuthError> {
        let Some(header_value) = header_value else {
            return Err(AuthError::MissingHeader);
        };
        let token = parse_bearer(header_value)?;
        let email = self.tokens.verify(token).map_err(|err| {
            debug!("token rejected: {err}");
            AuthError::InvalidToken(err)
        })?;
        self.credentials
            .find(&email)
            .await
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthError, parse_bearer};
    use crate::{auth::token::TokenError, state::AppState};

    fn state() -> AppState {
        AppState::for_tests()
    }

    #[test]
    fn bearer_header_splits_into_scheme_and_token() {
        assert_eq!(parse_bearer("Bearer abc").unwrap(), "abc");
        assert_eq!(parse_bearer("bearer  abc ").unwrap(), "abc");
    }

    #[test]
    fn bearer_header_shape_is_enforced() {
        for raw in ["", "Bearer", "abc", "Basic abc", "Bearer a b", "Bearer "] {
            assert!(matches!(parse_bearer(raw), Err(AuthError::Malformed)), "{raw}");
        }
    }

    #[tokio::test]
    async fn missing_header_is_reported() {
        let err = state().authenticate(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingHeader));
    }

    #[tokio::test]
    async fn bad_token_is_invalid_token() {
        let err = state()
            .authenticate(Some("Bearer nonsense"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::Malformed)));
    }

    #[tokio::test]
    async fn expired_token_is_invalid_token() {
        let state = state();
        state
            .credentials
            .register("a@example.com", None, "pw")
            .await
            .unwrap();
        let token = state.tokens.issue_at("a@example.com", 1_000).unwrap();

        let err = state
            .authenticate(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired)));
    }

    #[tokio::test]
    async fn valid_token_for_unknown_user_is_user_not_found() {
        let state = state();
        let token = state.tokens.issue("ghost@example.com").unwrap();
        let err = state
            .authenticate(Some(&format!("Bearer {token}")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn valid_token_resolves_user_record() {
        let state = state();
        state
            .credentials
            .register("a@example.com", Some("A".to_string()), "pw")
            .await
            .unwrap();
        let token = state.tokens.issue("a@example.com").unwrap();

        let user = state
            .authenticate(Some(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.name.as_deref(), Some("A"));
    }
}
