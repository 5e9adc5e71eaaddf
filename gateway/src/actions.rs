use crate::directory::{Directory, DirectoryError, UserRecord};

/// Admin listing that never fails: a directory error is swallowed into an
/// empty list and logged. The admin surface consuming this cannot tell "no
/// users" from "listing failed"; callers that can surface the failure should
/// use [`try_list_all_users`].
pub async fn list_all_users(directory: &dyn Directory) -> Vec<UserRecord> {
    match try_list_all_users(directory).await {
        Ok(users) => users,
        Err(err) => {
            tracing::error!("failed to list users: {err}");
            Vec::new()
        }
    }
}

/// Admin listing with the failure exposed.
pub async fn try_list_all_users(
    directory: &dyn Directory,
) -> Result<Vec<UserRecord>, DirectoryError> {
    directory.list_users().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{AuthedUser, TenantSettings};
    use async_trait::async_trait;

    struct FlakyDirectory {
        fail: bool,
    }

    #[async_trait]
    impl Directory for FlakyDirectory {
        async fn user_from_token(
            &self,
            _token: &str,
        ) -> Result<Option<AuthedUser>, DirectoryError> {
            Ok(None)
        }

        async fn settings_for_user(
            &self,
            _user_id: &str,
        ) -> Result<Option<TenantSettings>, DirectoryError> {
            Ok(None)
        }

        async fn settings_by_slug(
            &self,
            _slug: &str,
        ) -> Result<Option<TenantSettings>, DirectoryError> {
            Ok(None)
        }

        async fn list_users(&self) -> Result<Vec<UserRecord>, DirectoryError> {
            if self.fail {
                return Err(DirectoryError::Api {
                    endpoint: "/auth/v1/admin/users".to_string(),
                    status: 503,
                });
            }
            Ok(vec![UserRecord {
                id: "u1".to_string(),
                email: None,
                created_at: None,
            }])
        }
    }

    #[tokio::test]
    async fn test_listing_failure_swallowed_to_empty() {
        let users = list_all_users(&FlakyDirectory { fail: true }).await;
        assert!(users.is_empty());

        let users = list_all_users(&FlakyDirectory { fail: false }).await;
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_try_variant_exposes_failure() {
        assert!(try_list_all_users(&FlakyDirectory { fail: true }).await.is_err());
    }
}
