//! Process-wide authenticated-user state.

use shared::protocol::Profile;
use tokio::sync::RwLock;

/// Current signed-in profile with an explicit lifecycle: initialized on
/// sign-in, torn down on sign-out. Consumers (navigation gate, app shell)
/// receive snapshots rather than reaching into ambient globals.
#[derive(Default)]
pub struct Session {
    profile: RwLock<Option<Profile>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, profile: Profile) {
        let mut guard = self.profile.write().await;
        *guard = Some(profile);
    }

    pub async fn sign_out(&self) {
        let mut guard = self.profile.write().await;
        *guard = None;
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.profile.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{AccountType, UserId};

    use super::*;

    fn profile() -> Profile {
        Profile {
            user_id: UserId(7),
            username: "adminhn".to_string(),
            full_name: "Nguyen Van A".to_string(),
            account_type: AccountType::Admin,
        }
    }

    #[tokio::test]
    async fn sign_in_then_sign_out_clears_profile() {
        let session = Session::new();
        assert!(!session.is_signed_in().await);

        session.sign_in(profile()).await;
        assert_eq!(
            session.profile().await.map(|p| p.username),
            Some("adminhn".to_string())
        );

        session.sign_out().await;
        assert!(session.profile().await.is_none());
    }
}
