use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::plans::PlanId;
use crate::recipe::timestamp_millis;
use crate::store::KeyValueStore;

pub const SESSION_KEY: &str = "smartmeal_session_v1";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: Option<PlanId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginProvider {
    Apple,
    Google,
}

impl LoginProvider {
    fn slug(&self) -> &'static str {
        match self {
            LoginProvider::Apple => "apple",
            LoginProvider::Google => "google",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            LoginProvider::Apple => "Utilisateur Apple",
            LoginProvider::Google => "Utilisateur Google",
        }
    }
}

impl fmt::Display for LoginProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Local part of the email with its first letter upper-cased.
fn name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Stub sign-in state. There is no real authentication: signing in just creates and
/// persists a user record.
pub struct UserSession {
    store: Arc<dyn KeyValueStore>,
    user: Option<User>,
}

impl UserSession {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, user: None }
    }

    /// Restores the stored user. Missing or malformed data leaves the session signed out.
    pub fn init(&mut self) {
        self.user = self.store.get(SESSION_KEY).and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored session is malformed, starting signed out");
                None
            }
        });
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login_with_provider(&mut self, provider: LoginProvider) -> &User {
        let user = User {
            id: format!("{}-{}", provider.slug(), timestamp_millis()),
            name: provider.display_name().to_string(),
            email: format!("user@{}.com", provider.slug()),
            plan: None,
        };
        info!(%provider, "signed in with provider");
        self.sign_in(user)
    }

    pub fn login_with_email(&mut self, email: &str) -> &User {
        let email = email.trim();
        let user = User {
            id: format!("email-{}", timestamp_millis()),
            name: name_from_email(email),
            email: email.to_string(),
            plan: None,
        };
        info!("signed in with email");
        self.sign_in(user)
    }

    /// No-op when signed out.
    pub fn set_plan(&mut self, plan: Option<PlanId>) {
        if let Some(mut user) = self.user.take() {
            user.plan = plan;
            self.replace_user(Some(user));
        }
    }

    /// No-op when signed out.
    pub fn update_user(&mut self, name: Option<&str>, email: Option<&str>) {
        if let Some(mut user) = self.user.take() {
            if let Some(name) = name {
                user.name = name.to_string();
            }
            if let Some(email) = email {
                user.email = email.to_string();
            }
            self.replace_user(Some(user));
        }
    }

    pub fn logout(&mut self) {
        self.replace_user(None);
        info!("signed out");
    }

    fn replace_user(&mut self, user: Option<User>) {
        self.persist(user.as_ref());
        self.user = user;
    }

    fn sign_in(&mut self, user: User) -> &User {
        self.persist(Some(&user));
        self.user.insert(user)
    }

    fn persist(&self, user: Option<&User>) {
        let result = match user {
            Some(user) => match serde_json::to_string(user) {
                Ok(serialized) => self.store.set(SESSION_KEY, &serialized),
                Err(e) => Err(e.into()),
            },
            None => self.store.delete(SESSION_KEY),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to save session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn session() -> (Arc<MemoryStore>, UserSession) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), UserSession::new(store))
    }

    #[test]
    fn test_name_from_email() {
        assert_eq!(name_from_email("rosa@gmail.com"), "Rosa");
        assert_eq!(name_from_email("élodie.b@x.fr"), "Élodie.b");
        assert_eq!(name_from_email("@x.fr"), "");
    }

    #[test]
    fn test_login_with_email_persists_user() {
        let (store, mut session) = session();
        let user = session.login_with_email("rosa@gmail.com").clone();
        assert!(user.id.starts_with("email-"));
        assert_eq!(user.name, "Rosa");
        assert_eq!(user.plan, None);

        let mut restored = UserSession::new(store);
        restored.init();
        assert!(restored.is_authenticated());
        assert_eq!(restored.user(), Some(&user));
    }

    #[test]
    fn test_login_with_provider() {
        let (_, mut session) = session();
        let user = session.login_with_provider(LoginProvider::Google);
        assert!(user.id.starts_with("google-"));
        assert_eq!(user.name, "Utilisateur Google");
        assert_eq!(user.email, "user@google.com");
    }

    #[test]
    fn test_set_plan_and_update_user() {
        let (store, mut session) = session();
        session.set_plan(Some(PlanId::Annual));
        assert!(session.user().is_none());

        session.login_with_email("rosa@gmail.com");
        session.set_plan(Some(PlanId::Annual));
        session.update_user(Some("Rosa R."), None);

        let mut restored = UserSession::new(store);
        restored.init();
        let user = restored.user().unwrap();
        assert_eq!(user.plan, Some(PlanId::Annual));
        assert_eq!(user.name, "Rosa R.");
        assert_eq!(user.email, "rosa@gmail.com");
    }

    #[test]
    fn test_logout_clears_store() {
        let (store, mut session) = session();
        session.login_with_provider(LoginProvider::Apple);
        session.logout();
        assert!(!session.is_authenticated());
        assert!(store.get(SESSION_KEY).is_none());
    }

    #[test]
    fn test_malformed_session_is_signed_out() {
        let (store, mut session) = session();
        store.set(SESSION_KEY, "{ broken").unwrap();
        session.init();
        assert!(!session.is_authenticated());
    }
}
