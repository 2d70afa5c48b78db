//! Who is using the app.
//!
//! The rest of the crate only sees [`AuthProvider`]: a nullable current user
//! and a way to sign out. [`LocalProfile`] is the terminal stand-in, seeded
//! from the saved config or `--name`.

use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub school: Option<String>,
}

impl User {
    pub fn new(display_name: &str, school: Option<&str>) -> Self {
        Self {
            id: slug(display_name),
            display_name: display_name.trim().to_string(),
            school: school.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }

    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }
}

fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub trait AuthProvider {
    fn current_user(&self) -> Option<&User>;
    fn sign_out(&mut self);
}

#[derive(Debug, Clone, Default)]
pub struct LocalProfile {
    user: Option<User>,
}

impl LocalProfile {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    /// Blank names are rejected.
    pub fn sign_in(&mut self, display_name: &str, school: Option<&str>) -> bool {
        if display_name.trim().is_empty() {
            return false;
        }
        let user = User::new(display_name, school);
        info!(user = %user.id, "signed in");
        self.user = Some(user);
        true
    }
}

impl AuthProvider for LocalProfile {
    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user = %user.id, "signed out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_out() {
        let mut profile = LocalProfile::default();
        assert!(profile.current_user().is_none());

        assert!(profile.sign_in("Asha  Verma", Some("DPS Pune")));
        let user = profile.current_user().unwrap();
        assert_eq!(user.id, "asha-verma");
        assert_eq!(user.display_name, "Asha  Verma");
        assert_eq!(user.school.as_deref(), Some("DPS Pune"));

        profile.sign_out();
        assert!(profile.current_user().is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut profile = LocalProfile::default();

        assert!(!profile.sign_in("   ", None));
        assert!(profile.current_user().is_none());
    }

    #[test]
    fn test_blank_school_dropped() {
        let user = User::new("Ravi", Some(" "));
        assert_eq!(user.school, None);
    }

    #[test]
    fn test_initials() {
        assert_eq!(User::new("asha verma", None).initials(), "AV");
        assert_eq!(User::new("Ravi", None).initials(), "R");
        assert_eq!(User::new("a b c", None).initials(), "AB");
    }

    #[test]
    fn test_sign_out_without_user_is_noop() {
        let mut profile = LocalProfile::new(None);
        profile.sign_out();
        assert!(profile.current_user().is_none());
    }
}
