//! Subject to role lookup.

/// Maps an authenticated subject to the roles it holds.
///
/// Any `Fn(&str) -> Vec<String>` is a role finder:
///
/// ```
/// use citadel_auth::RoleFinder;
///
/// let finder = |subject: &str| {
///     if subject == "admin" { vec!["ADMIN".to_string()] } else { vec!["USER".to_string()] }
/// };
/// assert_eq!(finder.roles("admin"), vec!["ADMIN"]);
/// ```
pub trait RoleFinder: Send + Sync + 'static {
    /// Roles held by `subject`.
    fn roles(&self, subject: &str) -> Vec<String>;
}

impl<F> RoleFinder for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
{
    fn roles(&self, subject: &str) -> Vec<String> {
        self(subject)
    }
}

/// True if `required` is empty or shares a role with `held`.
pub(crate) fn admits(required: &[&str], held: &[String]) -> bool {
    required.is_empty() || required.iter().any(|r| held.iter().any(|h| h == r))
}
