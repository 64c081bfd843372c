//! Screen selection.
//!
//! Which top-level screen is active is a pure function of
//! [`SessionState`] — nothing else may influence it. The shell renders
//! whatever this says; it never decides.

use stockshelf_core::Role;

use super::SessionState;

/// The active top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No session: show the sign-in form.
    SignIn,
    /// Session active, role pending: show a loading indicator.
    Loading,
    /// Role known: show the catalog, parameterized by what the role
    /// permits.
    Catalog(Role),
}

impl Screen {
    /// Select the screen for a session state.
    #[must_use]
    pub const fn for_state(state: SessionState) -> Self {
        match state {
            SessionState::Unauthorized => Self::SignIn,
            SessionState::Unresolved => Self::Loading,
            SessionState::Resolved(role) => Self::Catalog(role),
        }
    }
}

impl From<SessionState> for Screen {
    fn from(state: SessionState) -> Self {
        Self::for_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_state_selects_exactly_one_screen() {
        assert_eq!(Screen::for_state(SessionState::Unauthorized), Screen::SignIn);
        assert_eq!(Screen::for_state(SessionState::Unresolved), Screen::Loading);
        assert_eq!(
            Screen::for_state(SessionState::Resolved(Role::Viewer)),
            Screen::Catalog(Role::Viewer)
        );
        assert_eq!(
            Screen::for_state(SessionState::Resolved(Role::Admin)),
            Screen::Catalog(Role::Admin)
        );
    }
}
