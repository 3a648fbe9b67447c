//! Top-level screen selection.
//!
//! Pure in-memory state: nothing here survives a restart, and a fresh
//! process always starts on `Home` even when a token is persisted.

use std::fmt;

/// Which top-level screen is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Main,
    Login,
    Register,
    History,
}

/// What actually renders for a selected view, given the auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Dashboard,
    Login,
    Register,
    History,
    /// Login/register selected while a token is present.
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: View,
    pub to: View,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot navigate from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

impl View {
    pub fn name(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Main => "main",
            View::Login => "login",
            View::Register => "register",
            View::History => "history",
        }
    }

    /// True if the router may move from `self` to `to`.
    ///
    /// `Main -> Login` is the navbar login button offered to guests.
    pub fn can_transition_to(self, to: View) -> bool {
        use View::*;
        if self == to || to == Home {
            return true;
        }
        matches!(
            (self, to),
            (Home, Main)
                | (Home, Login)
                | (Login, Register)
                | (Register, Login)
                | (Login, Main)
                | (Main, History)
                | (History, Main)
                | (Main, Login)
        )
    }

    pub fn transition(self, to: View) -> Result<View, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }

    /// Follow-up transition once a token appears while on the login screen.
    pub fn settle(self, authenticated: bool) -> View {
        match self {
            View::Login if authenticated => View::Main,
            other => other,
        }
    }

    /// The screen rendered for this view.
    pub fn screen(self, authenticated: bool) -> Screen {
        match self {
            View::Home => Screen::Home,
            View::Main => Screen::Dashboard,
            View::Login | View::Register if authenticated => Screen::Blank,
            View::Login => Screen::Login,
            View::Register => Screen::Register,
            View::History if authenticated => Screen::History,
            View::History => Screen::Dashboard,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(View::Home),
            "main" | "dashboard" => Ok(View::Main),
            "login" => Ok(View::Login),
            "register" => Ok(View::Register),
            "history" => Ok(View::History),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_home() {
        assert_eq!(View::default(), View::Home);
    }

    #[test]
    fn home_reaches_main_and_login_only() {
        assert!(View::Home.can_transition_to(View::Main));
        assert!(View::Home.can_transition_to(View::Login));
        assert!(!View::Home.can_transition_to(View::History));
        assert!(!View::Home.can_transition_to(View::Register));
    }

    #[test]
    fn login_and_register_toggle() {
        assert_eq!(View::Login.transition(View::Register), Ok(View::Register));
        assert_eq!(View::Register.transition(View::Login), Ok(View::Login));
    }

    #[test]
    fn history_round_trip_through_main() {
        assert_eq!(View::Main.transition(View::History), Ok(View::History));
        assert_eq!(View::History.transition(View::Main), Ok(View::Main));
        assert!(View::History.transition(View::Login).is_err());
    }

    #[test]
    fn every_view_can_go_home() {
        for view in [View::Home, View::Main, View::Login, View::Register, View::History] {
            assert!(view.can_transition_to(View::Home), "{} -> home", view);
        }
    }

    #[test]
    fn login_register_blank_when_authenticated() {
        assert_eq!(View::Login.screen(true), Screen::Blank);
        assert_eq!(View::Register.screen(true), Screen::Blank);
        assert_eq!(View::Login.screen(false), Screen::Login);
    }

    #[test]
    fn history_requires_token() {
        assert_eq!(View::History.screen(true), Screen::History);
        assert_eq!(View::History.screen(false), Screen::Dashboard);
    }

    #[test]
    fn settle_moves_login_to_main_once_authenticated() {
        assert_eq!(View::Login.settle(true), View::Main);
        assert_eq!(View::Login.settle(false), View::Login);
        assert_eq!(View::Register.settle(true), View::Register);
    }

    #[test]
    fn parse_view_names() {
        assert_eq!("dashboard".parse::<View>(), Ok(View::Main));
        assert!("settings".parse::<View>().is_err());
    }
}
