//! Active-view selection.
//!
//! Purely in-memory: the active view always starts at [`View::Home`].

use serde::{Deserialize, Serialize};

/// Content views of the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Landing page.
    #[default]
    Home,
    /// Guided chat.
    Chat,
    /// Guidance journal.
    Journal,
    /// Inspiration cards.
    Inspiration,
    /// Relaxation.
    Relax,
    /// Islamic consultation.
    Consultation,
    /// Recitation (ruqyah).
    Ruqyah,
    /// Supplications and remembrances.
    Adhkar,
}

impl View {
    /// Every view, in sidebar order.
    pub const ALL: [View; 8] = [
        View::Home,
        View::Chat,
        View::Journal,
        View::Inspiration,
        View::Relax,
        View::Consultation,
        View::Ruqyah,
        View::Adhkar,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Chat => "chat",
            View::Journal => "journal",
            View::Inspiration => "inspiration",
            View::Relax => "relax",
            View::Consultation => "consultation",
            View::Ruqyah => "ruqyah",
            View::Adhkar => "adhkar",
        }
    }

    /// Header label shown for the view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Home => "آية ترشدك",
            View::Chat => "الدردشة الإرشادية",
            View::Journal => "دفتر هدايتي",
            View::Inspiration => "ركن الإلهام",
            View::Relax => "واحة السكينة",
            View::Consultation => "الاستشارة الإسلامية",
            View::Ruqyah => "الرقية الشرعية",
            View::Adhkar => "أدعية وأذكار",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown view: {}", s))
    }
}

/// Holds the active view.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    active: View,
}

impl Navigator {
    /// Start at the home view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active view.
    pub fn active(&self) -> View {
        self.active
    }

    /// Switch views, returning the one that was active.
    pub fn navigate(&mut self, view: View) -> View {
        std::mem::replace(&mut self.active, view)
    }

    /// True while the home view is active.
    pub fn is_home(&self) -> bool {
        self.active == View::Home
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_navigator_starts_home() {
        let nav = Navigator::new();
        assert_eq!(nav.active(), View::Home);
        assert!(nav.is_home());
    }

    #[test]
    fn test_navigate_returns_previous() {
        let mut nav = Navigator::new();
        assert_eq!(nav.navigate(View::Chat), View::Home);
        assert_eq!(nav.navigate(View::Chat), View::Chat);
        assert_eq!(nav.active(), View::Chat);
        assert!(!nav.is_home());
    }

    #[test]
    fn test_view_names_roundtrip() {
        for view in View::ALL {
            assert_eq!(View::from_str(view.as_str()), Ok(view));
            assert_eq!(view.to_string(), view.as_str());
        }
        assert_eq!(View::from_str("  Journal "), Ok(View::Journal));
        assert!(View::from_str("settings").is_err());
    }

    #[test]
    fn test_every_view_has_label() {
        let labels: std::collections::HashSet<&str> = View::ALL.iter().map(|v| v.label()).collect();
        assert_eq!(labels.len(), View::ALL.len());
        assert_eq!(View::Journal.label(), "دفتر هدايتي");
    }

    #[test]
    fn test_view_serde_lowercase() {
        assert_eq!(serde_json::to_string(&View::Adhkar).unwrap(), "\"adhkar\"");
        let view: View = serde_json::from_str("\"relax\"").unwrap();
        assert_eq!(view, View::Relax);
    }
}
