//! State machines shared by the bridge components

use serde::{Deserialize, Serialize};

/// Attachment state of a module's channel handler
///
/// ```text
/// Detached ⇄ Attached
/// ```
///
/// Requesting the state a module is already in is a no-op, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// No handler installed on the channel
    #[default]
    Detached,
    /// Module is the channel's sole handler
    Attached,
}

impl ModuleState {
    /// Check if moving to `target` changes anything
    pub fn is_transition(&self, target: ModuleState) -> bool {
        *self != target
    }

    /// Check if the module can receive calls in this state
    pub fn can_handle_calls(&self) -> bool {
        matches!(self, ModuleState::Attached)
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleState::Detached => write!(f, "Detached"),
            ModuleState::Attached => write!(f, "Attached"),
        }
    }
}

/// Loading phase of an inline in-app message view
///
/// State transitions (driven by native SDK callbacks):
/// ```text
/// Uninitialized → LoadingStarted → LoadingFinished
///       │               │    ↑            │
///       │               ↓    └────────────┤ (element rebound / re-evaluated)
///       └──────→ NoMessageToDisplay ──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InlinePhase {
    /// Nothing reported by the native SDK yet
    #[default]
    Uninitialized,
    /// A message is being loaded into the view
    LoadingStarted,
    /// A message has been rendered
    LoadingFinished,
    /// No eligible message exists for the bound element
    NoMessageToDisplay,
}

impl InlinePhase {
    /// Check if the native SDK is expected to move from this phase to `target`
    pub fn can_transition_to(&self, target: InlinePhase) -> bool {
        use InlinePhase::*;
        matches!(
            (self, target),
            (Uninitialized, LoadingStarted)
                | (Uninitialized, NoMessageToDisplay)
                | (LoadingStarted, LoadingFinished)
                | (LoadingStarted, NoMessageToDisplay)
                // Re-evaluation after rebinding or eligibility changes
                | (LoadingFinished, LoadingStarted)
                | (NoMessageToDisplay, LoadingStarted)
                // Rendered message dismissed or expired
                | (LoadingFinished, NoMessageToDisplay)
        )
    }

    /// Check if this phase ends a loading cycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InlinePhase::LoadingFinished | InlinePhase::NoMessageToDisplay
        )
    }

    /// Name sent upstream in `onStateChange`
    ///
    /// `Uninitialized` is never reported.
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            InlinePhase::Uninitialized => None,
            InlinePhase::LoadingStarted => Some("LoadingStarted"),
            InlinePhase::LoadingFinished => Some("LoadingFinished"),
            InlinePhase::NoMessageToDisplay => Some("NoMessageToDisplay"),
        }
    }
}

impl std::fmt::Display for InlinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InlinePhase::Uninitialized => write!(f, "Uninitialized"),
            InlinePhase::LoadingStarted => write!(f, "LoadingStarted"),
            InlinePhase::LoadingFinished => write!(f, "LoadingFinished"),
            InlinePhase::NoMessageToDisplay => write!(f, "NoMessageToDisplay"),
        }
    }
}
