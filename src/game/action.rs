//! Player actions and their button ids

use serde::{Deserialize, Serialize};

/// Namespace in front of every button id
pub const BUTTON_NAMESPACE: &str = "dg";

/// Separator between the parts of a button id
pub const BUTTON_SEPARATOR: char = ':';

/// Actions a player can take on a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnLeft,
    TurnRight,
    MoveForward,
    MoveBackward,
    Shoot,
    /// Let a turn pass; held movement still applies
    Wait,
    /// Toggle the held forward intent
    HoldForward,
    /// Toggle the held left-turn intent
    HoldLeft,
    /// Toggle the held right-turn intent
    HoldRight,
    /// Unrecognised input. Nothing changes except the timestamp.
    #[serde(other)]
    Idle,
}

impl Action {
    /// Actions offered as buttons, in display order
    pub const BUTTONS: [Action; 9] = [
        Action::TurnLeft,
        Action::MoveForward,
        Action::TurnRight,
        Action::MoveBackward,
        Action::Shoot,
        Action::Wait,
        Action::HoldLeft,
        Action::HoldForward,
        Action::HoldRight,
    ];

    /// Length of the longest button prefix (`dg:xx:`)
    pub const MAX_PREFIX_LEN: usize = BUTTON_NAMESPACE.len() + 2 + 2;

    /// Two-letter wire code used in button ids
    pub fn code(self) -> &'static str {
        match self {
            Action::TurnLeft => "tl",
            Action::TurnRight => "tr",
            Action::MoveForward => "fw",
            Action::MoveBackward => "bk",
            Action::Shoot => "sh",
            Action::Wait => "wt",
            Action::HoldForward => "hf",
            Action::HoldLeft => "hl",
            Action::HoldRight => "hr",
            Action::Idle => "id",
        }
    }

    pub fn from_code(code: &str) -> Self {
        Self::BUTTONS
            .into_iter()
            .find(|action| action.code() == code)
            .unwrap_or(Action::Idle)
    }

    /// Long-form name, same as the serde form
    pub fn name(self) -> &'static str {
        match self {
            Action::TurnLeft => "turn_left",
            Action::TurnRight => "turn_right",
            Action::MoveForward => "move_forward",
            Action::MoveBackward => "move_backward",
            Action::Shoot => "shoot",
            Action::Wait => "wait",
            Action::HoldForward => "hold_forward",
            Action::HoldLeft => "hold_left",
            Action::HoldRight => "hold_right",
            Action::Idle => "idle",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::TurnLeft => "Turn left",
            Action::TurnRight => "Turn right",
            Action::MoveForward => "Forward",
            Action::MoveBackward => "Back",
            Action::Shoot => "Shoot",
            Action::Wait => "Wait",
            Action::HoldForward => "Hold forward",
            Action::HoldLeft => "Hold left",
            Action::HoldRight => "Hold right",
            Action::Idle => "Idle",
        }
    }

    /// Button prefix, `dg:<code>:`
    pub fn prefix(self) -> String {
        format!(
            "{BUTTON_NAMESPACE}{BUTTON_SEPARATOR}{}{BUTTON_SEPARATOR}",
            self.code()
        )
    }

    /// Full button id carrying the state token
    pub fn button_id(self, token: &str) -> String {
        let mut id = self.prefix();
        id.push_str(token);
        id
    }

    /// Split a button id into its action and token.
    /// Returns `None` when the namespace is wrong; unknown codes become [`Action::Idle`].
    pub fn parse_button_id(id: &str) -> Option<(Action, &str)> {
        let mut parts = id.splitn(3, BUTTON_SEPARATOR);
        if parts.next()? != BUTTON_NAMESPACE {
            return None;
        }
        let action = Self::from_code(parts.next()?);
        let token = parts.next()?;
        Some((action, token))
    }
}
