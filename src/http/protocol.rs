//! HTTP wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::{Action, Phase, TurnOutcome};

/// Body of `POST /game/action`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Button id, `dg:<code>:<token>`
    pub custom_id: String,
}

/// One clickable action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub custom_id: String,
}

/// A rendered turn plus the buttons for the next one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResponse {
    /// Rendered view, one line per screen row
    pub view: String,
    pub status: String,
    pub phase: Phase,
    pub health: u16,
    pub message: String,
    pub token: String,
    /// Empty once the game is over
    pub buttons: Vec<Button>,
}

impl From<TurnOutcome> for GameResponse {
    fn from(outcome: TurnOutcome) -> Self {
        let buttons = if outcome.state.phase.is_terminal() {
            Vec::new()
        } else {
            Action::BUTTONS
                .into_iter()
                .map(|action| Button {
                    label: action.label().to_string(),
                    custom_id: action.button_id(&outcome.token),
                })
                .collect()
        };

        Self {
            view: outcome.frame.view_text(),
            status: outcome.frame.status.clone(),
            phase: outcome.state.phase,
            health: outcome.state.player.health,
            message: outcome.state.message,
            token: outcome.token,
            buttons,
        }
    }
}
