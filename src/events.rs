use crate::machine::UiState;
use crate::popup::PopupId;
use crate::theme::ThemeId;
use crate::time::TimerKind;
use bevy_ecs::prelude::Resource;
use std::fmt;

/// Identifies the transition stage a batch of node tweens belongs to. The
/// orchestrator matches completions against the tag it handed out instead of
/// capturing closures in callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceTag(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    TweenFinished { tag: SequenceTag },
    StateChanged { from: UiState, to: UiState },
    PopupOpened { popup: PopupId },
    PopupClosed { popup: PopupId },
    PopupSwitched { from: PopupId, to: PopupId },
    ShotStarted { index: usize },
    ThemeChanged { theme: ThemeId },
    TimerFired { kind: TimerKind },
}

impl fmt::Display for UiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiEvent::TweenFinished { tag } => write!(f, "TweenFinished tag={}", tag.0),
            UiEvent::StateChanged { from, to } => {
                write!(f, "StateChanged from={from:?} to={to:?}")
            }
            UiEvent::PopupOpened { popup } => write!(f, "PopupOpened popup={}", popup.0),
            UiEvent::PopupClosed { popup } => write!(f, "PopupClosed popup={}", popup.0),
            UiEvent::PopupSwitched { from, to } => {
                write!(f, "PopupSwitched from={} to={}", from.0, to.0)
            }
            UiEvent::ShotStarted { index } => write!(f, "ShotStarted index={index}"),
            UiEvent::ThemeChanged { theme } => write!(f, "ThemeChanged theme={theme:?}"),
            UiEvent::TimerFired { kind } => write!(f, "TimerFired kind={}", kind.label()),
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<UiEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: UiEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<UiEvent> {
        self.events.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
