//! Video player overlay state machine.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackOverlay {
    Hidden,
    #[default]
    Shown,
    MenuOpen,
    /// Remembers what to restore when the dictionary closes.
    DictionaryOpen {
        resume_playback: bool,
        restore_controls: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Tap on the video surface.
    ToggleControls,
    OpenMenu,
    CloseMenu,
    /// A caption was clicked for lookup.
    OpenDictionary { playing: bool },
    CloseDictionary,
    /// Playback paused by the user or the browser.
    Paused { auto_show: bool },
    /// `play()` was rejected after the dictionary closed.
    ResumeFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEffect {
    Pause,
    Resume,
    ExitFullscreen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PlaybackOverlay,
    pub effects: Vec<PlaybackEffect>,
}

impl Transition {
    fn to(state: PlaybackOverlay) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

impl PlaybackOverlay {
    pub fn controls_visible(&self) -> bool {
        matches!(self, PlaybackOverlay::Shown | PlaybackOverlay::MenuOpen)
    }

    pub fn dictionary_visible(&self) -> bool {
        matches!(self, PlaybackOverlay::DictionaryOpen { .. })
    }

    pub fn next(self, event: PlaybackEvent) -> Transition {
        use PlaybackEffect::*;
        use PlaybackOverlay::*;

        match (self, event) {
            (Hidden, PlaybackEvent::ToggleControls) => Transition::to(Shown),
            (Shown, PlaybackEvent::ToggleControls) => Transition::to(Hidden),
            (Shown, PlaybackEvent::OpenMenu) => Transition::to(MenuOpen),
            (MenuOpen, PlaybackEvent::CloseMenu) => Transition::to(Shown),
            (Hidden, PlaybackEvent::Paused { auto_show: true }) => Transition::to(Shown),

            (Hidden | Shown | MenuOpen, PlaybackEvent::OpenDictionary { playing }) => Transition {
                state: DictionaryOpen {
                    resume_playback: playing,
                    restore_controls: self.controls_visible(),
                },
                effects: vec![ExitFullscreen, Pause],
            },

            (
                DictionaryOpen {
                    resume_playback,
                    restore_controls,
                },
                PlaybackEvent::CloseDictionary,
            ) => {
                if resume_playback {
                    Transition {
                        state: Hidden,
                        effects: vec![Resume],
                    }
                } else if restore_controls {
                    Transition::to(Shown)
                } else {
                    Transition::to(Hidden)
                }
            }

            (Hidden, PlaybackEvent::ResumeFailed) => Transition::to(Shown),

            (state, _) => Transition::to(state),
        }
    }
}
