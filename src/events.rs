use crate::ghost::GhostKind;

/// Things the presentation layer may want to react to. The simulation
/// pushes these during a tick and never waits on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PelletEaten,
    PowerPelletEaten,
    GhostEaten { ghost: GhostKind, bonus: u32 },
    PlayerDied { lives_left: u32 },
    GameOver { score: u32 },
    LevelCleared { level: u32 },
    NewHighScore { score: u32 },
}

#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
