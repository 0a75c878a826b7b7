use std::io::{self, Write};

use crate::events::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Chomp,
    PowerUp,
    EatGhost,
    Death,
    GameOver,
    LevelClear,
    HighScore,
}

impl SoundKind {
    pub fn for_event(event: &GameEvent) -> SoundKind {
        match event {
            GameEvent::PelletEaten => SoundKind::Chomp,
            GameEvent::PowerPelletEaten => SoundKind::PowerUp,
            GameEvent::GhostEaten { .. } => SoundKind::EatGhost,
            GameEvent::PlayerDied { .. } => SoundKind::Death,
            GameEvent::GameOver { .. } => SoundKind::GameOver,
            GameEvent::LevelCleared { .. } => SoundKind::LevelClear,
            GameEvent::NewHighScore { .. } => SoundKind::HighScore,
        }
    }

    /// Chomps fire several times a second and are too frequent to ring for.
    fn is_cue(self) -> bool {
        !matches!(self, SoundKind::Chomp)
    }
}

pub trait AudioSink {
    fn play(&mut self, sound: SoundKind) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: SoundKind) -> io::Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell for notable cues.
#[derive(Debug)]
pub struct Bell<W: Write> {
    out: W,
}

impl<W: Write> Bell<W> {
    pub fn new(out: W) -> Self {
        Bell { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for Bell<W> {
    fn play(&mut self, sound: SoundKind) -> io::Result<()> {
        if !sound.is_cue() {
            return Ok(());
        }
        tracing::trace!(?sound, "bell");
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

pub fn sink_for(enabled: bool) -> Box<dyn AudioSink> {
    if enabled {
        Box::new(Bell::new(io::stdout()))
    } else {
        Box::new(NullAudio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ghost::GhostKind;

    #[test]
    fn events_map_to_sounds() {
        assert_eq!(SoundKind::for_event(&GameEvent::PelletEaten), SoundKind::Chomp);
        assert_eq!(
            SoundKind::for_event(&GameEvent::GhostEaten {
                ghost: GhostKind::Inky,
                bonus: 400
            }),
            SoundKind::EatGhost
        );
        assert_eq!(
            SoundKind::for_event(&GameEvent::LevelCleared { level: 2 }),
            SoundKind::LevelClear
        );
    }

    #[test]
    fn bell_skips_chomps() {
        let mut bell = Bell::new(Vec::new());
        bell.play(SoundKind::Chomp).unwrap();
        bell.play(SoundKind::PowerUp).unwrap();
        bell.play(SoundKind::Death).unwrap();
        assert_eq!(bell.into_inner(), b"\x07\x07".to_vec());
    }
}
