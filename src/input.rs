use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::components::Direction;

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Start,
    Restart,
    NextLevel,
    Quit,
}

/// Maps a terminal key event to a command. Releases and unbound keys map
/// to nothing.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {}
        KeyEventKind::Release => return None,
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            _ => None,
        };
    }
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Command::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Command::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Command::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Command::Turn(Direction::Right),
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePause,
        KeyCode::Enter => Command::Start,
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('n') => Command::NextLevel,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn vim_arrow_and_wasd_keys_turn() {
        for (codes, dir) in [
            ([KeyCode::Up, KeyCode::Char('k'), KeyCode::Char('w')], Direction::Up),
            ([KeyCode::Down, KeyCode::Char('j'), KeyCode::Char('s')], Direction::Down),
            ([KeyCode::Left, KeyCode::Char('h'), KeyCode::Char('a')], Direction::Left),
            ([KeyCode::Right, KeyCode::Char('l'), KeyCode::Char('d')], Direction::Right),
        ] {
            for code in codes {
                assert_eq!(command_for(&press(code)), Some(Command::Turn(dir)));
            }
        }
    }

    #[test]
    fn session_commands() {
        assert_eq!(command_for(&press(KeyCode::Char(' '))), Some(Command::TogglePause));
        assert_eq!(command_for(&press(KeyCode::Enter)), Some(Command::Start));
        assert_eq!(command_for(&press(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(command_for(&press(KeyCode::Char('n'))), Some(Command::NextLevel));
        assert_eq!(command_for(&press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&key), Some(Command::Quit));
        let key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
        assert_eq!(command_for(&key), None);
    }

    #[test]
    fn releases_are_ignored() {
        let key = KeyEvent {
            code: KeyCode::Char('k'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(command_for(&key), None);
    }
}
