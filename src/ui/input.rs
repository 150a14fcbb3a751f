/// Keyboard input: terminal key events → game commands.
///
/// Moves are discrete: each Press (or auto-Repeat while held) is one
/// step, so there is no held-key tracking. Release events are ignored.
///
/// Key mapping:
///   ← / a          →  Move left
///   → / d          →  Move right
///   F1 / p         →  Pause / Resume
///   r              →  Restart
///   Enter / Space  →  Confirm (restart after game over)
///   q / Esc / ^C   →  Quit

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::MoveDir;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(MoveDir),
    Pause,
    Restart,
    Confirm,
    Quit,
}

/// Map one key event to a command. Releases and unbound keys map to `None`.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            .then_some(Command::Quit);
    }
    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::Move(MoveDir::Right)),
        KeyCode::F(1) | KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::Restart),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Commands collected during the most recent `drain_events()` call.
    commands: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { commands: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.commands.clear();
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(cmd) = command_for(&key) {
                    self.commands.push(cmd);
                }
            }
        }
        Ok(())
    }

    /// Commands in arrival order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}
