#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

/// Moves a list cursor one row, wrapping at both ends. Empty lists pin it to 0.
pub const fn step_cursor(index: usize, len: usize, direction: Move) -> usize {
    if len == 0 {
        return 0;
    }

    match direction {
        Move::Up if index == 0 || index >= len => len - 1,
        Move::Up => index - 1,
        Move::Down => (index + 1) % len,
    }
}
