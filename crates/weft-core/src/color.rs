//! Color type for terminal cells.

/// A terminal color.
///
/// The set is closed: the eight base ANSI colors plus the terminal's
/// default. Foregrounds map to SGR 30-37 (39 for default), backgrounds
/// to SGR 40-47 (49 for default).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    /// Terminal default color.
    #[default]
    Default,
    /// Black (SGR 30/40).
    Black,
    /// Red (SGR 31/41).
    Red,
    /// Green (SGR 32/42).
    Green,
    /// Yellow (SGR 33/43).
    Yellow,
    /// Blue (SGR 34/44).
    Blue,
    /// Magenta (SGR 35/45).
    Magenta,
    /// Cyan (SGR 36/46).
    Cyan,
    /// White (SGR 37/47).
    White,
}

impl Color {
    /// SGR code for this color as a foreground.
    pub const fn fg_code(self) -> u8 {
        match self {
            Color::Default => 39,
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::White => 37,
        }
    }

    /// SGR code for this color as a background.
    pub const fn bg_code(self) -> u8 {
        self.fg_code() + 10
    }
}
