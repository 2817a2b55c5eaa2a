//! Console palette and pen attributes
//!
//! A pen is the byte-sized attribute stored per cell in the attribute plane:
//! foreground in the low nibble, background in the high nibble.

use std::fmt;

/// DOS/console color palette (16 colors)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    LightMagenta = 13,
    Yellow = 14,
    White = 15,
}

const PALETTE: [Color; 16] = [
    Color::Black, Color::Blue, Color::Green, Color::Cyan,
    Color::Red, Color::Magenta, Color::Brown, Color::LightGray,
    Color::DarkGray, Color::LightBlue, Color::LightGreen, Color::LightCyan,
    Color::LightRed, Color::LightMagenta, Color::Yellow, Color::White,
];

impl Color {
    /// Palette entry for the low four bits of `nibble`
    pub fn from_nibble(nibble: u8) -> Color {
        PALETTE[(nibble & 0x0F) as usize]
    }

    /// RGB values of the CGA/EGA text-mode palette
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Black => (0x00, 0x00, 0x00),
            Color::Blue => (0x00, 0x00, 0xAA),
            Color::Green => (0x00, 0xAA, 0x00),
            Color::Cyan => (0x00, 0xAA, 0xAA),
            Color::Red => (0xAA, 0x00, 0x00),
            Color::Magenta => (0xAA, 0x00, 0xAA),
            Color::Brown => (0xAA, 0x55, 0x00),
            Color::LightGray => (0xAA, 0xAA, 0xAA),
            Color::DarkGray => (0x55, 0x55, 0x55),
            Color::LightBlue => (0x55, 0x55, 0xFF),
            Color::LightGreen => (0x55, 0xFF, 0x55),
            Color::LightCyan => (0x55, 0xFF, 0xFF),
            Color::LightRed => (0xFF, 0x55, 0x55),
            Color::LightMagenta => (0xFF, 0x55, 0xFF),
            Color::Yellow => (0xFF, 0xFF, 0x55),
            Color::White => (0xFF, 0xFF, 0xFF),
        }
    }

    /// ANSI SGR foreground parameters (true color)
    pub fn to_fg_sgr(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("38;2;{};{};{}", r, g, b)
    }

    /// ANSI SGR background parameters (true color)
    pub fn to_bg_sgr(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("48;2;{};{};{}", r, g, b)
    }
}

/// Composed foreground/background attribute
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pen(u8);

impl Pen {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Pen(foreground as u8 | (background as u8) << 4)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Pen(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn foreground(self) -> Color {
        Color::from_nibble(self.0)
    }

    pub fn background(self) -> Color {
        Color::from_nibble(self.0 >> 4)
    }

    /// Full SGR sequence selecting this pen's colors
    pub fn to_sgr(self) -> String {
        format!("\x1b[{};{}m", self.foreground().to_fg_sgr(), self.background().to_bg_sgr())
    }
}

impl Default for Pen {
    /// Light gray on black, the usual console start-up attribute
    fn default() -> Self {
        Pen::new(Color::LightGray, Color::Black)
    }
}

impl fmt::Debug for Pen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pen({:#04x}: {:?} on {:?})", self.0, self.foreground(), self.background())
    }
}
