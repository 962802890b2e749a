use colored::Color;
use comfy_table::Color as CellColor;
use crmbridge::NativeValue;
use once_cell::sync::Lazy;

/// Colors for every role a piece of terminal output can play.
pub struct Palette {
    pub ok: Color,
    pub failure: Color,
    pub caution: Color,
    pub note: Color,
    pub title: Color,
    pub faint: Color,
    pub command: Color,
    pub label: Color,
    pub text: Color,
}

impl Palette {
    fn standard() -> Self {
        Self {
            ok: Color::Green,
            failure: Color::Red,
            caution: Color::Yellow,
            note: Color::Blue,
            title: Color::BrightBlue,
            faint: Color::BrightBlack,
            command: Color::Magenta,
            label: Color::BrightCyan,
            text: Color::White,
        }
    }

    /// Cell color for a payload entry, keyed on the kind of native value it holds.
    pub fn native_value(&self, value: &NativeValue) -> CellColor {
        match value {
            NativeValue::Null => CellColor::DarkGrey,
            NativeValue::OptionCode(_) => CellColor::Magenta,
            NativeValue::Money(_) => CellColor::Green,
            NativeValue::Reference(_) => CellColor::Cyan,
            NativeValue::Scalar(_) => CellColor::Reset,
        }
    }
}

pub static PALETTE: Lazy<Palette> = Lazy::new(Palette::standard);

/// Leading glyphs for status lines and example listings.
pub struct Glyphs {
    pub ok: &'static str,
    pub failure: &'static str,
    pub caution: &'static str,
    pub note: &'static str,
    pub pointer: &'static str,
}

pub const GLYPHS: Glyphs = Glyphs {
    ok: "✓",
    failure: "✗",
    caution: "⚠",
    note: "ℹ",
    pointer: "→",
};
