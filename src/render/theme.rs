use plotters::prelude::*;

pub const FONT_FAMILY: &str = "sans-serif";

pub const BACKGROUND: RGBColor = RGBColor(0x2E, 0x2E, 0x2E);
pub const FOREGROUND: RGBColor = WHITE;
pub const WAVEFORM: RGBColor = RGBColor(0x8D, 0xD3, 0xC7);
pub const ZCR_LINE: RGBColor = CYAN;
pub const BAR_COLORS: [RGBColor; 3] = [BLUE, GREEN, RED];

pub fn suptitle_font() -> TextStyle<'static> {
    (FONT_FAMILY, 28).into_font().color(&FOREGROUND)
}

pub fn title_font() -> TextStyle<'static> {
    (FONT_FAMILY, 20).into_font().color(&FOREGROUND)
}

pub fn label_font() -> TextStyle<'static> {
    (FONT_FAMILY, 14).into_font().color(&FOREGROUND)
}

pub fn big_text_font() -> TextStyle<'static> {
    (FONT_FAMILY, 26).into_font().color(&FOREGROUND)
}
