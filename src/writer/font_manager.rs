//! The standard Latin Type 1 fonts.
//!
//! Reports only use Helvetica, Times and Courier, which every viewer has, so
//! nothing is embedded: this module supplies their names, the metrics needed
//! to measure and wrap text, and the WinAnsi encoding their text is shown in.

use crate::error::{Error, Result};

/// Typeface family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Sans-serif; `Arial` resolves here
    Helvetica = 0,
    /// Serif
    Times = 1,
    /// Monospace
    Courier = 2,
}

impl FontFamily {
    /// Resolve a family name, ignoring case. An empty name means Helvetica.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "arial" | "helvetica" => Ok(FontFamily::Helvetica),
            "times" | "times-roman" | "times new roman" => Ok(FontFamily::Times),
            "courier" | "courier new" => Ok(FontFamily::Courier),
            other => Err(Error::Font(format!("undefined font family '{}'", other))),
        }
    }
}

/// Stroke weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Regular
    #[default]
    Normal = 0,
    /// Bold
    Bold = 1,
}

/// Style letters of `set_font`, e.g. `"BU"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    /// `B`
    pub bold: bool,
    /// `I`
    pub italic: bool,
    /// `U`
    pub underline: bool,
}

impl FontStyle {
    /// No style letters.
    pub fn regular() -> Self {
        Self::default()
    }

    /// Parse any combination of `B`, `I` and `U`, in either case.
    pub fn parse(style: &str) -> Result<Self> {
        style.chars().try_fold(Self::default(), |mut parsed, letter| {
            match letter.to_ascii_uppercase() {
                'B' => parsed.bold = true,
                'I' => parsed.italic = true,
                'U' => parsed.underline = true,
                other => return Err(Error::Font(format!("unknown style letter '{}'", other))),
            }
            Ok(parsed)
        })
    }

    /// Weight selected by the `B` letter.
    pub fn weight(&self) -> FontWeight {
        if self.bold {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        }
    }
}

/// PostScript names indexed by family, then regular/bold/italic/bold-italic.
const BASE_FONTS: [[&str; 4]; 3] = [
    ["Helvetica", "Helvetica-Bold", "Helvetica-Oblique", "Helvetica-BoldOblique"],
    ["Times-Roman", "Times-Bold", "Times-Italic", "Times-BoldItalic"],
    ["Courier", "Courier-Bold", "Courier-Oblique", "Courier-BoldOblique"],
];

const FAMILIES: [FontFamily; 3] = [FontFamily::Helvetica, FontFamily::Times, FontFamily::Courier];

/// PostScript name of a standard font.
pub fn base_font_name(family: FontFamily, weight: FontWeight, italic: bool) -> &'static str {
    BASE_FONTS[family as usize][weight as usize + 2 * italic as usize]
}

/// Vertical metrics and advance widths of one standard font, in 1/1000 em.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontInfo {
    /// Family
    pub family: FontFamily,
    /// Weight
    pub weight: FontWeight,
    /// Slanted variant
    pub italic: bool,
    /// Height above the baseline
    pub ascender: f32,
    /// Depth below the baseline (negative)
    pub descender: f32,
    /// Underline offset from the baseline (negative)
    pub underline_position: f32,
    /// Underline stroke
    pub underline_thickness: f32,
}

impl FontInfo {
    /// Metrics of the font with PostScript name `base_font`.
    pub fn of(base_font: &str) -> Option<Self> {
        FAMILIES.iter().enumerate().find_map(|(f, &family)| {
            let variant = BASE_FONTS[f].iter().position(|&name| name == base_font)?;
            let weight = if variant % 2 == 1 { FontWeight::Bold } else { FontWeight::Normal };
            Some(Self::new(family, weight, variant >= 2))
        })
    }

    fn new(family: FontFamily, weight: FontWeight, italic: bool) -> Self {
        let (ascender, descender) = match (family, weight) {
            (FontFamily::Helvetica, _) => (718.0, -207.0),
            (FontFamily::Times, FontWeight::Normal) => (683.0, -217.0),
            (FontFamily::Times, FontWeight::Bold) => (676.0, -205.0),
            (FontFamily::Courier, FontWeight::Normal) => (629.0, -157.0),
            (FontFamily::Courier, FontWeight::Bold) => (626.0, -142.0),
        };
        Self {
            family,
            weight,
            italic,
            ascender,
            descender,
            underline_position: -100.0,
            underline_thickness: 50.0,
        }
    }

    /// PostScript name.
    pub fn name(&self) -> &'static str {
        base_font_name(self.family, self.weight, self.italic)
    }

    /// Advance of `ch`.
    pub fn char_width(&self, ch: char) -> f32 {
        let table = match (self.family, self.weight) {
            (FontFamily::Courier, _) => return 600.0,
            (FontFamily::Helvetica, FontWeight::Normal) => &HELVETICA,
            (FontFamily::Helvetica, FontWeight::Bold) => &HELVETICA_BOLD,
            (FontFamily::Times, FontWeight::Normal) => &TIMES_ROMAN,
            (FontFamily::Times, FontWeight::Bold) => &TIMES_BOLD,
        };
        table.advance(ch) as f32
    }

    /// Width of `text` set at `size` pt, in points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.char_width(ch)).sum::<f32>() * size / 1000.0
    }

    /// Ascender-to-descender distance at `size` pt.
    pub fn line_height(&self, size: f32) -> f32 {
        (self.ascender - self.descender) * size / 1000.0
    }
}

/// Advances of a proportional face. Letters and digits come from the AFM
/// files; punctuation shares the Helvetica values, which are close enough
/// for layout.
struct WidthTable {
    upper: [u16; 26],
    lower: [u16; 26],
    digit: u16,
    space: u16,
}

impl WidthTable {
    fn advance(&self, ch: char) -> u16 {
        match ch {
            'A'..='Z' => self.upper[ch as usize - 'A' as usize],
            'a'..='z' => self.lower[ch as usize - 'a' as usize],
            '0'..='9' => self.digit,
            ' ' | '\u{a0}' => self.space,
            '.' | ',' | ':' | ';' | '\'' | '|' | '/' | '\\' => 278,
            '-' | '(' | ')' | '[' | ']' | '{' | '}' | '!' | '`' => 333,
            '"' => 355,
            '*' => 389,
            '+' | '=' | '<' | '>' | '~' => 584,
            '&' => 667,
            '%' => 889,
            '@' => 1015,
            '\u{2014}' | '\u{2026}' => 1000,
            _ => 556,
        }
    }
}

const HELVETICA: WidthTable = WidthTable {
    upper: [
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
        667, 611, 722, 667, 944, 667, 667, 611,
    ],
    lower: [
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
        500, 278, 556, 500, 722, 500, 500, 500,
    ],
    digit: 556,
    space: 278,
};

const HELVETICA_BOLD: WidthTable = WidthTable {
    upper: [
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
        667, 611, 722, 667, 944, 667, 667, 611,
    ],
    lower: [
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
        556, 333, 611, 556, 778, 556, 556, 500,
    ],
    digit: 556,
    space: 278,
};

const TIMES_ROMAN: WidthTable = WidthTable {
    upper: [
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
        556, 611, 722, 722, 944, 722, 722, 611,
    ],
    lower: [
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
        389, 278, 500, 500, 722, 500, 500, 444,
    ],
    digit: 500,
    space: 250,
};

const TIMES_BOLD: WidthTable = WidthTable {
    upper: [
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778, 722,
        556, 667, 722, 722, 1000, 722, 722, 667,
    ],
    lower: [
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444,
        389, 333, 556, 500, 722, 500, 500, 444,
    ],
    digit: 500,
    space: 250,
};

/// Measures and wraps text in the standard fonts.
///
/// Unknown font names are measured as Helvetica.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontManager;

impl FontManager {
    /// Metrics source for the standard fonts.
    pub const fn new() -> Self {
        FontManager
    }

    /// Metrics of `base_font`, or of Helvetica when it is not a standard font.
    pub fn metrics(&self, base_font: &str) -> FontInfo {
        FontInfo::of(base_font)
            .unwrap_or_else(|| FontInfo::new(FontFamily::Helvetica, FontWeight::Normal, false))
    }

    /// Width of `text` in points.
    pub fn text_width(&self, text: &str, base_font: &str, size: f32) -> f32 {
        self.metrics(base_font).text_width(text, size)
    }

    /// Break `text` into `(line, width)` pairs, widths in points.
    ///
    /// The first line may hold `first_width` points, later lines
    /// `max_width`. Lines break at the last space that fits, and that space is
    /// dropped; every other space is kept and measured. A word that does not
    /// fit the partial first line pushes an empty line instead; a word wider
    /// than `max_width` is split between characters. The last pair is the
    /// remainder after the final break, possibly empty.
    pub fn wrap_text(
        &self,
        text: &str,
        base_font: &str,
        size: f32,
        first_width: f32,
        max_width: f32,
    ) -> Vec<(String, f32)> {
        let metrics = self.metrics(base_font);
        // Widths are summed in glyph units (1/1000 em) like `text_width`.
        let to_units = |points: f32| points * 1000.0 / size;
        let to_points = |units: f32| units * size / 1000.0;

        let chars: Vec<char> = text.chars().collect();
        let mut lines: Vec<(String, f32)> = Vec::new();
        let mut limit = to_units(first_width);
        let mut start = 0;
        let mut i = 0;
        let mut width = 0.0;
        // Index of the last space on the line and the width before it.
        let mut space: Option<(usize, f32)> = None;

        while i < chars.len() {
            let ch = chars[i];
            if ch == ' ' {
                space = Some((i, width));
            }
            let advance = metrics.char_width(ch);
            if width + advance <= limit {
                width += advance;
                i += 1;
                continue;
            }

            if let Some((at, before)) = space {
                lines.push((chars[start..at].iter().collect(), to_points(before)));
                start = at + 1;
            } else if lines.is_empty() && first_width < max_width {
                // Retry the word at the start of the next line.
                lines.push((String::new(), 0.0));
            } else {
                if i == start {
                    // A single glyph wider than the line still has to go somewhere.
                    i += 1;
                    width = advance;
                }
                lines.push((chars[start..i].iter().collect(), to_points(width)));
                start = i;
            }
            limit = to_units(max_width);
            i = start;
            width = 0.0;
            space = None;
        }

        lines.push((chars[start..].iter().collect(), to_points(width)));
        lines
    }
}

/// Unicode code points of WinAnsi bytes 0x80 to 0x9F; 0 marks unused bytes.
const WIN_ANSI_HIGH: [u16; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        // Line breaks are escaped by the content stream writer.
        code @ (0x0A | 0x0D) => Some(code as u8),
        0 => None,
        code => WIN_ANSI_HIGH
            .iter()
            .position(|&mapped| mapped as u32 == code)
            .map(|i| 0x80 + i as u8),
    }
}

/// WinAnsi bytes of `text`, with `?` for characters the encoding lacks.
///
/// The flag is set when anything was replaced.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, bool) {
    let mut lossy = false;
    let bytes = text
        .chars()
        .map(|ch| {
            win_ansi_byte(ch).unwrap_or_else(|| {
                lossy = true;
                b'?'
            })
        })
        .collect();
    (bytes, lossy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_names() {
        assert_eq!(FontFamily::from_name("Arial").unwrap(), FontFamily::Helvetica);
        assert_eq!(FontFamily::from_name(" TIMES ").unwrap(), FontFamily::Times);
        assert_eq!(FontFamily::from_name("courier new").unwrap(), FontFamily::Courier);
        assert!(matches!(FontFamily::from_name("Comic Sans"), Err(Error::Font(_))));
    }

    #[test]
    fn test_style_letters() {
        let style = FontStyle::parse("ub").unwrap();
        assert!(style.bold && style.underline && !style.italic);
        assert_eq!(style.weight(), FontWeight::Bold);
        assert_eq!(FontStyle::parse("").unwrap(), FontStyle::regular());
        assert!(FontStyle::parse("BX").is_err());
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(base_font_name(FontFamily::Helvetica, FontWeight::Bold, false), "Helvetica-Bold");
        assert_eq!(base_font_name(FontFamily::Times, FontWeight::Normal, true), "Times-Italic");
        assert_eq!(
            base_font_name(FontFamily::Courier, FontWeight::Bold, true),
            "Courier-BoldOblique"
        );

        let info = FontInfo::of("Times-BoldItalic").unwrap();
        assert_eq!((info.family, info.weight, info.italic), (FontFamily::Times, FontWeight::Bold, true));
        assert_eq!(info.name(), "Times-BoldItalic");
        assert!(FontInfo::of("Symbol").is_none());
    }

    #[test]
    fn test_widths() {
        let fonts = FontManager::new();
        assert!((fonts.text_width("A", "Helvetica", 10.0) - 6.67).abs() < 1e-3);
        assert!((fonts.text_width("iiii", "Courier", 10.0) - 24.0).abs() < 1e-3);
        assert!(
            fonts.text_width("Quarterly", "Helvetica-Bold", 12.0)
                >= fonts.text_width("Quarterly", "Helvetica", 12.0)
        );
        // Unknown fonts fall back to Helvetica
        assert_eq!(
            fonts.text_width("Revenue", "NoSuchFont", 9.0),
            fonts.text_width("Revenue", "Helvetica", 9.0)
        );
        assert!((fonts.metrics("Helvetica").line_height(10.0) - 9.25).abs() < 1e-3);
    }

    #[test]
    fn test_win_ansi() {
        let (bytes, lossy) = encode_win_ansi("Caf\u{e9} \u{20ac}5 \u{2014}");
        assert_eq!(bytes, vec![b'C', b'a', b'f', 0xE9, b' ', 0x80, b'5', b' ', 0x97]);
        assert!(!lossy);

        let (bytes, lossy) = encode_win_ansi("\u{4e2d}");
        assert_eq!(bytes, b"?");
        assert!(lossy);
    }

    #[test]
    fn test_wrap_fills_lines() {
        let fonts = FontManager::new();
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = fonts.wrap_text(text, "Helvetica", 12.0, 100.0, 100.0);
        assert!(lines.len() > 1);
        for (line, width) in &lines {
            assert!(*width <= 100.0 || !line.contains(' '));
            assert!((fonts.text_width(line, "Helvetica", 12.0) - width).abs() < 1e-3);
        }
        let words: Vec<&str> = lines.iter().map(|(line, _)| line.as_str()).collect();
        assert_eq!(words.join(" "), text);
    }

    #[test]
    fn test_wrap_partial_first_line() {
        let fonts = FontManager::new();
        let lines = fonts.wrap_text("Overflowing", "Helvetica", 12.0, 5.0, 200.0);
        assert_eq!(lines[0], (String::new(), 0.0));
        assert_eq!(lines[1].0, "Overflowing");
    }

    #[test]
    fn test_wrap_empty_text() {
        let fonts = FontManager::new();
        assert_eq!(fonts.wrap_text("", "Helvetica", 12.0, 100.0, 100.0), vec![(String::new(), 0.0)]);
    }

    #[test]
    fn test_wrap_keeps_spaces() {
        let fonts = FontManager::new();
        let space = fonts.text_width(" ", "Helvetica", 12.0);

        let lines = fonts.wrap_text("Total: ", "Helvetica", 12.0, 100.0, 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, "Total: ");
        let bare = fonts.text_width("Total:", "Helvetica", 12.0);
        assert!((lines[0].1 - bare - space).abs() < 1e-3);

        let lines = fonts.wrap_text("  a    b", "Helvetica", 12.0, 100.0, 100.0);
        assert_eq!(lines, vec![("  a    b".to_string(), fonts.text_width("  a    b", "Helvetica", 12.0))]);
    }

    #[test]
    fn test_wrap_splits_long_word() {
        let fonts = FontManager::new();
        let word = "W".repeat(40);
        let lines = fonts.wrap_text(&word, "Helvetica", 12.0, 100.0, 100.0);
        assert!(lines.len() > 1);
        for (line, width) in &lines {
            assert!(*width <= 100.0 + 1e-3, "{} is {} pt wide", line, width);
        }
        let joined: String = lines.iter().map(|(line, _)| line.as_str()).collect();
        assert_eq!(joined, word);
    }

    #[test]
    fn test_wrap_single_glyph_wider_than_line() {
        let fonts = FontManager::new();
        let lines = fonts.wrap_text("WW", "Helvetica", 12.0, 1.0, 1.0);
        let text: Vec<&str> = lines.iter().map(|(line, _)| line.as_str()).collect();
        assert_eq!(text, vec!["W", "W", ""]);
    }
}
