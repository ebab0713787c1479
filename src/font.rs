// Copyright (c) 2026 rezky_nightky

use std::fs;
use std::io;
use std::path::PathBuf;

use crossterm::style::Color;
use thiserror::Error;

use crate::cell::Cell;
use crate::grid::SYMBOL_COUNT;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("glyph size must be at least 1 pixel")]
    ZeroSize,
    #[error("cannot open font asset `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("font asset `{path}` contains no glyphs")]
    Empty { path: PathBuf },
}

pub const FACES: &[(&str, &str)] = &[
    ("auto", "matrix on UTF-8 terminals, latin otherwise"),
    ("matrix", "Half-width katakana + digits"),
    ("latin", "Lowercase a-z"),
    ("katakana", "Half-width katakana"),
    ("cyrillic", "Lowercase Cyrillic"),
    ("runic", "Runic"),
    ("binary", "0 and 1"),
    ("dna", "DNA bases (ACGT)"),
];

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}

fn builtin_face(name: &str, default_to_ascii: bool) -> Option<Vec<char>> {
    let mut out = Vec::with_capacity(SYMBOL_COUNT as usize);
    match name.trim().to_ascii_lowercase().as_str() {
        "auto" => return builtin_face(if default_to_ascii { "latin" } else { "matrix" }, false),
        "matrix" => {
            push_range(&mut out, 0xFF66, 0xFF75);
            push_range(&mut out, 0x30, 0x39);
        }
        "latin" => push_range(&mut out, 0x61, 0x7A),
        "katakana" => push_range(&mut out, 0xFF66, 0xFF7F),
        "cyrillic" => push_range(&mut out, 0x0430, 0x0449),
        "runic" => push_range(&mut out, 0x16A0, 0x16B9),
        "binary" | "bin" | "01" => push_range(&mut out, 0x30, 0x31),
        "dna" => out.extend("ACGT".chars()),
        _ => return None,
    }
    Some(out)
}

#[derive(Clone, Debug)]
pub struct Font {
    name: String,
    size: u16,
    glyphs: Vec<char>,
}

impl Font {
    /// `asset` is either a built-in face name or a path to a UTF-8 glyph
    /// sheet whose non-whitespace characters form the alphabet.
    pub fn open(asset: &str, size: u16, default_to_ascii: bool) -> Result<Self, FontError> {
        if size == 0 {
            return Err(FontError::ZeroSize);
        }

        let glyphs = match builtin_face(asset, default_to_ascii) {
            Some(g) => g,
            None => {
                let path = PathBuf::from(asset);
                let text = fs::read_to_string(&path).map_err(|source| FontError::Read {
                    path: path.clone(),
                    source,
                })?;
                let glyphs: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
                if glyphs.is_empty() {
                    return Err(FontError::Empty { path });
                }
                glyphs
            }
        };

        Ok(Self {
            name: asset.to_string(),
            size,
            glyphs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn glyph(&self, symbol: u8) -> char {
        self.glyphs[symbol as usize % self.glyphs.len()]
    }

    pub fn render(&self, symbol: u8, fg: Option<Color>, bg: Option<Color>, bold: bool) -> Cell {
        Cell {
            ch: self.glyph(symbol),
            fg,
            bg,
            bold,
        }
    }
}

pub fn print_list_faces() {
    println!("AVAILABLE FONT FACES:");
    println!("NOTE: --font also accepts a path to a UTF-8 glyph sheet.");
    println!();
    println!("VALUE        DESCRIPTION");
    for (name, desc) in FACES {
        println!("{:<12} {}", name, desc);
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn builtin_faces_cover_the_alphabet() {
        for face in ["matrix", "latin", "katakana", "cyrillic", "runic"] {
            let f = Font::open(face, 12, false).unwrap();
            assert_eq!(f.glyphs.len(), SYMBOL_COUNT as usize, "{face}");
        }
    }

    #[test]
    fn latin_maps_symbols_to_lowercase() {
        let f = Font::open("latin", 12, false).unwrap();
        assert_eq!(f.glyph(0), 'a');
        assert_eq!(f.glyph(25), 'z');
    }

    #[test]
    fn auto_face_falls_back_to_latin_without_utf8() {
        let f = Font::open("auto", 12, true).unwrap();
        assert_eq!(f.glyph(1), 'b');
        let f = Font::open("AUTO", 12, false).unwrap();
        assert_eq!(f.glyph(0), '\u{FF66}');
    }

    #[test]
    fn short_faces_repeat() {
        let f = Font::open("binary", 12, false).unwrap();
        assert_eq!(f.glyph(0), '0');
        assert_eq!(f.glyph(3), '1');
        assert_eq!(f.glyph(24), '0');
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            Font::open("latin", 0, false),
            Err(FontError::ZeroSize)
        ));
    }

    #[test]
    fn missing_asset_reports_path() {
        let err = Font::open("/nonexistent/matrix-norfok.ttf", 12, false).unwrap_err();
        assert!(matches!(err, FontError::Read { .. }));
        assert!(err.to_string().contains("matrix-norfok.ttf"));
    }

    #[test]
    fn glyph_sheet_skips_whitespace() {
        let path = env::temp_dir().join(format!("glyphrain-sheet-{}.txt", std::process::id()));
        fs::write(&path, "x y\nz\n").unwrap();
        let f = Font::open(path.to_str().unwrap(), 12, false).unwrap();
        assert_eq!((f.glyph(0), f.glyph(1), f.glyph(2), f.glyph(3)), ('x', 'y', 'z', 'x'));

        fs::write(&path, " \n\t").unwrap();
        let err = Font::open(path.to_str().unwrap(), 12, false).unwrap_err();
        assert!(matches!(err, FontError::Empty { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn render_carries_style() {
        let f = Font::open("latin", 12, false).unwrap();
        let c = f.render(2, Some(Color::Green), None, true);
        assert_eq!(c.ch, 'c');
        assert_eq!(c.fg, Some(Color::Green));
        assert!(c.bold);
    }
}
