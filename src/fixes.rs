//! Text repair for raw corpus lines
//!
//! Two levels of cleanup are offered:
//!
//! - [`quick_fix`]: decodes HTML character references. It runs on every line
//!   by default and never changes anything else.
//! - [`fix_text`]: the full repair. Mojibake, control characters, ligatures,
//!   full-width forms, curly quotes and line breaks are handled, and the
//!   result is NFC-normalized.
//!
//! Broken UTF-8 never reaches these functions: lines are decoded lossily when
//! read (see [`crate::corpus_io`]), so undecodable bytes and stray surrogates
//! are already U+FFFD here.

use crate::config::TextFixerConfig;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static HTML_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]{1,31}));")
        .unwrap()
});

static ANSI_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap());

/// Named references worth decoding in web-scraped text.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("shy", "\u{ad}"),
    ("copy", "©"),
    ("reg", "®"),
    ("trade", "™"),
    ("deg", "°"),
    ("plusmn", "±"),
    ("middot", "·"),
    ("para", "¶"),
    ("sect", "§"),
    ("laquo", "«"),
    ("raquo", "»"),
    ("lsquo", "‘"),
    ("rsquo", "’"),
    ("sbquo", "‚"),
    ("ldquo", "“"),
    ("rdquo", "”"),
    ("bdquo", "„"),
    ("ndash", "–"),
    ("mdash", "—"),
    ("hellip", "…"),
    ("bull", "•"),
    ("euro", "€"),
    ("pound", "£"),
    ("yen", "¥"),
    ("cent", "¢"),
    ("times", "×"),
    ("divide", "÷"),
    ("iexcl", "¡"),
    ("iquest", "¿"),
    ("aacute", "á"),
    ("eacute", "é"),
    ("iacute", "í"),
    ("oacute", "ó"),
    ("uacute", "ú"),
    ("agrave", "à"),
    ("egrave", "è"),
    ("ograve", "ò"),
    ("acirc", "â"),
    ("ecirc", "ê"),
    ("ocirc", "ô"),
    ("auml", "ä"),
    ("euml", "ë"),
    ("ouml", "ö"),
    ("uuml", "ü"),
    ("Auml", "Ä"),
    ("Ouml", "Ö"),
    ("Uuml", "Ü"),
    ("Eacute", "É"),
    ("ntilde", "ñ"),
    ("Ntilde", "Ñ"),
    ("ccedil", "ç"),
    ("Ccedil", "Ç"),
    ("szlig", "ß"),
    ("aring", "å"),
    ("Aring", "Å"),
    ("aelig", "æ"),
    ("oslash", "ø"),
];

/// Windows-1252 bytes 0x80..=0x9F that decode to something other than a C1
/// control character.
const CP1252_HIGH: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Decode HTML character references such as `&amp;`, `&#233;` and `&#xE9;`.
///
/// Unknown names, malformed references and numeric references that do not
/// name a usable character are left untouched.
///
/// # Example
///
/// ```
/// use exquisite_corpus::fixes::unescape_html;
/// assert_eq!(unescape_html("fish &amp; chips"), "fish & chips");
/// assert_eq!(unescape_html("&#233;t&#xE9;"), "été");
/// ```
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    HTML_ENTITY_RE.replace_all(text, |caps: &Captures| {
        let decoded = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(codepoint_to_char)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(codepoint_to_char)
        } else {
            caps.get(3).and_then(|name| {
                NAMED_ENTITIES
                    .iter()
                    .find(|(entity, _)| *entity == name.as_str())
                    .map(|(_, value)| value.to_string())
            })
        };
        decoded.unwrap_or_else(|| caps[0].to_string())
    })
}

fn codepoint_to_char(codepoint: u32) -> Option<String> {
    if codepoint == 0 {
        return None;
    }
    char::from_u32(codepoint).map(String::from)
}

/// The cheap cleanup applied to every line unless full repair is requested.
pub fn quick_fix(text: &str) -> String {
    unescape_html(text).into_owned()
}

/// Run the full text repair.
///
/// The result may contain `\n`; line-oriented callers must replace it.
///
/// # Example
///
/// ```
/// use exquisite_corpus::config::TextFixerConfig;
/// use exquisite_corpus::fixes::fix_text;
///
/// let config = TextFixerConfig::default();
/// assert_eq!(fix_text("The Mona Lisa doesnÃ¢â‚¬â„¢t have eyebrows.", &config),
///            "The Mona Lisa doesn't have eyebrows.");
/// ```
pub fn fix_text(text: &str, config: &TextFixerConfig) -> String {
    let mut text = text.to_string();

    if config.remove_terminal_escapes && text.contains('\x1b') {
        text = ANSI_ESCAPE_RE.replace_all(&text, "").into_owned();
    }
    // Text with angle brackets is probably HTML source, whose entities
    // are meant to stay escaped.
    if config.unescape_html && !text.contains('<') {
        text = unescape_html(&text).into_owned();
    }
    if config.fix_encoding {
        // Double-encoded text needs more than one pass.
        for _ in 0..3 {
            let fixed = fix_encoding(&text);
            if fixed == text {
                break;
            }
            text = fixed;
        }
    }
    if config.fix_latin_ligatures {
        text = fix_latin_ligatures(&text);
    }
    if config.fix_character_width {
        text = fix_character_width(&text);
    }
    if config.uncurl_quotes {
        text = uncurl_quotes(&text);
    }
    if config.fix_line_breaks {
        text = fix_line_breaks(&text);
    }
    if config.remove_control_chars {
        text = remove_control_chars(&text);
    }
    if config.normalize {
        text = text.nfc().collect();
    }
    text
}

/// Repair text that was encoded as UTF-8 but decoded as Windows-1252 or
/// Latin-1.
///
/// Mojibake is found one sequence at a time: a character standing for a
/// UTF-8 lead byte followed by as many characters standing for continuation
/// bytes as the lead byte announces. Each such sequence is replaced by the
/// character its bytes decode to. Everything else, including correctly
/// decoded Latin-1 letters on the same line, is kept as is.
///
/// # Example
///
/// ```
/// use exquisite_corpus::fixes::fix_encoding;
/// assert_eq!(fix_encoding("naïve cafÃ©"), "naïve café");
/// ```
pub fn fix_encoding(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let bytes: Vec<Option<u8>> = chars.iter().map(|&ch| single_byte_encode(ch)).collect();

    let mut result = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if let Some((decoded, width)) = decode_sequence(&bytes[i..]) {
            result.push(decoded);
            i += width;
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }
    result
}

/// Decode one UTF-8 sequence from the start of `bytes`, returning the
/// character and the number of bytes it took.
fn decode_sequence(bytes: &[Option<u8>]) -> Option<(char, usize)> {
    let lead = bytes.first().copied().flatten()?;
    let width = match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    if bytes.len() < width {
        return None;
    }
    let mut sequence = Vec::with_capacity(width);
    for byte in &bytes[..width] {
        sequence.push((*byte)?);
    }
    if !sequence[1..].iter().all(|byte| (0x80..=0xBF).contains(byte)) {
        return None;
    }
    // Overlong forms and surrogates are rejected here
    let decoded = std::str::from_utf8(&sequence).ok()?;
    decoded.chars().next().map(|ch| (ch, width))
}

fn single_byte_encode(ch: char) -> Option<u8> {
    let code = ch as u32;
    // Latin-1 covers U+0000..=U+00FF, C1 controls included
    if code <= 0xFF {
        return Some(code as u8);
    }
    CP1252_HIGH
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, byte)| *byte)
}

/// Expand the Latin ligatures U+FB00..=U+FB06 (ﬁ, ﬂ, ...).
pub fn fix_latin_ligatures(text: &str) -> String {
    expand_compat(text, |ch| ('\u{FB00}'..='\u{FB06}').contains(&ch))
}

/// Fold full-width and half-width forms to their usual width.
pub fn fix_character_width(text: &str) -> String {
    expand_compat(text, |ch| {
        ch == '\u{3000}' || ('\u{FF01}'..='\u{FFEE}').contains(&ch)
    })
}

fn expand_compat(text: &str, selected: impl Fn(char) -> bool) -> String {
    if !text.chars().any(&selected) {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if selected(ch) {
            result.extend(std::iter::once(ch).nfkc());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Replace curly quotes with straight ones.
pub fn uncurl_quotes(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{02BC}' | '\u{2018}'..='\u{201B}' => '\'',
            '\u{201C}'..='\u{201F}' => '"',
            other => other,
        })
        .collect()
}

/// Turn every line-break convention into `\n`.
pub fn fix_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|ch| match ch {
            '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}' => '\n',
            other => other,
        })
        .collect()
}

/// Remove control and formatting characters that have no place in text.
///
/// Tab, newline, carriage return and form feed are kept.
pub fn remove_control_chars(text: &str) -> String {
    text.chars().filter(|&ch| !is_junk_control(ch)).collect()
}

fn is_junk_control(ch: char) -> bool {
    matches!(
        ch,
        '\u{0000}'..='\u{0008}'
            | '\u{000B}'
            | '\u{000E}'..='\u{001F}'
            | '\u{007F}'..='\u{009F}'
            | '\u{206A}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFC}'
            | '\u{1D173}'..='\u{1D17A}'
    )
}
