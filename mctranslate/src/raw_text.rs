//! Conversion between section-sign formatted text (`§a§lHello`) and JSON
//! text components (`[{"text":"Hello","bold":true,"color":"green"}]`).
//!
//! Bedrock stores formatted text with section codes, Java with JSON
//! components. Only colour and the five style flags carry over; anything
//! else in a component is dropped.

use serde::Serialize;
use serde_json::Value;

const COLOURS: [(char, &str); 16] = [
    ('0', "black"),
    ('1', "dark_blue"),
    ('2', "dark_green"),
    ('3', "dark_aqua"),
    ('4', "dark_red"),
    ('5', "dark_purple"),
    ('6', "gold"),
    ('7', "gray"),
    ('8', "dark_gray"),
    ('9', "blue"),
    ('a', "green"),
    ('b', "aqua"),
    ('c', "red"),
    ('d', "light_purple"),
    ('e', "yellow"),
    ('f', "white"),
];

fn colour_for_code(code: char) -> Option<&'static str> {
    COLOURS.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
}

fn code_for_colour(name: &str) -> Option<char> {
    COLOURS.iter().find(|(_, n)| *n == name).map(|(code, _)| *code)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Style {
    colour: Option<&'static str>,
    obfuscated: bool,
    bold: bool,
    italic: bool,
    strikethrough: bool,
    underlined: bool,
}

impl Style {
    fn is_plain(&self) -> bool {
        *self == Style::default()
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Serialize)]
#[serde(untagged)]
enum Component {
    Plain(String),
    Styled {
        text: String,
        #[serde(skip_serializing_if = "is_false")]
        obfuscated: bool,
        #[serde(skip_serializing_if = "is_false")]
        bold: bool,
        #[serde(skip_serializing_if = "is_false")]
        italic: bool,
        #[serde(skip_serializing_if = "is_false")]
        strikethrough: bool,
        #[serde(skip_serializing_if = "is_false")]
        underlined: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<&'static str>,
    },
}

impl Component {
    fn new(text: String, style: Style) -> Self {
        if style.is_plain() {
            return Component::Plain(text);
        }
        Component::Styled {
            text,
            obfuscated: style.obfuscated,
            bold: style.bold,
            italic: style.italic,
            strikethrough: style.strikethrough,
            underlined: style.underlined,
            color: style.colour,
        }
    }
}

/// One line of section-sign text as a JSON array of components.
///
/// An unknown code drops its section sign and is kept as text.
pub fn section_to_raw_text(section: &str) -> String {
    let mut style = Style::default();
    let mut buffer = String::new();
    let mut components = Vec::new();
    let mut chars = section.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '§' {
            buffer.push(c);
            continue;
        }
        if !buffer.is_empty() {
            components.push(Component::new(std::mem::take(&mut buffer), style));
        }
        let Some(&code) = chars.peek() else {
            break;
        };
        match code {
            'k' => style.obfuscated = true,
            'l' => style.bold = true,
            'm' => style.strikethrough = true,
            'n' => style.underlined = true,
            'o' => style.italic = true,
            'r' => style = Style::default(),
            other => match colour_for_code(other) {
                Some(colour) => style.colour = Some(colour),
                None => continue,
            },
        }
        chars.next();
    }
    if !buffer.is_empty() {
        components.push(Component::new(buffer, style));
    }

    serde_json::to_string(&components).unwrap_or_else(|_| "[]".to_string())
}

/// Multi-line section-sign text as one JSON component array per line.
pub fn section_to_raw_text_lines(section: &str) -> Vec<String> {
    section.split('\n').map(section_to_raw_text).collect()
}

/// JSON text components as section-sign text.
///
/// Text that is not valid JSON converts to the empty string.
pub fn raw_text_to_section(raw_text: &str) -> String {
    let parts = match serde_json::from_str::<Value>(raw_text) {
        Ok(value) => flatten(&value),
        Err(_) => return String::new(),
    };

    let mut style = Style::default();
    let mut out = String::new();
    for part in &parts {
        let flag = |key: &str| part.get(key).and_then(Value::as_bool).unwrap_or(false);
        let wanted = Style {
            colour: part
                .get("color")
                .and_then(Value::as_str)
                .and_then(|name| code_for_colour(name).and_then(colour_for_code)),
            obfuscated: flag("obfuscated"),
            bold: flag("bold"),
            italic: flag("italic"),
            strikethrough: flag("strikethrough"),
            underlined: flag("underlined"),
        };
        let has_colour = part.get("color").is_some();

        // Section codes can only switch styles on, so turning anything off
        // needs a reset first.
        let dropped = (style.obfuscated && !wanted.obfuscated)
            || (style.bold && !wanted.bold)
            || (style.italic && !wanted.italic)
            || (style.strikethrough && !wanted.strikethrough)
            || (style.underlined && !wanted.underlined);
        if (!has_colour && style.colour.is_some())
            || (has_colour && wanted.colour.is_none())
            || dropped
        {
            style = Style::default();
            out.push_str("§r");
        }

        if wanted.colour.is_some() && style.colour != wanted.colour {
            style.colour = wanted.colour;
            if let Some(code) = wanted.colour.and_then(code_for_colour) {
                out.push('§');
                out.push(code);
            }
        }
        for (on, current, code) in [
            (wanted.obfuscated, &mut style.obfuscated, 'k'),
            (wanted.bold, &mut style.bold, 'l'),
            (wanted.italic, &mut style.italic, 'o'),
            (wanted.strikethrough, &mut style.strikethrough, 'm'),
            (wanted.underlined, &mut style.underlined, 'n'),
        ] {
            if on && !*current {
                *current = true;
                out.push('§');
                out.push(code);
            }
        }

        if let Some(text) = part.get("text").and_then(Value::as_str) {
            out.push_str(text);
        }
    }
    out
}

/// Several lines of JSON text components joined with newlines.
pub fn raw_text_lines_to_section<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| raw_text_to_section(line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flatten a component tree into its components in reading order.
fn flatten(value: &Value) -> Vec<serde_json::Map<String, Value>> {
    match value {
        Value::String(text) => {
            let mut part = serde_json::Map::new();
            part.insert("text".to_string(), Value::String(text.clone()));
            vec![part]
        }
        Value::Array(items) => items.iter().flat_map(flatten).collect(),
        Value::Object(object) => {
            let mut parts = vec![object.clone()];
            if let Some(extra) = object.get("extra") {
                parts.extend(flatten(extra));
            }
            parts
        }
        _ => vec![serde_json::Map::new()],
    }
}
