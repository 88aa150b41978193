use std::fmt::Debug;
use std::io::IsTerminal;

/// What a piece of output text means, independent of how it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Title line and section labels.
    Heading,
    /// Field labels and header/cookie names.
    Label,
    /// JSON object keys.
    Key,
    /// Numbers and booleans.
    Scalar,
    /// Every other value.
    Text,
    /// Literal placeholders such as `[no content]`.
    Marker,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Heading => "heading",
            Role::Label => "label",
            Role::Key => "key",
            Role::Scalar => "scalar",
            Role::Text => "text",
            Role::Marker => "marker",
        }
    }
}

/// Pick the value role for a plain string taken from the archive.
pub fn value_role(value: &str) -> Role {
    let is_number = value.parse::<f64>().is_ok();
    let is_bool = value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false");

    if is_number || is_bool {
        Role::Scalar
    } else {
        Role::Text
    }
}

pub trait Decorator: Debug {
    fn paint(&self, role: Role, text: &str) -> String;

    fn value(&self, value: &str) -> String {
        self.paint(value_role(value), value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecorator;

impl Decorator for PlainDecorator {
    fn paint(&self, _role: Role, text: &str) -> String {
        text.to_string()
    }
}

/// Colors roles with SGR escape sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDecorator;

impl AnsiDecorator {
    fn code(role: Role) -> &'static str {
        match role {
            Role::Heading => "33",
            Role::Label => "90",
            Role::Key => "34",
            Role::Scalar => "33",
            Role::Text => "36",
            Role::Marker => "2",
        }
    }
}

impl Decorator for AnsiDecorator {
    fn paint(&self, role: Role, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        format!("\x1b[{}m{text}\x1b[0m", Self::code(role))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "auto" => Some(ColorChoice::Auto),
            "always" => Some(ColorChoice::Always),
            "never" => Some(ColorChoice::Never),
            _ => None,
        }
    }

    /// Resolve `Auto` against stdout and the `NO_COLOR` convention.
    pub fn use_color(&self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }

    pub fn decorator(&self) -> Box<dyn Decorator> {
        if self.use_color() {
            Box::new(AnsiDecorator)
        } else {
            Box::new(PlainDecorator)
        }
    }
}
