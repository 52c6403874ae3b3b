//! Compile-time attributes recognized on declarations (§6).
//!
//! The closed set named in the spec; anything else parses into
//! `Attribute::Unknown` and only ever produces a warning (§6: "Unknown
//! attributes warn but do not fail").

/// A single `[attr]` or `[attr: value]` annotation on a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    Pub,
    Mut,
    Deprecated(Option<String>),
    NoReturn,
    Unsafe,
    Inline,
    If(String),
    KeepAlive,
    Console,
    SingleImpl,
    Heap,
    Flag,
    Json(String),
    Required,
    Skip,
    Unknown(String),
}

/// The attributes attached to one declaration, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet(pub Vec<Attribute>);

impl AttributeSet {
    pub fn new(attrs: Vec<Attribute>) -> Self {
        Self(attrs)
    }

    pub fn is_pub(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Pub))
    }

    pub fn is_unsafe(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Unsafe))
    }

    pub fn is_noreturn(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::NoReturn))
    }

    pub fn is_single_impl(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::SingleImpl))
    }

    pub fn is_flag(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Flag))
    }

    pub fn is_heap(&self) -> bool {
        self.0.iter().any(|a| matches!(a, Attribute::Heap))
    }

    pub fn deprecated_message(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Attribute::Deprecated(msg) => Some(msg.as_deref().unwrap_or("")),
            _ => None,
        })
    }

    pub fn if_tag(&self) -> Option<&str> {
        self.0.iter().find_map(|a| match a {
            Attribute::If(tag) => Some(tag.as_str()),
            _ => None,
        })
    }

    pub fn unknown_attrs(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|a| match a {
            Attribute::Unknown(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "tests/attrs.rs"]
mod tests;
