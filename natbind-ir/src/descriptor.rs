//! Descriptors produced by the extractor from marked declarations.

use crate::{FormatArg, Location, MemberDecl, TypeHandle};

/// Kind of access a native symbol binding provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Resolved to `Getter` or `Setter` from the member signature.
    Auto,
    Getter,
    Setter,
    Reference,
    /// A raw value outside the known kinds.
    Unknown(i32),
}

impl AccessKind {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => AccessKind::Auto,
            1 => AccessKind::Getter,
            2 => AccessKind::Setter,
            3 => AccessKind::Reference,
            other => AccessKind::Unknown(other),
        }
    }

    /// Parse the enum member name used by the marker attribute.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Auto" | "auto" => Some(AccessKind::Auto),
            "Getter" | "getter" => Some(AccessKind::Getter),
            "Setter" | "setter" => Some(AccessKind::Setter),
            "Reference" | "reference" => Some(AccessKind::Reference),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            AccessKind::Auto => 0,
            AccessKind::Getter => 1,
            AccessKind::Setter => 2,
            AccessKind::Reference => 3,
            AccessKind::Unknown(raw) => raw,
        }
    }
}

/// Storage slot shared by every binding to one (library, condition, symbol) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    /// Index of the library group, in registration order.
    pub library: u32,
    /// Index of the slot within its library, in registration order.
    pub symbol: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingVariant {
    Symbol { kind: AccessKind },
    Function { call_convs: Vec<TypeHandle> },
}

/// A request to bind a partial method to a native symbol or function.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDescriptor {
    pub library: TypeHandle,
    pub condition: Option<TypeHandle>,
    pub symbol_name: String,
    /// Assigned by the grouping engine once the binding is accepted.
    pub slot: Option<SlotId>,
    pub target: MemberDecl,
    pub variant: BindingVariant,
    pub location: Option<Location>,
}

impl BindingDescriptor {
    /// Access kind for symbol bindings, `None` for function bindings.
    pub fn access_kind(&self) -> Option<AccessKind> {
        match &self.variant {
            BindingVariant::Symbol { kind } => Some(*kind),
            BindingVariant::Function { .. } => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.variant, BindingVariant::Function { .. })
    }
}

/// Culture used to evaluate a formatted constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatCulture {
    #[default]
    Default,
    Invariant,
}

impl FormatCulture {
    /// Unrecognized values fall back to [`FormatCulture::Default`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => FormatCulture::Invariant,
            _ => FormatCulture::Default,
        }
    }
}

/// Return shape of a formatted constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    String,
    NullableString,
    SpanOfChar,
    SpanOfBytes,
}

/// A request to replace a partial member with a pre-formatted literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDescriptor {
    pub format: Option<String>,
    pub args: Vec<FormatArg>,
    pub culture: FormatCulture,
    pub target: MemberDecl,
    pub is_property: bool,
    /// Set once the target signature has been validated.
    pub return_kind: Option<ReturnKind>,
    pub location: Option<Location>,
}
