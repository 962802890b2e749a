//! Generated option-set enumerations.
//!
//! `#[derive(OptionSetEnum)]` emits one [`EnumDescriptor`] per enumeration: the constant table
//! (name and CRM display label, in declaration order) plus a compiled label-to-index lookup.
//! Labels are the bridge to CRM option names; constant names are whatever identifier the
//! generator produced for them.

use std::fmt;

/// A single generated constant and the CRM option name it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: &'static str,
    pub label: &'static str,
}

/// Static metadata for one generated option-set enumeration.
#[derive(Debug)]
pub struct EnumDescriptor {
    /// Full type name, `{record_type_name}_{field}` by convention.
    pub type_name: &'static str,
    pub constants: &'static [EnumConstant],
    /// Generated label lookup; the first declared constant wins when labels repeat.
    pub index_of_label: fn(&str) -> Option<usize>,
}

impl EnumDescriptor {
    pub fn constant(&'static self, index: usize) -> Option<EnumConstantRef> {
        (index < self.constants.len()).then_some(EnumConstantRef { enum_type: self, index })
    }

    /// Constant whose display label equals `label` exactly.
    pub fn by_label(&'static self, label: &str) -> Option<EnumConstantRef> {
        (self.index_of_label)(label).and_then(|index| self.constant(index))
    }

    pub fn by_name(&'static self, name: &str) -> Option<EnumConstantRef> {
        self.constants
            .iter()
            .position(|constant| constant.name == name)
            .and_then(|index| self.constant(index))
    }

    /// Parses a constant name ignoring case; an exact-case match is preferred.
    pub fn parse_ignore_case(&'static self, name: &str) -> Option<EnumConstantRef> {
        self.by_name(name).or_else(|| {
            self.constants
                .iter()
                .position(|constant| constant.name.eq_ignore_ascii_case(name))
                .and_then(|index| self.constant(index))
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constants.iter().map(|constant| constant.label)
    }
}

/// Reference to one constant of a generated enumeration, detached from its Rust type.
#[derive(Clone, Copy)]
pub struct EnumConstantRef {
    enum_type: &'static EnumDescriptor,
    index: usize,
}

impl EnumConstantRef {
    pub fn enum_type(&self) -> &'static EnumDescriptor {
        self.enum_type
    }

    pub fn type_name(&self) -> &'static str {
        self.enum_type.type_name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &'static str {
        self.enum_type.constants[self.index].name
    }

    pub fn label(&self) -> &'static str {
        self.enum_type.constants[self.index].label
    }
}

impl PartialEq for EnumConstantRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.index == other.index
    }
}

impl Eq for EnumConstantRef {}

impl fmt::Debug for EnumConstantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.type_name(), self.name())
    }
}

impl fmt::Display for EnumConstantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Implemented by `#[derive(OptionSetEnum)]`.
pub trait OptionSetEnum: Copy + 'static {
    const DESCRIPTOR: &'static EnumDescriptor;

    fn from_index(index: usize) -> Option<Self>;

    fn index(self) -> usize;

    fn constant(self) -> EnumConstantRef {
        EnumConstantRef {
            enum_type: Self::DESCRIPTOR,
            index: self.index(),
        }
    }

    fn label(self) -> &'static str {
        Self::DESCRIPTOR.constants[self.index()].label
    }

    fn from_label(label: &str) -> Option<Self> {
        (Self::DESCRIPTOR.index_of_label)(label).and_then(Self::from_index)
    }

    /// Converts a detached constant back into this enumeration, if it belongs to it.
    fn from_constant(constant: EnumConstantRef) -> Option<Self> {
        if constant.type_name() == Self::DESCRIPTOR.type_name {
            Self::from_index(constant.index())
        } else {
            None
        }
    }
}
