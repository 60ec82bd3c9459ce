//! Type shapes resolved from runtime metadata
//!
//! A [`TypeDescriptor`] describes one level of a type. Children are referenced
//! through [`TypeRef`] and resolved on demand, so recursive runtime types (a
//! `Call` containing a `Vec<Call>`) never get inlined.

use std::fmt;

/// Reference to a type in a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    /// Legacy (V12/V13) type expression, e.g. `Compact<T::Balance>`
    Named(String),
    /// Portable (V14) type id
    Id(u32),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Id(id) => write!(f, "#{}", id),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }
}

/// Leaf types with a fixed wire representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    /// 256-bit integers are carried as raw little-endian bytes
    U256,
    I256,
    Char,
    Str,
    /// 32-byte account id, rendered as an SS58 address
    AccountId32,
}

impl Primitive {
    /// Byte width for fixed-size integers
    pub fn int_width(self) -> Option<usize> {
        match self {
            Primitive::U8 | Primitive::I8 => Some(1),
            Primitive::U16 | Primitive::I16 => Some(2),
            Primitive::U32 | Primitive::I32 => Some(4),
            Primitive::U64 | Primitive::I64 => Some(8),
            Primitive::U128 | Primitive::I128 => Some(16),
            _ => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128
        )
    }

    /// Parse a primitive from its Rust spelling
    pub fn from_name(name: &str) -> Option<Primitive> {
        Some(match name {
            "bool" => Primitive::Bool,
            "u8" => Primitive::U8,
            "u16" => Primitive::U16,
            "u32" => Primitive::U32,
            "u64" => Primitive::U64,
            "u128" => Primitive::U128,
            "u256" | "U256" => Primitive::U256,
            "i8" => Primitive::I8,
            "i16" => Primitive::I16,
            "i32" => Primitive::I32,
            "i64" => Primitive::I64,
            "i128" => Primitive::I128,
            "i256" => Primitive::I256,
            "char" => Primitive::Char,
            "str" | "Str" | "String" | "Text" => Primitive::Str,
            "AccountId" | "AccountId32" => Primitive::AccountId32,
            _ => return None,
        })
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Bool => "bool",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::U256 => "u256",
            Primitive::I256 => "i256",
            Primitive::Char => "char",
            Primitive::Str => "str",
            Primitive::AccountId32 => "AccountId32",
        };
        f.write_str(name)
    }
}

/// A named (struct) or positional (tuple struct) field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl Field {
    pub fn named(name: impl Into<String>, ty: TypeRef) -> Self {
        Field {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeRef) -> Self {
        Field { name: None, ty }
    }
}

/// One enum variant: wire index plus fields in declared order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub index: u8,
    pub fields: Vec<Field>,
}

/// One decodable/encodable shape from metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Compact(TypeRef),
    Struct(Vec<Field>),
    Enum(Vec<Variant>),
    Sequence(TypeRef),
    Array(TypeRef, usize),
    Option(TypeRef),
    Tuple(Vec<TypeRef>),
}

impl TypeDescriptor {
    pub fn unit() -> Self {
        TypeDescriptor::Tuple(Vec::new())
    }

    /// Short kind label used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TypeDescriptor::Primitive(_) => "primitive",
            TypeDescriptor::Compact(_) => "compact",
            TypeDescriptor::Struct(_) => "struct",
            TypeDescriptor::Enum(_) => "enum",
            TypeDescriptor::Sequence(_) => "sequence",
            TypeDescriptor::Array(_, _) => "array",
            TypeDescriptor::Option(_) => "option",
            TypeDescriptor::Tuple(_) => "tuple",
        }
    }

    pub fn variant_by_index(&self, index: u8) -> Option<&Variant> {
        match self {
            TypeDescriptor::Enum(variants) => variants.iter().find(|v| v.index == index),
            _ => None,
        }
    }

    pub fn variant_by_name(&self, name: &str) -> Option<&Variant> {
        match self {
            TypeDescriptor::Enum(variants) => variants
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        assert_eq!(Primitive::from_name("u128"), Some(Primitive::U128));
        assert_eq!(Primitive::from_name("Text"), Some(Primitive::Str));
        assert_eq!(Primitive::from_name("AccountId"), Some(Primitive::AccountId32));
        assert_eq!(Primitive::from_name("Balance"), None);
        assert_eq!(Primitive::U64.int_width(), Some(8));
        assert!(Primitive::I32.is_signed());
    }

    #[test]
    fn test_variant_lookup() {
        let desc = TypeDescriptor::Enum(vec![
            Variant {
                name: "Id".to_string(),
                index: 0,
                fields: vec![Field::unnamed("AccountId".into())],
            },
            Variant {
                name: "Address20".to_string(),
                index: 4,
                fields: vec![Field::unnamed("H160".into())],
            },
        ]);
        assert_eq!(desc.variant_by_index(4).map(|v| v.name.as_str()), Some("Address20"));
        assert!(desc.variant_by_index(1).is_none());
        assert_eq!(desc.variant_by_name("id").map(|v| v.index), Some(0));
    }
}
