//! SCALE codec driven by [`TypeDescriptor`]s
//!
//! Compact integers, little-endian fixed-width integers, compact-prefixed
//! sequences, tagged options and enums, and field-order concatenation for
//! structs and tuples. Decoding is a streaming cursor ([`Input`]) so composite
//! decoders chain sequentially and every call reports what it consumed.

use crate::address::decode_ss58;
use crate::error::TxWrapperError;
use crate::metadata::{Field, Primitive, TypeDescriptor, TypeRef, Variant};
use crate::value::{Composite, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Deepest type nesting the codec will follow
const MAX_DEPTH: usize = 128;

/// Resolves the child references of a [`TypeDescriptor`]
pub trait TypeResolver {
    fn resolve(&self, ty: &TypeRef) -> Result<Arc<TypeDescriptor>, TxWrapperError>;
}

impl TypeResolver for BTreeMap<TypeRef, TypeDescriptor> {
    fn resolve(&self, ty: &TypeRef) -> Result<Arc<TypeDescriptor>, TxWrapperError> {
        self.get(ty)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| TxWrapperError::UnknownType(ty.to_string()))
    }
}

/// Read cursor over an input buffer
#[derive(Debug, Clone)]
pub struct Input<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Input<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Input { data, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unconsumed tail of the buffer
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], TxWrapperError> {
        if len > self.remaining() {
            return Err(TxWrapperError::truncated(len, self.remaining()));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_byte(&mut self) -> Result<u8, TxWrapperError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TxWrapperError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a canonical compact integer
    pub fn read_compact(&mut self) -> Result<u128, TxWrapperError> {
        let (value, size) = decode_compact(self.rest())?;
        self.offset += size;
        Ok(value)
    }
}

/// Append the compact encoding of `value`
pub fn encode_compact_to(value: u128, out: &mut Vec<u8>) {
    if value < 0x40 {
        out.push((value as u8) << 2);
    } else if value < 0x4000 {
        out.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes());
    } else if value < 0x4000_0000 {
        out.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes());
    } else {
        let bytes_needed = ((128 - value.leading_zeros() + 7) / 8) as usize;
        out.push((((bytes_needed - 4) << 2) | 0b11) as u8);
        out.extend_from_slice(&value.to_le_bytes()[..bytes_needed]);
    }
}

/// Compact encoding of `value`
pub fn encode_compact(value: u128) -> Vec<u8> {
    let mut out = Vec::with_capacity(1);
    encode_compact_to(value, &mut out);
    out
}

/// Decode a compact integer, returning the value and bytes consumed
///
/// Only the minimal encoding is accepted.
pub fn decode_compact(bytes: &[u8]) -> Result<(u128, usize), TxWrapperError> {
    let first = *bytes.first().ok_or_else(|| TxWrapperError::truncated(1, 0))?;

    match first & 0b11 {
        0b00 => Ok(((first >> 2) as u128, 1)),
        0b01 => {
            if bytes.len() < 2 {
                return Err(TxWrapperError::truncated(2, bytes.len()));
            }
            let value = (u16::from_le_bytes([bytes[0], bytes[1]]) >> 2) as u128;
            if value < 0x40 {
                return Err(non_canonical(value));
            }
            Ok((value, 2))
        }
        0b10 => {
            if bytes.len() < 4 {
                return Err(TxWrapperError::truncated(4, bytes.len()));
            }
            let value = (u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) >> 2) as u128;
            if value < 0x4000 {
                return Err(non_canonical(value));
            }
            Ok((value, 4))
        }
        _ => {
            let len = ((first >> 2) + 4) as usize;
            if len > 16 {
                return Err(TxWrapperError::MalformedCompactInt(format!(
                    "{} byte compact exceeds 128 bits",
                    len
                )));
            }
            if bytes.len() < 1 + len {
                return Err(TxWrapperError::truncated(1 + len, bytes.len()));
            }
            let mut buf = [0u8; 16];
            buf[..len].copy_from_slice(&bytes[1..1 + len]);
            let value = u128::from_le_bytes(buf);
            if bytes[len] == 0 || value < 0x4000_0000 {
                return Err(non_canonical(value));
            }
            Ok((value, 1 + len))
        }
    }
}

fn non_canonical(value: u128) -> TxWrapperError {
    TxWrapperError::MalformedCompactInt(format!("non-minimal encoding of {}", value))
}

/// Encode `value` as the shape described by `descriptor`
pub fn encode<R: TypeResolver + ?Sized>(
    value: &Value,
    descriptor: &TypeDescriptor,
    resolver: &R,
) -> Result<Vec<u8>, TxWrapperError> {
    let mut out = Vec::new();
    Encoder::new(resolver).descriptor(value, descriptor, &mut out)?;
    Ok(out)
}

/// Decode a value of the shape described by `descriptor`
///
/// Returns the value and the number of bytes consumed.
pub fn decode<R: TypeResolver + ?Sized>(
    bytes: &[u8],
    descriptor: &TypeDescriptor,
    resolver: &R,
) -> Result<(Value, usize), TxWrapperError> {
    let mut input = Input::new(bytes);
    let value = Decoder::new(resolver).descriptor(&mut input, descriptor, "<root>")?;
    Ok((value, input.offset()))
}

/// Encode `value` as the referenced type, appending to `out`
pub fn encode_as<R: TypeResolver + ?Sized>(
    value: &Value,
    ty: &TypeRef,
    resolver: &R,
    out: &mut Vec<u8>,
) -> Result<(), TxWrapperError> {
    Encoder::new(resolver).type_ref(value, ty, out)
}

/// Decode the referenced type from the cursor
pub fn decode_as<R: TypeResolver + ?Sized>(
    input: &mut Input<'_>,
    ty: &TypeRef,
    resolver: &R,
) -> Result<Value, TxWrapperError> {
    Decoder::new(resolver).type_ref(input, ty)
}

fn is_u8<R: TypeResolver + ?Sized>(resolver: &R, ty: &TypeRef) -> Result<bool, TxWrapperError> {
    Ok(matches!(
        *resolver.resolve(ty)?,
        TypeDescriptor::Primitive(Primitive::U8)
    ))
}

/// Integer primitive underneath a compact, looking through newtype wrappers
fn compact_target<R: TypeResolver + ?Sized>(
    resolver: &R,
    ty: &TypeRef,
) -> Result<Primitive, TxWrapperError> {
    let mut current = ty.clone();
    for _ in 0..MAX_DEPTH {
        let desc = resolver.resolve(&current)?;
        match &*desc {
            TypeDescriptor::Primitive(p) if p.int_width().is_some() && !p.is_signed() => {
                return Ok(*p)
            }
            TypeDescriptor::Struct(fields) if fields.len() == 1 => current = fields[0].ty.clone(),
            TypeDescriptor::Tuple(types) if types.len() == 1 => current = types[0].clone(),
            TypeDescriptor::Compact(inner) => current = inner.clone(),
            other => {
                return Err(TxWrapperError::UnknownType(format!(
                    "compact over {} {}",
                    other.kind(),
                    ty
                )))
            }
        }
    }
    Err(TxWrapperError::InvalidInput("type nesting too deep".to_string()))
}

fn parse_unsigned(value: &Value) -> Result<u128, TxWrapperError> {
    match value {
        Value::UInt(v) => Ok(*v),
        Value::Int(v) if *v >= 0 => Ok(*v as u128),
        Value::String(s) => {
            let s = s.trim();
            let parsed = match s.strip_prefix("0x") {
                Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
                None => s.parse::<u128>(),
            };
            parsed.map_err(|_| TxWrapperError::mismatch("unsigned integer", format!("{:?}", s)))
        }
        Value::Composite(fields) if fields.len() == 1 => parse_unsigned(fields.values()[0]),
        other => Err(TxWrapperError::mismatch("unsigned integer", other.kind())),
    }
}

fn parse_signed(value: &Value) -> Result<i128, TxWrapperError> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::UInt(v) => {
            i128::try_from(*v).map_err(|_| TxWrapperError::mismatch("signed integer", v.to_string()))
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| TxWrapperError::mismatch("signed integer", format!("{:?}", s))),
        other => Err(TxWrapperError::mismatch("signed integer", other.kind())),
    }
}

/// Bytes from a `Bytes` value or a 0x-hex string
fn parse_bytes(value: &Value) -> Result<Vec<u8>, TxWrapperError> {
    match value {
        Value::Bytes(bytes) => Ok(bytes.clone()),
        Value::AccountId(pk) => Ok(pk.to_vec()),
        Value::String(s) if s.starts_with("0x") => Ok(hex::decode(&s[2..])?),
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                let v = parse_unsigned(item)?;
                u8::try_from(v).map_err(|_| TxWrapperError::mismatch("byte", v.to_string()))
            })
            .collect(),
        other => Err(TxWrapperError::mismatch("bytes", other.kind())),
    }
}

fn parse_account(value: &Value) -> Result<[u8; 32], TxWrapperError> {
    let bytes = match value {
        Value::AccountId(pk) => return Ok(*pk),
        Value::String(s) if !s.starts_with("0x") => return Ok(decode_ss58(s)?.0),
        other => parse_bytes(other)?,
    };
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| TxWrapperError::mismatch("32-byte account id", format!("{} bytes", b.len())))
}

/// Values a tuple/struct/sequence can be filled from, in order
fn positional(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Composite(fields) => Some(fields.values()),
        Value::Sequence(items) => Some(items.iter().collect()),
        _ => None,
    }
}

struct Encoder<'r, R: ?Sized> {
    resolver: &'r R,
    depth: usize,
}

impl<'r, R: TypeResolver + ?Sized> Encoder<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Encoder { resolver, depth: 0 }
    }

    fn type_ref(&mut self, value: &Value, ty: &TypeRef, out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        let desc = self.resolver.resolve(ty)?;
        self.descriptor(value, &desc, out)
    }

    fn descriptor(
        &mut self,
        value: &Value,
        desc: &TypeDescriptor,
        out: &mut Vec<u8>,
    ) -> Result<(), TxWrapperError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TxWrapperError::InvalidInput("type nesting too deep".to_string()));
        }
        let result = match desc {
            TypeDescriptor::Primitive(p) => self.primitive(value, *p, out),
            TypeDescriptor::Compact(inner) => self.compact(value, inner, out),
            TypeDescriptor::Struct(fields) => self.fields(value, fields, out),
            TypeDescriptor::Enum(variants) => self.variant(value, variants, out),
            TypeDescriptor::Sequence(inner) => self.sequence(value, inner, out),
            TypeDescriptor::Array(inner, len) => self.array(value, inner, *len, out),
            TypeDescriptor::Option(inner) => match value {
                Value::Option(None) => {
                    out.push(0);
                    Ok(())
                }
                Value::Option(Some(v)) => {
                    out.push(1);
                    self.type_ref(v, inner, out)
                }
                v => {
                    out.push(1);
                    self.type_ref(v, inner, out)
                }
            },
            TypeDescriptor::Tuple(types) => self.tuple(value, types, out),
        };
        self.depth -= 1;
        result
    }

    fn primitive(&mut self, value: &Value, p: Primitive, out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        match p {
            Primitive::Bool => match value {
                Value::Bool(b) => out.push(*b as u8),
                other => return Err(TxWrapperError::mismatch("bool", other.kind())),
            },
            Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 | Primitive::U128 => {
                let width = p.int_width().unwrap_or(16);
                let v = parse_unsigned(value)?;
                if width < 16 && v >> (width * 8) != 0 {
                    return Err(TxWrapperError::mismatch(p.to_string(), v.to_string()));
                }
                out.extend_from_slice(&v.to_le_bytes()[..width]);
            }
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128 => {
                let width = p.int_width().unwrap_or(16);
                let v = parse_signed(value)?;
                let bits = (width * 8) as u32;
                if bits < 128 {
                    let min = -(1i128 << (bits - 1));
                    let max = (1i128 << (bits - 1)) - 1;
                    if v < min || v > max {
                        return Err(TxWrapperError::mismatch(p.to_string(), v.to_string()));
                    }
                }
                out.extend_from_slice(&v.to_le_bytes()[..width]);
            }
            Primitive::U256 | Primitive::I256 => match value {
                Value::Bytes(bytes) if bytes.len() == 32 => out.extend_from_slice(bytes),
                other => {
                    let v = parse_unsigned(other)?;
                    out.extend_from_slice(&v.to_le_bytes());
                    out.extend_from_slice(&[0u8; 16]);
                }
            },
            Primitive::Char => {
                let c = match value {
                    Value::Char(c) => *c,
                    Value::String(s) if s.chars().count() == 1 => s.chars().next().unwrap_or_default(),
                    other => return Err(TxWrapperError::mismatch("char", other.kind())),
                };
                out.extend_from_slice(&(c as u32).to_le_bytes());
            }
            Primitive::Str => match value {
                Value::String(s) => {
                    encode_compact_to(s.len() as u128, out);
                    out.extend_from_slice(s.as_bytes());
                }
                other => return Err(TxWrapperError::mismatch("string", other.kind())),
            },
            Primitive::AccountId32 => out.extend_from_slice(&parse_account(value)?),
        }
        Ok(())
    }

    fn compact(&mut self, value: &Value, inner: &TypeRef, out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        let target = compact_target(self.resolver, inner)?;
        let v = parse_unsigned(value)?;
        let width = target.int_width().unwrap_or(16);
        if width < 16 && v >> (width * 8) != 0 {
            return Err(TxWrapperError::mismatch(format!("Compact<{}>", target), v.to_string()));
        }
        encode_compact_to(v, out);
        Ok(())
    }

    fn fields(&mut self, value: &Value, fields: &[Field], out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        let all_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());

        if let (true, Value::Composite(Composite::Named(given))) = (all_named, value) {
            for (name, _) in given {
                if !fields.iter().any(|f| f.name.as_deref() == Some(name.as_str())) {
                    return Err(TxWrapperError::mismatch("declared field", name.clone()));
                }
            }
            for field in fields {
                let name = field.name.as_deref().unwrap_or_default();
                let v = given
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v)
                    .ok_or_else(|| TxWrapperError::mismatch(format!("field {}", name), "nothing"))?;
                self.type_ref(v, &field.ty, out)?;
            }
            return Ok(());
        }

        match positional(value) {
            Some(values) if values.len() == fields.len() => {
                for (field, v) in fields.iter().zip(values) {
                    self.type_ref(v, &field.ty, out)?;
                }
                Ok(())
            }
            // Newtype: the value stands for the single field
            _ if fields.len() == 1 => self.type_ref(value, &fields[0].ty, out),
            Some(values) => Err(TxWrapperError::mismatch(
                format!("{} fields", fields.len()),
                format!("{} values", values.len()),
            )),
            None => Err(TxWrapperError::mismatch("composite", value.kind())),
        }
    }

    fn variant(&mut self, value: &Value, variants: &[Variant], out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        let find = |name: &str| variants.iter().find(|v| v.name.eq_ignore_ascii_case(name));

        let (variant, fields): (&Variant, Value) = match value {
            Value::Variant(name, fields) => {
                let variant = find(name.as_str())
                    .ok_or_else(|| TxWrapperError::mismatch("enum variant", name.clone()))?;
                (variant, Value::Composite(fields.clone()))
            }
            Value::String(name) if matches!(find(name.as_str()), Some(v) if v.fields.is_empty()) => {
                let variant = find(name.as_str())
                    .ok_or_else(|| TxWrapperError::mismatch("enum variant", name.clone()))?;
                (variant, Value::unnamed([]))
            }
            Value::Composite(Composite::Named(entries))
                if entries.len() == 1 && find(entries[0].0.as_str()).is_some() =>
            {
                let (name, inner) = &entries[0];
                let variant = find(name.as_str())
                    .ok_or_else(|| TxWrapperError::mismatch("enum variant", name.clone()))?;
                (variant, inner.clone())
            }
            // MultiAddress ergonomics: a bare account means `Id(account)`
            other => match find("Id") {
                Some(variant) if variant.fields.len() == 1 => (variant, other.clone()),
                _ => return Err(TxWrapperError::mismatch("enum variant", other.kind())),
            },
        };

        out.push(variant.index);
        if variant.fields.is_empty() {
            return Ok(());
        }
        self.fields(&fields, &variant.fields, out)
    }

    fn sequence(&mut self, value: &Value, inner: &TypeRef, out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        if is_u8(self.resolver, inner)? && !matches!(value, Value::Sequence(_)) {
            let bytes = parse_bytes(value)?;
            encode_compact_to(bytes.len() as u128, out);
            out.extend_from_slice(&bytes);
            return Ok(());
        }
        let items = positional(value).ok_or_else(|| TxWrapperError::mismatch("sequence", value.kind()))?;
        encode_compact_to(items.len() as u128, out);
        for item in items {
            self.type_ref(item, inner, out)?;
        }
        Ok(())
    }

    fn array(&mut self, value: &Value, inner: &TypeRef, len: usize, out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        if is_u8(self.resolver, inner)? {
            let bytes = parse_bytes(value)?;
            if bytes.len() != len {
                return Err(TxWrapperError::mismatch(
                    format!("{} bytes", len),
                    format!("{} bytes", bytes.len()),
                ));
            }
            out.extend_from_slice(&bytes);
            return Ok(());
        }
        let items = positional(value).ok_or_else(|| TxWrapperError::mismatch("array", value.kind()))?;
        if items.len() != len {
            return Err(TxWrapperError::mismatch(
                format!("{} elements", len),
                format!("{} elements", items.len()),
            ));
        }
        for item in items {
            self.type_ref(item, inner, out)?;
        }
        Ok(())
    }

    fn tuple(&mut self, value: &Value, types: &[TypeRef], out: &mut Vec<u8>) -> Result<(), TxWrapperError> {
        match positional(value) {
            Some(values) if values.len() == types.len() => {
                for (ty, v) in types.iter().zip(values) {
                    self.type_ref(v, ty, out)?;
                }
                Ok(())
            }
            _ if types.len() == 1 => self.type_ref(value, &types[0], out),
            _ if types.is_empty() && matches!(value, Value::Option(None)) => Ok(()),
            Some(values) => Err(TxWrapperError::mismatch(
                format!("{}-tuple", types.len()),
                format!("{} values", values.len()),
            )),
            None => Err(TxWrapperError::mismatch("tuple", value.kind())),
        }
    }
}

struct Decoder<'r, R: ?Sized> {
    resolver: &'r R,
    depth: usize,
}

impl<'r, R: TypeResolver + ?Sized> Decoder<'r, R> {
    fn new(resolver: &'r R) -> Self {
        Decoder { resolver, depth: 0 }
    }

    fn type_ref(&mut self, input: &mut Input<'_>, ty: &TypeRef) -> Result<Value, TxWrapperError> {
        let desc = self.resolver.resolve(ty)?;
        self.descriptor(input, &desc, &ty.to_string())
    }

    fn descriptor(
        &mut self,
        input: &mut Input<'_>,
        desc: &TypeDescriptor,
        label: &str,
    ) -> Result<Value, TxWrapperError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TxWrapperError::InvalidInput("type nesting too deep".to_string()));
        }
        let result = match desc {
            TypeDescriptor::Primitive(p) => self.primitive(input, *p),
            TypeDescriptor::Compact(inner) => {
                let target = compact_target(self.resolver, inner)?;
                let v = input.read_compact()?;
                let width = target.int_width().unwrap_or(16);
                if width < 16 && v >> (width * 8) != 0 {
                    Err(TxWrapperError::MalformedCompactInt(format!(
                        "{} does not fit {}",
                        v, target
                    )))
                } else {
                    Ok(Value::UInt(v))
                }
            }
            TypeDescriptor::Struct(fields) => self.fields(input, fields).map(Value::Composite),
            TypeDescriptor::Enum(variants) => {
                let index = input.read_byte()?;
                let variant = variants
                    .iter()
                    .find(|v| v.index == index)
                    .ok_or_else(|| TxWrapperError::UnknownVariant {
                        ty: label.to_string(),
                        index,
                    })?;
                let fields = self.fields(input, &variant.fields)?;
                Ok(Value::Variant(variant.name.clone(), fields))
            }
            TypeDescriptor::Sequence(inner) => {
                let len = input.read_compact()?;
                if is_u8(self.resolver, inner)? {
                    let len = usize::try_from(len)
                        .map_err(|_| TxWrapperError::truncated(usize::MAX, input.remaining()))?;
                    Ok(Value::Bytes(input.read_bytes(len)?.to_vec()))
                } else {
                    // Capacity bounded by the remaining input
                    let mut items = Vec::with_capacity((len as usize).min(input.remaining()));
                    for _ in 0..len {
                        let start = input.offset();
                        items.push(self.type_ref(input, inner)?);
                        // Zero-sized elements: the length is bounded by the input size
                        if input.offset() == start && len > input.remaining() as u128 {
                            return Err(TxWrapperError::InvalidInput(format!(
                                "{} zero-sized elements claimed with {} bytes left",
                                len,
                                input.remaining()
                            )));
                        }
                    }
                    Ok(Value::Sequence(items))
                }
            }
            TypeDescriptor::Array(inner, len) => {
                if is_u8(self.resolver, inner)? {
                    Ok(Value::Bytes(input.read_bytes(*len)?.to_vec()))
                } else {
                    let mut items = Vec::with_capacity((*len).min(input.remaining()));
                    for _ in 0..*len {
                        items.push(self.type_ref(input, inner)?);
                    }
                    Ok(Value::Sequence(items))
                }
            }
            TypeDescriptor::Option(inner) => match input.read_byte()? {
                0 => Ok(Value::Option(None)),
                1 => Ok(Value::Option(Some(Box::new(self.type_ref(input, inner)?)))),
                index => Err(TxWrapperError::UnknownVariant {
                    ty: format!("Option<{}>", inner),
                    index,
                }),
            },
            TypeDescriptor::Tuple(types) => {
                let mut values = Vec::with_capacity(types.len());
                for ty in types {
                    values.push(self.type_ref(input, ty)?);
                }
                Ok(Value::Composite(Composite::Unnamed(values)))
            }
        };
        self.depth -= 1;
        result
    }

    fn primitive(&mut self, input: &mut Input<'_>, p: Primitive) -> Result<Value, TxWrapperError> {
        Ok(match p {
            Primitive::Bool => match input.read_byte()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                b => {
                    return Err(TxWrapperError::InvalidInput(format!(
                        "Invalid bool byte: {}",
                        b
                    )))
                }
            },
            Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 | Primitive::U128 => {
                let width = p.int_width().unwrap_or(16);
                let mut buf = [0u8; 16];
                buf[..width].copy_from_slice(input.read_bytes(width)?);
                Value::UInt(u128::from_le_bytes(buf))
            }
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128 => {
                let width = p.int_width().unwrap_or(16);
                let bytes = input.read_bytes(width)?;
                // Sign-extend into 128 bits
                let fill = if bytes[width - 1] & 0x80 != 0 { 0xff } else { 0x00 };
                let mut buf = [fill; 16];
                buf[..width].copy_from_slice(bytes);
                Value::Int(i128::from_le_bytes(buf))
            }
            Primitive::U256 | Primitive::I256 => Value::Bytes(input.read_bytes(32)?.to_vec()),
            Primitive::Char => {
                let raw = u32::from_le_bytes(input.read_array::<4>()?);
                let c = char::from_u32(raw)
                    .ok_or_else(|| TxWrapperError::InvalidInput(format!("Invalid char: {}", raw)))?;
                Value::Char(c)
            }
            Primitive::Str => {
                let len = input.read_compact()?;
                let len = usize::try_from(len)
                    .map_err(|_| TxWrapperError::truncated(usize::MAX, input.remaining()))?;
                let bytes = input.read_bytes(len)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| TxWrapperError::InvalidInput(format!("Invalid UTF-8: {}", e)))?;
                Value::String(s.to_string())
            }
            Primitive::AccountId32 => Value::AccountId(input.read_array::<32>()?),
        })
    }

    fn fields(&mut self, input: &mut Input<'_>, fields: &[Field]) -> Result<Composite, TxWrapperError> {
        let all_named = !fields.is_empty() && fields.iter().all(|f| f.name.is_some());
        if all_named {
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                let name = field.name.clone().unwrap_or_default();
                values.push((name, self.type_ref(input, &field.ty)?));
            }
            Ok(Composite::Named(values))
        } else {
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                values.push(self.type_ref(input, &field.ty)?);
            }
            Ok(Composite::Unnamed(values))
        }
    }
}
