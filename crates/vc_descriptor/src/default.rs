use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{EnumValueDescriptor, FieldKind};

// -----------------------------------------------------------------------------
// DefaultValue

/// A declared default value, already converted to the field's value kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(Box<str>),
    Bytes(Box<[u8]>),
    Enum(EnumValueDescriptor),
}

// -----------------------------------------------------------------------------
// RawDefault

// Stored inside the pool. Enum defaults keep the value index only,
// a descriptor handle here would make the pool own itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawDefault {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(Box<str>),
    Bytes(Box<[u8]>),
    Enum(u32),
}

/// Parses the textual default of a scalar field.
///
/// Enum defaults are resolved by the linker, which knows the enum's values.
pub(crate) fn parse_scalar(kind: FieldKind, text: &str) -> Option<RawDefault> {
    Some(match kind {
        FieldKind::Int32 | FieldKind::SInt32 | FieldKind::SFixed32 => {
            RawDefault::I32(i32::try_from(parse_signed(text)?).ok()?)
        }
        FieldKind::Int64 | FieldKind::SInt64 | FieldKind::SFixed64 => {
            RawDefault::I64(i64::try_from(parse_signed(text)?).ok()?)
        }
        FieldKind::UInt32 | FieldKind::Fixed32 => {
            RawDefault::U32(u32::try_from(parse_unsigned(text)?).ok()?)
        }
        FieldKind::UInt64 | FieldKind::Fixed64 => {
            RawDefault::U64(u64::try_from(parse_unsigned(text)?).ok()?)
        }
        FieldKind::Float => RawDefault::F32(parse_float(text)? as f32),
        FieldKind::Double => RawDefault::F64(parse_float(text)?),
        FieldKind::Bool => match text {
            "true" => RawDefault::Bool(true),
            "false" => RawDefault::Bool(false),
            _ => return None,
        },
        FieldKind::String => RawDefault::String(text.into()),
        FieldKind::Bytes => RawDefault::Bytes(unescape_bytes(text)?.into_boxed_slice()),
        FieldKind::Enum | FieldKind::Message | FieldKind::Group => return None,
    })
}

/// Parses decimal, `0x` hex and `0`-prefixed octal integers.
fn parse_unsigned(text: &str) -> Option<u128> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(octal) = text.strip_prefix('0').filter(|rest| !rest.is_empty()) {
        (octal, 8)
    } else {
        (text, 10)
    };
    // `from_str_radix` takes a leading `+`.
    if !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }
    u128::from_str_radix(digits, radix).ok()
}

fn parse_signed(text: &str) -> Option<i128> {
    match text.strip_prefix('-') {
        Some(rest) => parse_unsigned(rest).and_then(|v| i128::try_from(v).ok()).map(|v| -v),
        None => parse_unsigned(text).and_then(|v| i128::try_from(v).ok()),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => text.parse::<f64>().ok(),
    }
}

/// Decodes C-style escapes: `\n`, `\\`, `\"`, `\xHH` and up to three octal digits.
fn unescape_bytes(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let escape = *bytes.get(i)?;
        i += 1;
        match escape {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'v' => out.push(0x0B),
            b'\\' | b'\'' | b'"' | b'?' => out.push(escape),
            b'x' | b'X' => {
                let start = i;
                while i < bytes.len() && i - start < 2 && bytes[i].is_ascii_hexdigit() {
                    i += 1;
                }
                if start == i {
                    return None;
                }
                out.push(u8::from_str_radix(&text[start..i], 16).ok()?);
            }
            b'0'..=b'7' => {
                let start = i - 1;
                while i < bytes.len() && i - start < 3 && (b'0'..=b'7').contains(&bytes[i]) {
                    i += 1;
                }
                out.push(u8::try_from(u16::from_str_radix(&text[start..i], 8).ok()?).ok()?);
            }
            _ => return None,
        }
    }
    Some(out)
}
