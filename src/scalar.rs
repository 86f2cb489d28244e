//! Scalar codec: byte widths, little-endian reads and integer normalization for
//! the vertex component encodings a capture can describe.

use rootcause::Report;
use winnow::Parser;
use winnow::binary::{le_f32, le_i8, le_i16, le_i32, le_u8, le_u16, le_u32};
use winnow::error::{ContextError, ErrMode};

use crate::error::{TranscodeError, TranscodeResult, malformed};
use crate::recognized::Recognized;

type WResult<T> = Result<T, ErrMode<ContextError>>;

pub const GL_BYTE: u32 = 0x1400;
pub const GL_UNSIGNED_BYTE: u32 = 0x1401;
pub const GL_SHORT: u32 = 0x1402;
pub const GL_UNSIGNED_SHORT: u32 = 0x1403;
pub const GL_INT: u32 = 0x1404;
pub const GL_UNSIGNED_INT: u32 = 0x1405;
pub const GL_FLOAT: u32 = 0x1406;

/// Storage type of one vertex or index component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
}

impl ComponentType {
    pub fn code(self) -> u32 {
        match self {
            ComponentType::I8 => GL_BYTE,
            ComponentType::U8 => GL_UNSIGNED_BYTE,
            ComponentType::I16 => GL_SHORT,
            ComponentType::U16 => GL_UNSIGNED_SHORT,
            ComponentType::I32 => GL_INT,
            ComponentType::U32 => GL_UNSIGNED_INT,
            ComponentType::F32 => GL_FLOAT,
        }
    }

    pub fn byte_width(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::I32 | ComponentType::U32 | ComponentType::F32 => 4,
        }
    }

    /// Resolve a trace-supplied type code, failing for codes outside the
    /// supported encodings.
    pub fn resolve(ty: &Recognized<ComponentType, u32>) -> TranscodeResult<ComponentType> {
        match ty {
            Recognized::Known(ty) => Ok(*ty),
            Recognized::Unknown(code) => {
                Err(Report::new(TranscodeError::UnsupportedComponentType(*code)))
            }
        }
    }
}

impl TryFrom<&u32> for ComponentType {
    type Error = ();

    fn try_from(code: &u32) -> Result<Self, ()> {
        Ok(match *code {
            GL_BYTE => ComponentType::I8,
            GL_UNSIGNED_BYTE => ComponentType::U8,
            GL_SHORT => ComponentType::I16,
            GL_UNSIGNED_SHORT => ComponentType::U16,
            GL_INT => ComponentType::I32,
            GL_UNSIGNED_INT => ComponentType::U32,
            GL_FLOAT => ComponentType::F32,
            _ => return Err(()),
        })
    }
}

impl From<ComponentType> for u32 {
    fn from(ty: ComponentType) -> u32 {
        ty.code()
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ComponentType::I8 => "i8",
            ComponentType::U8 => "u8",
            ComponentType::I16 => "i16",
            ComponentType::U16 => "u16",
            ComponentType::I32 => "i32",
            ComponentType::U32 => "u32",
            ComponentType::F32 => "f32",
        };
        f.write_str(name)
    }
}

fn parse_scalar(input: &mut &[u8], ty: ComponentType) -> WResult<f64> {
    Ok(match ty {
        ComponentType::I8 => le_i8.parse_next(input)? as f64,
        ComponentType::U8 => le_u8.parse_next(input)? as f64,
        ComponentType::I16 => le_i16.parse_next(input)? as f64,
        ComponentType::U16 => le_u16.parse_next(input)? as f64,
        ComponentType::I32 => le_i32.parse_next(input)? as f64,
        ComponentType::U32 => le_u32.parse_next(input)? as f64,
        ComponentType::F32 => le_f32.parse_next(input)? as f64,
    })
}

/// Read one little-endian scalar at `offset`.
pub fn read_scalar(buffer: &[u8], offset: usize, ty: ComponentType) -> TranscodeResult<f64> {
    let width = ty.byte_width();
    let mut input = offset
        .checked_add(width)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            malformed(format!(
                "{width}-byte {ty} read at 0x{offset:X} runs past end of buffer (len 0x{:X})",
                buffer.len()
            ))
        })?;
    parse_scalar(&mut input, ty).map_err(|e| malformed(format!("{ty} read at 0x{offset:X}: {e}")))
}

/// Map an integer value onto the unit range the way normalized vertex
/// attributes are interpreted.
///
/// Signed types divide by `2^(n-1) - 1` and clamp at -1, so the most negative
/// value maps to exactly -1. Unsigned types divide by `2^n - 1`. Floats pass
/// through untouched.
pub fn normalize(raw: f64, ty: ComponentType) -> f64 {
    match ty {
        ComponentType::I8 => (raw / i8::MAX as f64).max(-1.0),
        ComponentType::I16 => (raw / i16::MAX as f64).max(-1.0),
        ComponentType::I32 => (raw / i32::MAX as f64).max(-1.0),
        ComponentType::U8 => raw / u8::MAX as f64,
        ComponentType::U16 => raw / u16::MAX as f64,
        ComponentType::U32 => raw / u32::MAX as f64,
        ComponentType::F32 => raw,
    }
}
