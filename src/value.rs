//! Typed registry values: tags, variants, and strict marshaling.
//!
//! Every stored value carries a backend type tag alongside its raw bytes.
//! Typed reads validate that the requested semantic type is compatible with
//! the stored tag before decoding; an incompatible combination is a
//! [`RegistryError::TypeMismatch`], never a silent coercion.

use crate::error::{RegistryError, Result};
use crate::utils::{
    decode_multi_utf16z, decode_utf16z, encode_multi_utf16z, encode_utf16z, read_f64_ne,
    read_i32_ne, read_i64_ne, read_u32_ne, read_u64_ne,
};
use encoding_rs::UTF_16LE;
use std::fmt;

/// Registry value data types (backend tags).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit integer.
    Dword,

    /// 32-bit integer with big-endian tag.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,

    /// Unknown or non-standard value type.
    /// Contains the raw type value.
    Unknown(u32),
}

impl ValueType {
    /// Parses a value type from a u32 tag.
    ///
    /// Tags 0-11 are predefined; anything else is preserved as
    /// `ValueType::Unknown`.
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ValueType::None),
            1 => Ok(ValueType::String),
            2 => Ok(ValueType::ExpandString),
            3 => Ok(ValueType::Binary),
            4 => Ok(ValueType::Dword),
            5 => Ok(ValueType::DwordBigEndian),
            6 => Ok(ValueType::Link),
            7 => Ok(ValueType::MultiString),
            8 => Ok(ValueType::ResourceList),
            9 => Ok(ValueType::FullResourceDescriptor),
            10 => Ok(ValueType::ResourceRequirementsList),
            11 => Ok(ValueType::Qword),
            _ => Ok(ValueType::Unknown(value)),
        }
    }

    /// Returns the raw u32 tag for this value type.
    pub fn as_u32(&self) -> u32 {
        match self {
            ValueType::None => 0,
            ValueType::String => 1,
            ValueType::ExpandString => 2,
            ValueType::Binary => 3,
            ValueType::Dword => 4,
            ValueType::DwordBigEndian => 5,
            ValueType::Link => 6,
            ValueType::MultiString => 7,
            ValueType::ResourceList => 8,
            ValueType::FullResourceDescriptor => 9,
            ValueType::ResourceRequirementsList => 10,
            ValueType::Qword => 11,
            ValueType::Unknown(value) => *value,
        }
    }

    /// Returns the name of this value type.
    pub fn name(&self) -> String {
        match self {
            ValueType::None => "REG_NONE".to_string(),
            ValueType::String => "REG_SZ".to_string(),
            ValueType::ExpandString => "REG_EXPAND_SZ".to_string(),
            ValueType::Binary => "REG_BINARY".to_string(),
            ValueType::Dword => "REG_DWORD".to_string(),
            ValueType::DwordBigEndian => "REG_DWORD_BIG_ENDIAN".to_string(),
            ValueType::Link => "REG_LINK".to_string(),
            ValueType::MultiString => "REG_MULTI_SZ".to_string(),
            ValueType::ResourceList => "REG_RESOURCE_LIST".to_string(),
            ValueType::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR".to_string(),
            ValueType::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST".to_string(),
            ValueType::Qword => "REG_QWORD".to_string(),
            ValueType::Unknown(value) => format!("REG_UNKNOWN_{:#010x}", value),
        }
    }

    /// Returns true if this tag belongs to the text class accepted by string
    /// reads.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ValueType::String | ValueType::ExpandString | ValueType::Link
        )
    }

    /// Returns true if this tag belongs to the list class accepted by string
    /// list reads.
    pub fn is_text_list(&self) -> bool {
        matches!(
            self,
            ValueType::MultiString
                | ValueType::ResourceList
                | ValueType::FullResourceDescriptor
                | ValueType::ResourceRequirementsList
        )
    }
}

/// A typed registry value.
///
/// The variant determines the canonical byte layout and backend tag written by
/// [`RegistryKey::set_value`](crate::RegistryKey::set_value).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegValue {
    /// Raw bytes, tag `REG_BINARY`.
    Binary(Vec<u8>),

    /// Text, stored as NUL-terminated UTF-16LE units, tag `REG_SZ`.
    Text(String),

    /// Ordered text list, stored as NUL-terminated entries with a trailing
    /// empty entry, tag `REG_MULTI_SZ`.
    TextList(Vec<String>),

    /// 32-bit integer, 4 native-order bytes. The tag is `REG_DWORD` or
    /// `REG_DWORD_BIG_ENDIAN` per the flag; the byte image is never swapped.
    Int32 {
        /// The integer value.
        value: i32,
        /// Store under the big-endian tag instead of the native one.
        big_endian: bool,
    },

    /// 64-bit integer, 8 native-order bytes, tag `REG_QWORD`.
    Int64(i64),

    /// Floating-point value, stored as its raw 8-byte in-memory image under
    /// `REG_BINARY`. Not portable across platforms.
    Double(f64),

    /// Boolean, stored as a single byte under `REG_BINARY`.
    Bool(bool),
}

impl RegValue {
    /// Returns the backend tag this value encodes to.
    pub fn tag(&self) -> ValueType {
        match self {
            RegValue::Binary(_) => ValueType::Binary,
            RegValue::Text(_) => ValueType::String,
            RegValue::TextList(_) => ValueType::MultiString,
            RegValue::Int32 { big_endian, .. } => {
                if *big_endian {
                    ValueType::DwordBigEndian
                } else {
                    ValueType::Dword
                }
            }
            RegValue::Int64(_) => ValueType::Qword,
            RegValue::Double(_) => ValueType::Binary,
            RegValue::Bool(_) => ValueType::Binary,
        }
    }

    /// Encodes this value to its canonical backend byte layout.
    pub fn into_tagged_bytes(self) -> (ValueType, Vec<u8>) {
        let tag = self.tag();
        let bytes = match self {
            RegValue::Binary(bytes) => bytes,
            RegValue::Text(text) => encode_utf16z(&text),
            RegValue::TextList(items) => encode_multi_utf16z(&items),
            RegValue::Int32 { value, .. } => value.to_ne_bytes().to_vec(),
            RegValue::Int64(value) => value.to_ne_bytes().to_vec(),
            RegValue::Double(value) => value.to_ne_bytes().to_vec(),
            RegValue::Bool(value) => vec![u8::from(value)],
        };
        (tag, bytes)
    }

    /// Decodes stored bytes to their natural variant based on the tag alone.
    ///
    /// Used by display and dump paths where no semantic type is requested.
    /// Unknown and `REG_NONE` tags decode as [`RegValue::Binary`].
    pub fn from_tagged_bytes(tag: ValueType, data: &[u8]) -> Result<Self> {
        match tag {
            ValueType::String | ValueType::ExpandString | ValueType::Link => {
                let (decoded, _encoding, _had_errors) = UTF_16LE.decode(data);
                Ok(RegValue::Text(decoded.trim_end_matches('\0').to_string()))
            }

            ValueType::MultiString
            | ValueType::ResourceList
            | ValueType::FullResourceDescriptor
            | ValueType::ResourceRequirementsList => {
                let (decoded, _encoding, _had_errors) = UTF_16LE.decode(data);
                let items: Vec<String> = decoded
                    .split('\0')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
                Ok(RegValue::TextList(items))
            }

            ValueType::Dword | ValueType::DwordBigEndian => {
                let value = read_i32_ne(data)
                    .ok_or_else(|| RegistryError::type_mismatch("Int32", tag.name()))?;
                Ok(RegValue::Int32 {
                    value,
                    big_endian: tag == ValueType::DwordBigEndian,
                })
            }

            ValueType::Qword => {
                let value = read_i64_ne(data)
                    .ok_or_else(|| RegistryError::type_mismatch("Int64", tag.name()))?;
                Ok(RegValue::Int64(value))
            }

            _ => Ok(RegValue::Binary(data.to_vec())),
        }
    }
}

impl fmt::Display for RegValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegValue::Binary(bytes) => write!(f, "{}", hex::encode(bytes)),
            RegValue::Text(text) => write!(f, "{}", text),
            RegValue::TextList(items) => write!(f, "{}", items.join(", ")),
            RegValue::Int32 { value, .. } => write!(f, "{} (0x{:08X})", value, value),
            RegValue::Int64(value) => write!(f, "{} (0x{:016X})", value, value),
            RegValue::Double(value) => write!(f, "{}", value),
            RegValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for RegValue {
    fn from(value: &str) -> Self {
        RegValue::Text(value.to_string())
    }
}

impl From<String> for RegValue {
    fn from(value: String) -> Self {
        RegValue::Text(value)
    }
}

impl From<Vec<String>> for RegValue {
    fn from(value: Vec<String>) -> Self {
        RegValue::TextList(value)
    }
}

impl From<i32> for RegValue {
    fn from(value: i32) -> Self {
        RegValue::Int32 {
            value,
            big_endian: false,
        }
    }
}

impl From<i64> for RegValue {
    fn from(value: i64) -> Self {
        RegValue::Int64(value)
    }
}

impl From<f64> for RegValue {
    fn from(value: f64) -> Self {
        RegValue::Double(value)
    }
}

impl From<bool> for RegValue {
    fn from(value: bool) -> Self {
        RegValue::Bool(value)
    }
}

impl From<Vec<u8>> for RegValue {
    fn from(value: Vec<u8>) -> Self {
        RegValue::Binary(value)
    }
}

impl From<&[u8]> for RegValue {
    fn from(value: &[u8]) -> Self {
        RegValue::Binary(value.to_vec())
    }
}

/// Decodes a stored `(tag, bytes)` pair into a concrete Rust type.
///
/// Implementations enforce the tag compatibility table: the requested type
/// must be compatible with the stored tag, matched by byte width for the
/// fixed-width numerics.
pub trait FromRegValue: Sized {
    /// Human-readable name of the requested type, used in mismatch errors.
    const TYPE_NAME: &'static str;

    /// Validates tag compatibility and decodes the raw bytes.
    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self>;
}

impl FromRegValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !tag.is_text() {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        Ok(decode_utf16z(data))
    }
}

impl FromRegValue for Vec<String> {
    const TYPE_NAME: &'static str = "Vec<String>";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !tag.is_text_list() {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        Ok(decode_multi_utf16z(data))
    }
}

/// Tags accepted for 4-byte numeric reads, matched by byte width.
fn dword_compatible(tag: ValueType, data: &[u8]) -> bool {
    matches!(
        tag,
        ValueType::Dword | ValueType::DwordBigEndian | ValueType::Binary
    ) && data.len() == 4
}

/// Tags accepted for 8-byte numeric reads, matched by byte width.
fn qword_compatible(tag: ValueType, data: &[u8]) -> bool {
    matches!(tag, ValueType::Qword | ValueType::Binary) && data.len() == 8
}

impl FromRegValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !dword_compatible(tag, data) {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        read_i32_ne(data).ok_or(RegistryError::Unknown)
    }
}

impl FromRegValue for u32 {
    const TYPE_NAME: &'static str = "u32";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !dword_compatible(tag, data) {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        read_u32_ne(data).ok_or(RegistryError::Unknown)
    }
}

impl FromRegValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !qword_compatible(tag, data) {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        read_i64_ne(data).ok_or(RegistryError::Unknown)
    }
}

impl FromRegValue for u64 {
    const TYPE_NAME: &'static str = "u64";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !qword_compatible(tag, data) {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        read_u64_ne(data).ok_or(RegistryError::Unknown)
    }
}

impl FromRegValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if !qword_compatible(tag, data) {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        read_f64_ne(data).ok_or(RegistryError::Unknown)
    }
}

impl FromRegValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        let compatible = matches!(
            tag,
            ValueType::Dword | ValueType::DwordBigEndian | ValueType::Binary
        ) && !data.is_empty();
        if !compatible {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        Ok(data[0] != 0)
    }
}

impl FromRegValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";

    fn from_reg_value(tag: ValueType, data: &[u8]) -> Result<Self> {
        if tag != ValueType::Binary {
            return Err(RegistryError::type_mismatch(Self::TYPE_NAME, tag.name()));
        }
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_round_trip() {
        for raw in 0..=11u32 {
            let tag = ValueType::from_u32(raw).unwrap();
            assert_eq!(tag.as_u32(), raw);
        }
        assert_eq!(ValueType::from_u32(99).unwrap(), ValueType::Unknown(99));
        assert_eq!(ValueType::Unknown(99).as_u32(), 99);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(ValueType::String.name(), "REG_SZ");
        assert_eq!(ValueType::Dword.name(), "REG_DWORD");
        assert_eq!(ValueType::MultiString.name(), "REG_MULTI_SZ");
    }

    #[test]
    fn test_text_encoding_is_nul_terminated() {
        let (tag, bytes) = RegValue::from("hi").into_tagged_bytes();
        assert_eq!(tag, ValueType::String);
        assert_eq!(bytes, vec![b'h', 0, b'i', 0, 0, 0]);
    }

    #[test]
    fn test_text_list_double_nul_terminated() {
        let (tag, bytes) =
            RegValue::TextList(vec!["a".to_string(), "b".to_string()]).into_tagged_bytes();
        assert_eq!(tag, ValueType::MultiString);
        assert_eq!(bytes, vec![b'a', 0, 0, 0, b'b', 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_int32_big_endian_is_tag_only() {
        let native = RegValue::Int32 {
            value: 7,
            big_endian: false,
        };
        let tagged = RegValue::Int32 {
            value: 7,
            big_endian: true,
        };
        let (native_tag, native_bytes) = native.into_tagged_bytes();
        let (be_tag, be_bytes) = tagged.into_tagged_bytes();
        assert_eq!(native_tag, ValueType::Dword);
        assert_eq!(be_tag, ValueType::DwordBigEndian);
        assert_eq!(native_bytes, be_bytes);
    }

    #[test]
    fn test_string_accepts_text_class_tags() {
        let bytes = encode_utf16z("x");
        for tag in [ValueType::String, ValueType::ExpandString, ValueType::Link] {
            assert_eq!(String::from_reg_value(tag, &bytes).unwrap(), "x");
        }
        assert!(String::from_reg_value(ValueType::Dword, &bytes).is_err());
    }

    #[test]
    fn test_i32_width_match() {
        let bytes = 42i32.to_ne_bytes();
        assert_eq!(i32::from_reg_value(ValueType::Dword, &bytes).unwrap(), 42);
        assert_eq!(i32::from_reg_value(ValueType::Binary, &bytes).unwrap(), 42);
        // Binary of the wrong width is not a 4-byte numeric.
        assert!(i32::from_reg_value(ValueType::Binary, &[1, 2, 3]).is_err());
        assert!(i32::from_reg_value(ValueType::Qword, &bytes).is_err());
    }

    #[test]
    fn test_i64_accepts_qword_and_binary() {
        let bytes = (-3i64).to_ne_bytes();
        assert_eq!(i64::from_reg_value(ValueType::Qword, &bytes).unwrap(), -3);
        assert_eq!(i64::from_reg_value(ValueType::Binary, &bytes).unwrap(), -3);
        assert!(i64::from_reg_value(ValueType::Dword, &bytes).is_err());
    }

    #[test]
    fn test_bool_reads_first_byte() {
        assert!(bool::from_reg_value(ValueType::Binary, &[1]).unwrap());
        assert!(!bool::from_reg_value(ValueType::Binary, &[0]).unwrap());
        assert!(bool::from_reg_value(ValueType::Dword, &0u32.to_ne_bytes())
            .map(|b| !b)
            .unwrap());
        assert!(bool::from_reg_value(ValueType::String, &[1]).is_err());
    }

    #[test]
    fn test_binary_requires_binary_tag() {
        assert_eq!(
            Vec::<u8>::from_reg_value(ValueType::Binary, &[1, 2]).unwrap(),
            vec![1, 2]
        );
        assert!(Vec::<u8>::from_reg_value(ValueType::Dword, &[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_mismatch_error_kind() {
        let err = i32::from_reg_value(ValueType::String, &encode_utf16z("nope")).unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_dynamic_decode() {
        let (tag, bytes) = RegValue::from("hello").into_tagged_bytes();
        assert_eq!(
            RegValue::from_tagged_bytes(tag, &bytes).unwrap(),
            RegValue::Text("hello".to_string())
        );

        let (tag, bytes) = RegValue::from(11i32).into_tagged_bytes();
        assert_eq!(
            RegValue::from_tagged_bytes(tag, &bytes).unwrap(),
            RegValue::Int32 {
                value: 11,
                big_endian: false
            }
        );

        let list = RegValue::TextList(vec!["p".to_string(), "q".to_string()]);
        let (tag, bytes) = list.clone().into_tagged_bytes();
        assert_eq!(RegValue::from_tagged_bytes(tag, &bytes).unwrap(), list);
    }

    #[test]
    fn test_display() {
        assert_eq!(RegValue::Binary(vec![0xAB, 0xCD]).to_string(), "abcd");
        assert_eq!(RegValue::from("txt").to_string(), "txt");
        assert_eq!(RegValue::from(5i32).to_string(), "5 (0x00000005)");
        assert_eq!(
            RegValue::TextList(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
    }
}
