//! Source and sink data types, and which sink columns each source type may populate.
//!
//! Compatibility is a lookup in a fixed table keyed on the source type. It is
//! directional: `is_compatible(source, column)` answers whether values of the
//! source type can be written into the column, never the reverse.

use crate::errors::{PipelineConfigError, PipelineConfigResult};

closed_enum! {
    /// Primitive types of fields carried by source topic messages.
    pub enum SourceFieldType("source field type") {
        String => "string",
        Bool => "bool",
        Bytes => "bytes",
        Int => "int",
        Int8 => "int8",
        Int16 => "int16",
        Int32 => "int32",
        Int64 => "int64",
        Uint => "uint",
        Uint8 => "uint8",
        Uint16 => "uint16",
        Uint32 => "uint32",
        Uint64 => "uint64",
        Float => "float",
        Float32 => "float32",
        Float64 => "float64",
        Array => "array",
    }
}

closed_enum! {
    /// Storage column types of the sink table.
    pub enum SinkColumnType("sink column type") {
        Bool => "Bool",
        Int8 => "Int8",
        Int16 => "Int16",
        Int32 => "Int32",
        Int64 => "Int64",
        UInt8 => "UInt8",
        UInt16 => "UInt16",
        UInt32 => "UInt32",
        UInt64 => "UInt64",
        Float32 => "Float32",
        Float64 => "Float64",
        String => "String",
        FixedString => "FixedString",
        DateTime => "DateTime",
        DateTime64 => "DateTime64",
        Uuid => "UUID",
        Enum8 => "Enum8",
        Enum16 => "Enum16",
        LowCardinalityString => "LowCardinality(String)",
        LowCardinalityFixedString => "LowCardinality(FixedString)",
        LowCardinalityDateTime => "LowCardinality(DateTime)",
        LowCardinalityInt32 => "LowCardinality(Int32)",
        LowCardinalityInt64 => "LowCardinality(Int64)",
        LowCardinalityUInt32 => "LowCardinality(UInt32)",
        LowCardinalityUInt64 => "LowCardinality(UInt64)",
        ArrayString => "Array(String)",
        ArrayBool => "Array(Bool)",
        ArrayInt8 => "Array(Int8)",
        ArrayInt16 => "Array(Int16)",
        ArrayInt32 => "Array(Int32)",
        ArrayInt64 => "Array(Int64)",
        ArrayUInt8 => "Array(UInt8)",
        ArrayUInt16 => "Array(UInt16)",
        ArrayUInt32 => "Array(UInt32)",
        ArrayUInt64 => "Array(UInt64)",
        ArrayFloat32 => "Array(Float32)",
        ArrayFloat64 => "Array(Float64)",
    }
}

impl SourceFieldType {
    /// Sink column types this source type may populate.
    pub fn compatible_column_types(self) -> &'static [SinkColumnType] {
        use SinkColumnType as C;

        match self {
            Self::String => &[
                C::String,
                C::FixedString,
                C::DateTime,
                C::DateTime64,
                C::Uuid,
                C::Enum8,
                C::Enum16,
                C::LowCardinalityString,
                C::LowCardinalityFixedString,
                C::LowCardinalityDateTime,
            ],
            Self::Bool => &[C::Bool],
            Self::Bytes => &[C::String, C::FixedString],
            Self::Int => &[C::Int8, C::Int16, C::Int32, C::Int64],
            Self::Int8 => &[C::Int8],
            Self::Int16 => &[C::Int16],
            Self::Int32 => &[C::Int32, C::LowCardinalityInt32],
            Self::Int64 => &[
                C::Int64,
                C::LowCardinalityInt64,
                C::DateTime,
                C::DateTime64,
            ],
            Self::Uint => &[C::UInt8, C::UInt16, C::UInt32, C::UInt64],
            Self::Uint8 => &[C::UInt8],
            Self::Uint16 => &[C::UInt16],
            Self::Uint32 => &[C::UInt32, C::LowCardinalityUInt32],
            Self::Uint64 => &[C::UInt64, C::LowCardinalityUInt64],
            Self::Float => &[C::Float32, C::Float64],
            Self::Float32 => &[C::Float32],
            Self::Float64 => &[C::Float64, C::DateTime64],
            Self::Array => &[
                C::String,
                C::ArrayString,
                C::ArrayBool,
                C::ArrayInt8,
                C::ArrayInt16,
                C::ArrayInt32,
                C::ArrayInt64,
                C::ArrayUInt8,
                C::ArrayUInt16,
                C::ArrayUInt32,
                C::ArrayUInt64,
                C::ArrayFloat32,
                C::ArrayFloat64,
            ],
        }
    }
}

/// Whether a value of `source` type may populate a column of `column` type.
pub fn is_compatible(source: SourceFieldType, column: SinkColumnType) -> bool {
    source.compatible_column_types().contains(&column)
}

/// Fails with `InvalidDataTypeMapping` when the pair is not in the table.
pub fn ensure_compatible(
    field_name: &str,
    source_id: &str,
    source: SourceFieldType,
    column: SinkColumnType,
) -> PipelineConfigResult<()> {
    if is_compatible(source, column) {
        return Ok(());
    }

    Err(PipelineConfigError::InvalidDataTypeMapping {
        field_name: field_name.to_string(),
        source_id: source_id.to_string(),
        source_type: source.to_string(),
        column_type: column.to_string(),
    })
}

#[cfg(test)]
#[path = "data_types_tests.rs"]
mod tests;
