//! Semantic type to storage type conversion table

use sproc_core::{BindError, ScalarKind, SemanticType, StorageType};

/// Map a semantic type to the storage type its parameter is declared with.
///
/// The table is total over the supported kinds. Nullable-wrapped types share
/// the tag of their underlying kind; the binder records the nullability on
/// the parameter itself. Kinds without a storage equivalent fail here, at
/// bind time, rather than when the routine runs.
pub fn storage_type_for(parameter: &str, semantic: SemanticType) -> Result<StorageType, BindError> {
    let storage = match semantic.kind {
        ScalarKind::Bool => StorageType::Boolean,
        ScalarKind::Int8 => StorageType::SByte,
        ScalarKind::UInt8 => StorageType::Byte,
        ScalarKind::Int16 => StorageType::Int16,
        ScalarKind::Int32 => StorageType::Int32,
        ScalarKind::Int64 => StorageType::Int64,
        ScalarKind::Float32 => StorageType::Single,
        ScalarKind::Float64 => StorageType::Double,
        ScalarKind::Decimal => StorageType::Decimal,
        ScalarKind::Text => StorageType::String,
        ScalarKind::Bytes => StorageType::Binary,
        ScalarKind::Uuid => StorageType::Guid,
        ScalarKind::Date => StorageType::Date,
        ScalarKind::Time => StorageType::Time,
        ScalarKind::DateTime => StorageType::DateTime2,
        ScalarKind::DateTimeOffset => StorageType::DateTimeOffset,
        ScalarKind::UInt16
        | ScalarKind::UInt32
        | ScalarKind::UInt64
        | ScalarKind::Json
        | ScalarKind::Array => {
            return Err(BindError::UnsupportedType {
                parameter: parameter.to_string(),
                type_name: semantic.to_string(),
            });
        }
    };
    Ok(storage)
}
