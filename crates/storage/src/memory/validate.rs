//! Bound-value type checking against declared column types

use eventsink_core::{Bucket, BoundValue, Column, ColumnType, StoreError, StoreResult, Value};
use uuid::Uuid;

/// Check that `value` can be stored in `column`.
pub(crate) fn check(column: &Column, value: &BoundValue) -> StoreResult<()> {
    let ty = &column.column_type;
    let fits = match value {
        BoundValue::Null => true,
        BoundValue::Uuid(id) => match ty {
            ColumnType::Uuid => true,
            ColumnType::TimeUuid => id.get_version_num() == 1,
            _ => false,
        },
        BoundValue::Text(_) => ty.is_textual(),
        BoundValue::Timestamp(_) => *ty == ColumnType::Timestamp,
        BoundValue::Bucket(bucket) => bucket_fits(ty, bucket),
        BoundValue::Field(v) => value_fits(ty, v),
    };

    if fits {
        Ok(())
    } else {
        Err(StoreError::TypeMismatch {
            column: column.name.clone(),
            expected: ty.to_string(),
            found: describe(value),
        })
    }
}

fn bucket_fits(ty: &ColumnType, bucket: &Bucket) -> bool {
    let ColumnType::Map(key, value) = ty else {
        return false;
    };
    if !key.is_textual() {
        return false;
    }
    match bucket {
        Bucket::Bool(_) => **value == ColumnType::Boolean,
        Bucket::Timestamp(_) => **value == ColumnType::Timestamp,
        Bucket::Int(m) => match **value {
            ColumnType::BigInt => true,
            ColumnType::Int => m.values().all(|i| i32::try_from(*i).is_ok()),
            _ => false,
        },
        Bucket::Float(_) => value.is_floating(),
        Bucket::Text(_) => value.is_textual(),
    }
}

fn value_fits(ty: &ColumnType, value: &Value) -> bool {
    match (ty, value) {
        (_, Value::Null) => true,
        // Types the store cannot check are accepted as-is
        (ColumnType::Other(_), _) => true,
        (ColumnType::Boolean, Value::Bool(_)) => true,
        (ColumnType::BigInt, Value::Int(_)) => true,
        (ColumnType::Int, Value::Int(i)) => i32::try_from(*i).is_ok(),
        (ColumnType::Float | ColumnType::Double, Value::Float(_) | Value::Int(_)) => true,
        (ColumnType::Text, Value::String(_)) => true,
        (ColumnType::Ascii, Value::String(s)) => s.is_ascii(),
        (ColumnType::Timestamp, Value::Timestamp(_)) => true,
        (ColumnType::Uuid, Value::String(s)) => Uuid::parse_str(s).is_ok(),
        (ColumnType::Set(element) | ColumnType::List(element), Value::Array(items)) => items
            .iter()
            .all(|item| !item.is_null() && value_fits(element, item)),
        (ColumnType::Map(key, element), Value::Object(entries)) => {
            key.is_textual() && entries.values().all(|v| value_fits(element, v))
        }
        _ => false,
    }
}

fn describe(value: &BoundValue) -> String {
    match value {
        BoundValue::Null => "null".to_string(),
        BoundValue::Uuid(_) => "uuid".to_string(),
        BoundValue::Text(_) => "text".to_string(),
        BoundValue::Timestamp(_) => "timestamp".to_string(),
        BoundValue::Bucket(bucket) => format!("{} bucket", bucket.kind()),
        BoundValue::Field(v) => v.type_name().to_string(),
    }
}
