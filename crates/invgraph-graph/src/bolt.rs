//! JSON to Bolt conversion for query parameters.

use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType, Query};
use serde_json::Value;

use crate::error::{SyncError, SyncResult};
use crate::executor::Statement;

pub fn json_to_bolt(value: &Value) -> SyncResult<BoltType> {
    let bolt = match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(v) => BoltType::Boolean(BoltBoolean::new(*v)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                BoltType::Integer(BoltInteger::new(i))
            } else if let Some(f) = n.as_f64() {
                BoltType::Float(BoltFloat::new(f))
            } else {
                return Err(SyncError::conversion(format!("Unsupported JSON number: {n}")));
            }
        }
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => BoltType::List(BoltList {
            value: items.iter().map(json_to_bolt).collect::<SyncResult<_>>()?,
        }),
        Value::Object(map) => BoltType::Map(BoltMap {
            value: map
                .iter()
                .map(|(k, v)| Ok((BoltString::new(k), json_to_bolt(v)?)))
                .collect::<SyncResult<_>>()?,
        }),
    };
    Ok(bolt)
}

/// Build a neo4rs query with every parameter converted to Bolt.
pub fn to_query(statement: &Statement) -> SyncResult<Query> {
    let mut query = Query::new(statement.text.clone());
    for (name, value) in statement.params.iter() {
        query = query.param(name, json_to_bolt(value)?);
    }
    Ok(query)
}
