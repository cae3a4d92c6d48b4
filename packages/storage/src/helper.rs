use chrono::Utc;
use vitrine_types::{Record, Value, create_id};

use crate::traits::{EntityKind, StorageError, StorageResult};

/// Ids may come back as strings or numbers depending on the table definition.
pub(crate) fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Assigns an id and a creation timestamp to a row that lacks them.
pub(crate) fn prepare_new(mut fields: Record) -> (String, Record) {
    let id = record_id(&fields).unwrap_or_else(create_id);
    fields.insert("id".to_string(), Value::String(id.clone()));
    fields
        .entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    (id, fields)
}

pub(crate) fn insert_row(rows: &mut Vec<Record>, fields: Record) -> StorageResult<String> {
    let (id, fields) = prepare_new(fields);
    if rows.iter().any(|row| record_id(row).as_deref() == Some(id.as_str())) {
        return Err(StorageError::InvalidRecord(format!("duplicate id {id}")));
    }
    rows.push(fields);
    Ok(id)
}

pub(crate) fn merge_row(
    rows: &mut [Record],
    kind: EntityKind,
    id: &str,
    fields: Record,
) -> StorageResult<()> {
    let row = rows
        .iter_mut()
        .find(|row| record_id(row).as_deref() == Some(id))
        .ok_or_else(|| StorageError::NotFound {
            kind,
            id: id.to_string(),
        })?;

    for (key, value) in fields {
        // the id is the row's identity, never rewritten by an update
        if key == "id" {
            continue;
        }
        row.insert(key, value);
    }
    Ok(())
}

pub(crate) fn remove_row(rows: &mut Vec<Record>, id: &str) -> bool {
    let before = rows.len();
    rows.retain(|row| record_id(row).as_deref() != Some(id));
    rows.len() != before
}
