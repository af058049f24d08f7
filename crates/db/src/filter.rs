//! Translation between core selectors/documents and BSON.

use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use tourney_core::selector::Selector;
use tourney_core::types::Document;

use crate::error::StoreError;

/// Build the MongoDB query filter for a selector.
///
/// `{field: null}` in MongoDB matches both explicit nulls and absent
/// fields, which is exactly [`Selector::IsNull`]. Equality goes through
/// `$eq` so the value is always compared as a literal.
pub fn to_filter(selector: &Selector) -> Result<BsonDocument, StoreError> {
    selector.validate()?;
    build(selector)
}

fn build(selector: &Selector) -> Result<BsonDocument, StoreError> {
    let filter = match selector {
        Selector::All => BsonDocument::new(),
        Selector::IsNull { field } => doc! { field.as_str(): Bson::Null },
        Selector::Missing { field } => doc! { field.as_str(): { "$exists": false } },
        Selector::Equals { field, value } => {
            let value = bson::to_bson(value)
                .map_err(|e| StoreError::InvalidSelector(format!("{field}: {e}")))?;
            doc! { field.as_str(): { "$eq": value } }
        }
        Selector::And { clauses } => {
            let clauses = clauses
                .iter()
                .map(|c| build(c).map(Bson::Document))
                .collect::<Result<Vec<_>, _>>()?;
            doc! { "$and": clauses }
        }
    };
    Ok(filter)
}

/// Convert a stored BSON document to relaxed extended JSON.
pub fn to_json(document: BsonDocument) -> Document {
    Bson::Document(document).into_relaxed_extjson()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
