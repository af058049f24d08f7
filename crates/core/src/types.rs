/// A stored document in its generic JSON form.
pub type Document = serde_json::Value;
