/// Database row type shared by the `rooms` and `users` tables.
/// `body` is the serde_json encoding of the entity from parley-types.
pub struct DocumentRow {
    pub id: String,
    pub body: String,
    pub updated_at: String,
}
