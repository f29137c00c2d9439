use uuid::Uuid;

/// Objects carrying a random (v4) id, such as the result of one run.
pub trait ObjectWithUUID {
    fn uuid(&self) -> &Uuid;

    /// First eight hex digits of the id, for log lines and summaries.
    fn short_id(&self) -> String {
        let mut id = self.uuid().simple().to_string();
        id.truncate(8);
        id
    }
}
