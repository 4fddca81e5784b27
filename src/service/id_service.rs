use uuid::Uuid;

pub fn generate_entry_id() -> String {
    format!("entry-{}", Uuid::new_v4())
}

pub fn generate_participant_id() -> String {
    format!("user-{}", Uuid::new_v4())
}
