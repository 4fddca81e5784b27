pub mod participant;
pub mod step_entry;
