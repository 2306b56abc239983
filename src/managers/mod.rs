// HairNova state managers
// Managers own the in-memory state the UI renders from.

pub mod history_manager;
