// HairNova services
// Services provide the persistence pipeline and configuration.

pub mod history_store;
pub mod sanitizer;
pub mod serializer;
pub mod settings_engine;
