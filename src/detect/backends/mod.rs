pub mod scripted;

pub use scripted::ScriptedBackend;
