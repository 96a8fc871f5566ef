pub mod command;

pub use command::{CommandSynthesizer, EngineKind};
