mod bridge;
mod poser;
mod scripted;

pub use bridge::{AnimBridge, AttackOutput, Attacks, BridgeInputs, BridgeOutputs, Layer, LayerState};
pub use poser::{PoseRequest, PoseState, Poser};
pub use scripted::ScriptedBridge;
