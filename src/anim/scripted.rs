use super::bridge::{AnimBridge, BridgeInputs, BridgeOutputs, Layer, LayerState};

/// Bridge whose outputs are set by hand.
///
/// Headless hosts put their own posture logic in front of it; tests poke
/// the outputs directly and inspect what the controller wrote back.
#[derive(Clone, Debug)]
pub struct ScriptedBridge {
    pub outputs: BridgeOutputs,
    pub inputs: BridgeInputs,
    pub layers: [Option<LayerState>; 2],
    pub playback_speed: [f32; 2],
    pub weapon_bank: Option<String>,
}

impl Default for ScriptedBridge {
    fn default() -> Self {
        Self {
            outputs: BridgeOutputs::default(),
            inputs: BridgeInputs::default(),
            layers: [Some(LayerState::default()); 2],
            playback_speed: [1.0; 2],
            weapon_bank: None,
        }
    }
}

impl ScriptedBridge {
    #[inline]
    pub fn layer_mut(&mut self, layer: Layer) -> &mut Option<LayerState> {
        &mut self.layers[layer as usize]
    }

    /// Advance both layers' playback clocks, wrapping at the clip end.
    pub fn advance(&mut self, dt: f32) {
        for (slot, speed) in self.layers.iter_mut().zip(self.playback_speed) {
            if let Some(l) = slot {
                l.time += dt * speed;
                if l.clip_duration > 0.0 && l.time > l.clip_duration {
                    l.time = l.time.rem_euclid(l.clip_duration);
                }
            }
        }
    }
}

impl AnimBridge for ScriptedBridge {
    fn outputs(&self) -> &BridgeOutputs {
        &self.outputs
    }

    fn inputs_mut(&mut self) -> &mut BridgeInputs {
        &mut self.inputs
    }

    fn layer(&self, layer: Layer) -> Option<LayerState> {
        self.layers[layer as usize]
    }

    fn set_playback_speed(&mut self, layer: Layer, speed: f32) {
        self.playback_speed[layer as usize] = speed;
    }

    fn set_active_weapon_bank(&mut self, bank: &str) {
        self.weapon_bank = Some(bank.to_owned());
    }
}
