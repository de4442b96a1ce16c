use smallvec::SmallVec;

use crate::defs::{FivePoseState, NinePoseState};

/// Target pose of a seated pilot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoseState {
    Nine(NinePoseState),
    Five(FivePoseState),
    Static,
}

impl From<NinePoseState> for PoseState {
    fn from(s: NinePoseState) -> Self {
        PoseState::Nine(s)
    }
}

impl From<FivePoseState> for PoseState {
    fn from(s: FivePoseState) -> Self {
        PoseState::Five(s)
    }
}

/// One `set_state` call: blend towards `state` over `blend` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseRequest {
    pub state: PoseState,
    pub blend: f32,
}

/// Drives a pilot skeleton from a vehicle seat's pose clip instead of the
/// humanoid state machine.
///
/// Requests made during one tick are kept in call order; the last one is
/// the pose the skeleton blends towards.
#[derive(Clone, Debug)]
pub struct Poser {
    bank: String,
    clip: String,
    is_static: bool,
    current: Option<PoseState>,
    requests: SmallVec<[PoseRequest; 2]>,
}

impl Poser {
    pub fn new(bank: impl Into<String>, clip: impl Into<String>, is_static: bool) -> Self {
        Self {
            bank: bank.into(),
            clip: clip.into(),
            is_static,
            current: None,
            requests: SmallVec::new(),
        }
    }

    #[inline]
    pub fn bank(&self) -> &str {
        &self.bank
    }

    #[inline]
    pub fn clip(&self) -> &str {
        &self.clip
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Pose the skeleton currently blends towards.
    #[inline]
    pub fn current(&self) -> Option<PoseState> {
        self.current
    }

    /// Requests issued since the last [`Poser::begin_tick`].
    #[inline]
    pub fn requests(&self) -> &[PoseRequest] {
        &self.requests
    }

    pub fn begin_tick(&mut self) {
        self.requests.clear();
    }

    pub fn set_state(&mut self, state: impl Into<PoseState>, blend: f32) {
        let state = state.into();
        self.requests.push(PoseRequest { state, blend });
        self.current = Some(state);
    }

    /// Request the single fixed pose of a static seat.
    pub fn set_static(&mut self) {
        self.set_state(PoseState::Static, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_request_wins() {
        let mut p = Poser::new("human_4", "human_speeder_9pose", false);
        p.set_state(NinePoseState::StrafeRight, 0.04);
        p.set_state(NinePoseState::Forward, 0.04);
        assert_eq!(p.requests().len(), 2);
        assert_eq!(p.current(), Some(PoseState::Nine(NinePoseState::Forward)));

        p.begin_tick();
        assert!(p.requests().is_empty());
        assert_eq!(p.current(), Some(PoseState::Nine(NinePoseState::Forward)));
    }
}
