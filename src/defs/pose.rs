/// How a vehicle seat animates its pilot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PilotAnimationType {
    #[default]
    None,
    /// One fixed pose.
    StaticPose,
    /// 8-directional movement blend plus idle.
    NinePose,
    /// Turn left/right/up/down blend plus idle.
    FivePose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NinePoseState {
    Idle,
    Forward,
    ForwardTurnLeft,
    ForwardTurnRight,
    Backwards,
    BackwardsTurnLeft,
    BackwardsTurnRight,
    StrafeLeft,
    StrafeRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FivePoseState {
    Idle,
    TurnLeft,
    TurnRight,
    TurnUp,
    TurnDown,
}
