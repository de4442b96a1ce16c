use glam::Vec4;

use crate::anim::Poser;
use crate::defs::{FivePoseState, NinePoseState, PilotAnimationType};

/// Below this input magnitude the pilot idles.
const IDLE_EPSILON: f32 = 0.001;
/// Dead zone of a single axis.
const AXIS_EPSILON: f32 = 0.01;

/// Drive a seated pilot's pose from `(move.x, move.y, view.x, view.y)`.
///
/// Horizontal and forward/turn requests may both be issued in one tick;
/// the poser blends towards the last one.  A positive view x turns right.
pub fn update_pose(poser: &mut Poser, kind: PilotAnimationType, input: Vec4, dt: f32) {
    let blend = 2.0 * dt;

    match kind {
        PilotAnimationType::NinePose => {
            if input.length() < IDLE_EPSILON {
                poser.set_state(NinePoseState::Idle, blend);
                return;
            }

            if input.x > AXIS_EPSILON {
                poser.set_state(NinePoseState::StrafeRight, blend);
            }
            if input.x < -AXIS_EPSILON {
                poser.set_state(NinePoseState::StrafeLeft, blend);
            }

            // positive z turns right here as in five-pose seats; older
            // nine-pose rigs had the turn states mirrored
            let state = match (input.y < 0.0, input.z) {
                (true, z) if z > AXIS_EPSILON => NinePoseState::BackwardsTurnRight,
                (true, z) if z < -AXIS_EPSILON => NinePoseState::BackwardsTurnLeft,
                (true, _) => NinePoseState::Backwards,
                (false, z) if z > AXIS_EPSILON => NinePoseState::ForwardTurnRight,
                (false, z) if z < -AXIS_EPSILON => NinePoseState::ForwardTurnLeft,
                (false, _) => NinePoseState::Forward,
            };
            poser.set_state(state, blend);
        }
        PilotAnimationType::FivePose => {
            if input.z.abs() + input.w.abs() < IDLE_EPSILON {
                poser.set_state(FivePoseState::Idle, blend);
                return;
            }

            let turn = if input.z > AXIS_EPSILON {
                FivePoseState::TurnRight
            } else {
                FivePoseState::TurnLeft
            };
            poser.set_state(turn, blend);

            let pitch = if input.w > AXIS_EPSILON {
                FivePoseState::TurnDown
            } else {
                FivePoseState::TurnUp
            };
            poser.set_state(pitch, blend);
        }
        PilotAnimationType::StaticPose => poser.set_static(),
        // seat has a position but nothing to animate with
        PilotAnimationType::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{PoseRequest, PoseState};

    fn run(kind: PilotAnimationType, input: Vec4) -> Vec<PoseState> {
        let mut p = Poser::new("human_4", "human_test", kind == PilotAnimationType::StaticPose);
        update_pose(&mut p, kind, input, 0.02);
        p.requests().iter().map(|r| r.state).collect()
    }

    #[test]
    fn nine_pose_idles_on_no_input() {
        assert_eq!(
            run(PilotAnimationType::NinePose, Vec4::ZERO),
            vec![PoseState::Nine(NinePoseState::Idle)]
        );
    }

    #[test]
    fn nine_pose_combines_strafe_and_forward() {
        let states = run(PilotAnimationType::NinePose, Vec4::new(0.5, 1.0, 0.0, 0.0));
        assert_eq!(
            states,
            vec![
                PoseState::Nine(NinePoseState::StrafeRight),
                PoseState::Nine(NinePoseState::Forward)
            ]
        );
        let states = run(PilotAnimationType::NinePose, Vec4::new(-0.5, -1.0, -3.0, 0.0));
        assert_eq!(
            states,
            vec![
                PoseState::Nine(NinePoseState::StrafeLeft),
                PoseState::Nine(NinePoseState::BackwardsTurnLeft)
            ]
        );
    }

    #[test]
    fn five_pose_picks_turn_and_pitch() {
        assert_eq!(
            run(PilotAnimationType::FivePose, Vec4::new(1.0, 1.0, 0.0, 0.0)),
            vec![PoseState::Five(FivePoseState::Idle)]
        );
        assert_eq!(
            run(PilotAnimationType::FivePose, Vec4::new(0.0, 0.0, 2.0, -1.0)),
            vec![
                PoseState::Five(FivePoseState::TurnRight),
                PoseState::Five(FivePoseState::TurnUp)
            ]
        );
    }

    #[test]
    fn static_and_none() {
        assert_eq!(
            run(PilotAnimationType::StaticPose, Vec4::ONE),
            vec![PoseState::Static]
        );
        assert!(run(PilotAnimationType::None, Vec4::ONE).is_empty());
    }

    #[test]
    fn blend_is_twice_dt() {
        let mut p = Poser::new("human_4", "human_test", false);
        update_pose(&mut p, PilotAnimationType::NinePose, Vec4::ZERO, 0.05);
        assert_eq!(
            p.requests(),
            &[PoseRequest {
                state: PoseState::Nine(NinePoseState::Idle),
                blend: 0.1
            }]
        );
    }
}
