use super::flags::{InputEvents, InputFlags};

/// Coarse stance reported by the animation machine.
///
/// Discriminants match the machine's integer output so a name-based
/// bridge can convert with [`Posture::from_raw`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Posture {
    #[default]
    Stand = 0,
    Crouch = 1,
    Prone = 2,
    Sprint = 3,
    Jet = 4,
    Jump = 5,
    Roll = 6,
    Tumble = 7,
    Fall = 8,
    Land = 9,
    /// Knocked through the air by an explosion.
    Thrown = 10,
}

impl Posture {
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Posture::Stand,
            1 => Posture::Crouch,
            2 => Posture::Prone,
            3 => Posture::Sprint,
            4 => Posture::Jet,
            5 => Posture::Jump,
            6 => Posture::Roll,
            7 => Posture::Tumble,
            8 => Posture::Fall,
            9 => Posture::Land,
            10 => Posture::Thrown,
            _ => return None,
        })
    }

    /// Control row used for speed factors.
    ///
    /// Class files only know `jump`, so `Fall` and `Land` alias to it;
    /// `Thrown` moves like a tumble. `Roll` maps to its own row here, the
    /// controller replaces it with the previous posture's factors.
    pub fn control(self) -> ControlPosture {
        match self {
            Posture::Stand => ControlPosture::Stand,
            Posture::Crouch => ControlPosture::Crouch,
            Posture::Prone => ControlPosture::Prone,
            Posture::Sprint => ControlPosture::Sprint,
            Posture::Jet => ControlPosture::Jet,
            Posture::Jump | Posture::Fall | Posture::Land => ControlPosture::Jump,
            Posture::Roll => ControlPosture::Roll,
            Posture::Tumble | Posture::Thrown => ControlPosture::Tumble,
        }
    }

    /// Jump, Fall or Land: the postures sharing the `jump` row.
    #[inline]
    pub fn is_airborne(self) -> bool {
        self.control() == ControlPosture::Jump
    }

    /// Postures whose playback speed follows the physical body speed.
    #[inline]
    pub fn is_grounded_locomotion(self) -> bool {
        matches!(
            self,
            Posture::Stand | Posture::Crouch | Posture::Prone | Posture::Sprint
        )
    }

    /// May this posture be remembered as the one a roll borrows from?
    #[inline]
    pub fn can_precede_roll(self) -> bool {
        !matches!(self, Posture::Roll) && !self.is_airborne()
    }
}

/// Key of the class-file `ControlSpeed` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlPosture {
    Stand,
    Crouch,
    Prone,
    Sprint,
    Jet,
    Jump,
    Roll,
    Tumble,
}

impl ControlPosture {
    pub const COUNT: usize = 8;

    pub const ALL: [ControlPosture; Self::COUNT] = [
        ControlPosture::Stand,
        ControlPosture::Crouch,
        ControlPosture::Prone,
        ControlPosture::Sprint,
        ControlPosture::Jet,
        ControlPosture::Jump,
        ControlPosture::Roll,
        ControlPosture::Tumble,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Row name as written in class files.
    pub fn name(self) -> &'static str {
        match self {
            ControlPosture::Stand => "stand",
            ControlPosture::Crouch => "crouch",
            ControlPosture::Prone => "prone",
            ControlPosture::Sprint => "sprint",
            ControlPosture::Jet => "jet",
            ControlPosture::Jump => "jump",
            ControlPosture::Roll => "roll",
            ControlPosture::Tumble => "tumble",
        }
    }
}

/// The single action a soldier intends this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    #[default]
    None = 0,
    ShootPrimary = 1,
    Reload = 2,
    Crouch = 3,
    Roll = 4,
    Jump = 5,
    Sprint = 6,
}

#[derive(Clone, Copy)]
enum Edge {
    Down,
    Pressed,
}

/// Highest priority first; the first matching row wins.
const ACTION_PRIORITY: [(Action, InputFlags, Edge); 6] = [
    (Action::ShootPrimary, InputFlags::FIRE_PRIMARY, Edge::Down),
    (Action::Reload, InputFlags::RELOAD, Edge::Pressed),
    (Action::Crouch, InputFlags::CROUCH, Edge::Pressed),
    (Action::Roll, InputFlags::ROLL, Edge::Pressed),
    (Action::Jump, InputFlags::JUMP, Edge::Pressed),
    (Action::Sprint, InputFlags::SPRINT, Edge::Down),
];

impl Action {
    /// Pick the tick's action from (already lock-masked) input edges.
    pub fn from_events(ev: &InputEvents) -> Self {
        ACTION_PRIORITY
            .iter()
            .find(|(_, flag, edge)| match edge {
                Edge::Down => ev.is_down(*flag),
                Edge::Pressed => ev.is_pressed(*flag),
            })
            .map(|(action, _, _)| *action)
            .unwrap_or(Action::None)
    }
}

/// How much of the skeleton follows the aim direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AimType {
    #[default]
    None,
    Head,
    Torso,
    /// The whole body turns with the aim; locomotion facing is ignored.
    FullBody,
}

/// Unit of an attack window's start/end values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeMode {
    #[default]
    Seconds,
    /// Battlefront frames (30 per second).
    Frames,
    /// Fraction of the active clip's duration.
    FromAnim,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(f: InputFlags) -> InputEvents {
        InputEvents {
            pressed: f,
            down: f,
            ..Default::default()
        }
    }

    #[test]
    fn fall_and_land_alias_jump() {
        assert_eq!(Posture::Fall.control(), ControlPosture::Jump);
        assert_eq!(Posture::Land.control(), ControlPosture::Jump);
        assert_eq!(Posture::Jump.control(), ControlPosture::Jump);
        assert!(Posture::Land.is_airborne());
        assert!(!Posture::Tumble.is_airborne());
    }

    #[test]
    fn roll_and_airborne_never_precede_roll() {
        for p in [Posture::Roll, Posture::Jump, Posture::Fall, Posture::Land] {
            assert!(!p.can_precede_roll(), "{p:?}");
        }
        for p in [Posture::Stand, Posture::Crouch, Posture::Sprint, Posture::Prone] {
            assert!(p.can_precede_roll(), "{p:?}");
        }
    }

    #[test]
    fn raw_posture_values_round_trip() {
        for raw in 0..=10 {
            let p = Posture::from_raw(raw).unwrap();
            assert_eq!(p as i32, raw);
        }
        assert_eq!(Posture::from_raw(11), None);
    }

    #[test]
    fn action_priority_order() {
        let everything = InputFlags::FIRE_PRIMARY
            | InputFlags::RELOAD
            | InputFlags::CROUCH
            | InputFlags::ROLL
            | InputFlags::JUMP
            | InputFlags::SPRINT;
        assert_eq!(Action::from_events(&pressed(everything)), Action::ShootPrimary);

        let no_fire = everything - InputFlags::FIRE_PRIMARY;
        assert_eq!(Action::from_events(&pressed(no_fire)), Action::Reload);

        let roll_jump = InputFlags::ROLL | InputFlags::JUMP | InputFlags::SPRINT;
        assert_eq!(Action::from_events(&pressed(roll_jump)), Action::Roll);

        assert_eq!(
            Action::from_events(&pressed(InputFlags::JUMP | InputFlags::SPRINT)),
            Action::Jump
        );
        assert_eq!(Action::from_events(&InputEvents::default()), Action::None);
    }

    #[test]
    fn held_jump_is_not_a_fresh_jump() {
        let ev = InputEvents {
            down: InputFlags::JUMP | InputFlags::SPRINT,
            ..Default::default()
        };
        assert_eq!(Action::from_events(&ev), Action::Sprint);
    }
}
