// ──────────────────────────────────────────────────────────────────────────
// class/loader.rs
//
//  *   TOML text  ──serde──►  RawClass  ──validate──►  SoldierClass
// ──────────────────────────────────────────────────────────────────────────

use glam::Vec2;
use serde::Deserialize;
use std::{fs, path::Path};

use super::{ClassError, ControlFactors, ControlSpeedTable, SoldierClass, WeaponEntry};
use crate::defs::Channel;

/*──────────────────────────── Raw file form ────────────────────────────*/

fn one() -> f32 {
    1.0
}

fn hundred() -> f32 {
    100.0
}

fn human() -> String {
    "human".into()
}

fn default_aim() -> [f32; 2] {
    [45.0, 180.0]
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawControlSpeed {
    control: String,
    thrust: f32,
    strafe: f32,
    turn: f32,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawWeapon {
    name: String,
    #[serde(default)]
    channel: i64,
    #[serde(default)]
    ammo: u32,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RawClass {
    name: String,
    #[serde(default = "hundred")]
    max_health: f32,
    #[serde(default = "one")]
    max_speed: f32,
    #[serde(default = "one")]
    max_strafe_speed: f32,
    #[serde(default = "one")]
    max_turn_speed: f32,
    #[serde(default = "one")]
    jump_height: f32,
    #[serde(default = "one")]
    acceleration: f32,
    #[serde(default = "human")]
    animation_name: String,
    #[serde(default = "human")]
    skeleton_name: String,
    /// `[pitch, yaw]` in degrees.
    #[serde(default = "default_aim")]
    aim_constraint: [f32; 2],
    #[serde(default)]
    control_speed: Vec<RawControlSpeed>,
    #[serde(default)]
    weapons: Vec<RawWeapon>,
}

/*──────────────────────────── Validation ───────────────────────────────*/

fn scalar(name: &'static str, value: f32) -> Result<f32, ClassError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ClassError::BadScalar { name, value })
    }
}

impl TryFrom<RawClass> for SoldierClass {
    type Error = ClassError;

    fn try_from(raw: RawClass) -> Result<Self, ClassError> {
        let control_speed = ControlSpeedTable::from_rows(raw.control_speed.iter().map(|r| {
            (
                r.control.as_str(),
                ControlFactors::new(r.thrust, r.strafe, r.turn),
            )
        }))?;

        let weapons = raw
            .weapons
            .into_iter()
            .map(|w| match Channel::from_index(w.channel) {
                Some(channel) => Ok(WeaponEntry {
                    name: w.name,
                    channel,
                    ammo: w.ammo,
                }),
                None => Err(ClassError::BadWeaponChannel {
                    name: w.name,
                    channel: w.channel,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SoldierClass {
            name: raw.name,
            max_health: scalar("max_health", raw.max_health)?,
            max_speed: scalar("max_speed", raw.max_speed)?,
            max_strafe_speed: scalar("max_strafe_speed", raw.max_strafe_speed)?,
            max_turn_speed: scalar("max_turn_speed", raw.max_turn_speed)?,
            jump_height: scalar("jump_height", raw.jump_height)?,
            acceleration: scalar("acceleration", raw.acceleration)?,
            animation_name: raw.animation_name,
            skeleton_name: raw.skeleton_name,
            aim_constraint: Vec2::new(
                scalar("aim_constraint", raw.aim_constraint[0])?,
                scalar("aim_constraint", raw.aim_constraint[1])?,
            ),
            control_speed,
            weapons,
        })
    }
}

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

impl SoldierClass {
    /// Parse and validate a class from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ClassError> {
        let raw: RawClass = toml::from_str(text)?;
        raw.try_into()
    }

    /// Load a class file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::ControlPosture;

    const RIFLEMAN: &str = r#"
name = "rep_inf_ep3_rifleman"
max_speed = 7.0
max_strafe_speed = 5.0
max_turn_speed = 4.5
jump_height = 1.6
acceleration = 40.0

control_speed = [
    { control = "stand",  thrust = 1.0,  strafe = 1.0,  turn = 1.0 },
    { control = "crouch", thrust = 0.7,  strafe = 0.7,  turn = 1.0 },
    { control = "prone",  thrust = 0.25, strafe = 0.25, turn = 0.5 },
    { control = "sprint", thrust = 1.5,  strafe = 0.2,  turn = 0.3 },
    { control = "jet",    thrust = 1.0,  strafe = 1.0,  turn = 1.0 },
    { control = "jump",   thrust = 0.1,  strafe = 0.1,  turn = 0.7 },
    { control = "roll",   thrust = 1.0,  strafe = 1.0,  turn = 0.0 },
    { control = "tumble", thrust = 0.0,  strafe = 0.0,  turn = 0.1 },
]

[[weapons]]
name = "rep_weap_inf_rifle"
ammo = 6

[[weapons]]
name = "rep_weap_inf_thermaldetonator"
channel = 1
ammo = 4
"#;

    /*------------------------------------------------------------------*/
    /* 1. Happy path                                                    */
    /*------------------------------------------------------------------*/
    #[test]
    fn parses_full_class() {
        let c = SoldierClass::from_toml_str(RIFLEMAN).unwrap();
        assert_eq!(c.name, "rep_inf_ep3_rifleman");
        assert_eq!(c.max_speed, 7.0);
        assert_eq!(c.max_health, 100.0);
        assert_eq!(c.aim_constraint, Vec2::new(45.0, 180.0));
        assert_eq!(c.control_speed.get(ControlPosture::Sprint).thrust, 1.5);
        assert_eq!(c.weapons.len(), 2);
        assert_eq!(c.weapons[0].channel, Channel::Primary);
        assert_eq!(c.weapons[1].channel, Channel::Secondary);
        assert_eq!(c.weapons[1].ammo, 4);
    }

    /*------------------------------------------------------------------*/
    /* 2. Missing control row is a load error                           */
    /*------------------------------------------------------------------*/
    #[test]
    fn rejects_missing_control_row() {
        let text = RIFLEMAN.replace(
            r#"{ control = "tumble", thrust = 0.0,  strafe = 0.0,  turn = 0.1 },"#,
            "",
        );
        let err = SoldierClass::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ClassError::MissingControlSpeed("tumble")));
    }

    /*------------------------------------------------------------------*/
    /* 3. Weapon channel guard                                          */
    /*------------------------------------------------------------------*/
    #[test]
    fn rejects_third_channel() {
        let text = RIFLEMAN.replace("channel = 1", "channel = 2");
        let err = SoldierClass::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ClassError::BadWeaponChannel { channel: 2, .. }));
    }

    /*------------------------------------------------------------------*/
    /* 4. Scalar guard                                                  */
    /*------------------------------------------------------------------*/
    #[test]
    fn rejects_negative_speed() {
        let text = RIFLEMAN.replace("max_speed = 7.0", "max_speed = -7.0");
        let err = SoldierClass::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ClassError::BadScalar { name: "max_speed", .. }));
    }

    /*------------------------------------------------------------------*/
    /* 5. Garbage text                                                  */
    /*------------------------------------------------------------------*/
    #[test]
    fn rejects_malformed_toml() {
        let err = SoldierClass::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, ClassError::Toml(_)));
    }

    /*------------------------------------------------------------------*/
    /* 6. From disk                                                     */
    /*------------------------------------------------------------------*/
    #[test]
    fn loads_from_file() {
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(tmp.path(), RIFLEMAN).unwrap();
        let c = SoldierClass::from_file(tmp.path()).unwrap();
        assert_eq!(c.jump_height, 1.6);

        let err = SoldierClass::from_file(tmp.path().with_extension("missing")).unwrap_err();
        assert!(matches!(err, ClassError::Io(_)));
    }
}
