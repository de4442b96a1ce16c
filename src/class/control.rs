//! Per-posture speed factors (`ControlSpeed` rows of a soldier class).

use super::ClassError;
use crate::defs::{ControlPosture, control_by_name};
use tracing::warn;

/// `<thrustfactor> <strafefactor> <turnfactor>` of one control row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlFactors {
    pub thrust: f32,
    pub strafe: f32,
    pub turn: f32,
}

impl ControlFactors {
    pub const ONE: ControlFactors = ControlFactors {
        thrust: 1.0,
        strafe: 1.0,
        turn: 1.0,
    };

    pub const fn new(thrust: f32, strafe: f32, turn: f32) -> Self {
        Self {
            thrust,
            strafe,
            turn,
        }
    }
}

/// Fully populated posture → factors table.
///
/// Construction fails unless every [`ControlPosture`] has a row, so lookups
/// during a tick can never miss.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSpeedTable {
    rows: [ControlFactors; ControlPosture::COUNT],
}

impl ControlSpeedTable {
    /// Same factors for every posture.
    pub fn uniform(f: ControlFactors) -> Self {
        Self {
            rows: [f; ControlPosture::COUNT],
        }
    }

    /// Build from named rows, in file order.
    ///
    /// Unknown names are skipped with a warning, a repeated name is an
    /// error, and so is any posture left without a row.
    pub fn from_rows<'a, I>(rows: I) -> Result<Self, ClassError>
    where
        I: IntoIterator<Item = (&'a str, ControlFactors)>,
    {
        let mut slots: [Option<ControlFactors>; ControlPosture::COUNT] =
            [None; ControlPosture::COUNT];

        for (name, factors) in rows {
            let Some(posture) = control_by_name(name) else {
                warn!(control = name, "ignoring unknown control speed row");
                continue;
            };
            let slot = &mut slots[posture.index()];
            if slot.is_some() {
                return Err(ClassError::DuplicateControlSpeed(posture.name()));
            }
            *slot = Some(factors);
        }

        let mut table = [ControlFactors::ONE; ControlPosture::COUNT];
        for posture in ControlPosture::ALL {
            table[posture.index()] = slots[posture.index()]
                .ok_or(ClassError::MissingControlSpeed(posture.name()))?;
        }
        Ok(Self { rows: table })
    }

    #[inline]
    pub fn get(&self, posture: ControlPosture) -> ControlFactors {
        self.rows[posture.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_rows() -> Vec<(&'static str, ControlFactors)> {
        ControlPosture::ALL
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), ControlFactors::new(i as f32, 1.0, 2.0)))
            .collect()
    }

    #[test]
    fn complete_rows_build_a_table() {
        let table = ControlSpeedTable::from_rows(all_rows()).unwrap();
        assert_eq!(table.get(ControlPosture::Stand).thrust, 0.0);
        assert_eq!(table.get(ControlPosture::Tumble).thrust, 7.0);
        assert_eq!(table.get(ControlPosture::Jump).turn, 2.0);
    }

    #[test]
    fn missing_row_is_rejected() {
        let rows: Vec<_> = all_rows()
            .into_iter()
            .filter(|(n, _)| *n != "prone")
            .collect();
        let err = ControlSpeedTable::from_rows(rows).unwrap_err();
        assert!(matches!(err, ClassError::MissingControlSpeed("prone")));
    }

    #[test]
    fn duplicate_row_is_rejected() {
        let mut rows = all_rows();
        rows.push(("jump", ControlFactors::ONE));
        let err = ControlSpeedTable::from_rows(rows).unwrap_err();
        assert!(matches!(err, ClassError::DuplicateControlSpeed("jump")));
    }

    #[test]
    fn unknown_rows_are_ignored() {
        let mut rows = all_rows();
        rows.push(("swim", ControlFactors::ONE));
        assert!(ControlSpeedTable::from_rows(rows).is_ok());
    }
}
