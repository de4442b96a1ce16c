//! Posture → control factors, including the roll special case.
//!
//! | posture reported | row used                           |
//! |------------------|------------------------------------|
//! | Fall, Land       | `jump`                             |
//! | Thrown           | `tumble`                           |
//! | Roll             | row of the remembered predecessor  |
//! | anything else    | its own row                        |
//!
//! A predecessor is any posture that is neither Roll nor airborne.

use super::TickError;
use crate::class::{ControlFactors, ControlSpeedTable};
use crate::defs::Posture;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostureTracker {
    previous: Option<Posture>,
}

impl PostureTracker {
    /// Last posture a roll may borrow from.
    #[inline]
    pub fn previous(&self) -> Option<Posture> {
        self.previous
    }

    pub fn observe(&mut self, posture: Posture) {
        if posture.can_precede_roll() {
            self.previous = Some(posture);
        }
    }

    /// Factors for this tick's posture, then remember it.
    pub fn factors(
        &mut self,
        posture: Posture,
        table: &ControlSpeedTable,
    ) -> Result<ControlFactors, TickError> {
        let row = match posture {
            Posture::Roll => self
                .previous
                .ok_or(TickError::RollWithoutPredecessor)?
                .control(),
            p => p.control(),
        };
        self.observe(posture);
        Ok(table.get(row))
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::ControlPosture;

    fn table() -> ControlSpeedTable {
        ControlSpeedTable::from_rows(
            ControlPosture::ALL
                .iter()
                .enumerate()
                .map(|(i, p)| (p.name(), ControlFactors::new(i as f32, 10.0 + i as f32, 0.5))),
        )
        .unwrap()
    }

    #[test]
    fn fall_and_land_read_the_jump_row() {
        let t = table();
        let mut pt = PostureTracker::default();
        let jump = pt.factors(Posture::Jump, &t).unwrap();
        assert_eq!(pt.factors(Posture::Fall, &t).unwrap(), jump);
        assert_eq!(pt.factors(Posture::Land, &t).unwrap(), jump);
        assert_eq!(jump, t.get(ControlPosture::Jump));
    }

    #[test]
    fn roll_borrows_last_grounded_posture() {
        let t = table();
        let mut pt = PostureTracker::default();
        pt.factors(Posture::Crouch, &t).unwrap();
        pt.factors(Posture::Jump, &t).unwrap();
        pt.factors(Posture::Fall, &t).unwrap();
        let roll = pt.factors(Posture::Roll, &t).unwrap();
        assert_eq!(roll, t.get(ControlPosture::Crouch));
        // still borrowing on the following roll tick
        assert_eq!(pt.factors(Posture::Roll, &t).unwrap(), roll);
        assert_eq!(pt.previous(), Some(Posture::Crouch));
    }

    #[test]
    fn roll_without_predecessor_is_an_error() {
        let t = table();
        let mut pt = PostureTracker::default();
        assert_eq!(
            pt.factors(Posture::Roll, &t),
            Err(TickError::RollWithoutPredecessor)
        );
        pt.factors(Posture::Land, &t).unwrap();
        assert!(pt.factors(Posture::Roll, &t).is_err());
    }
}
