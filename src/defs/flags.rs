use bitflags::bitflags;

bitflags! {
    /// Soldier input actions as produced by the player/AI controller.
    ///
    /// The same mask doubles as the animation machine's *input lock* mask:
    /// a set bit in `InputLocks` suppresses that action while the lock
    /// window is open.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InputFlags: u32 {
        // Movement axes. Only ever used as a lock bit.
        const THRUST                = 0x0000_0001;
        // View axes. Only ever used as a lock bit.
        const VIEW                  = 0x0000_0002;

        const FIRE_PRIMARY          = 0x0000_0004;
        const FIRE_SECONDARY        = 0x0000_0008;
        const RELOAD                = 0x0000_0010;
        const CROUCH                = 0x0000_0020;
        const ROLL                  = 0x0000_0040;
        const JUMP                  = 0x0000_0080;
        const SPRINT                = 0x0000_0100;
        const ZOOM                  = 0x0000_0200;

        // Vehicle / weapon management
        const ENTER                 = 0x0000_0400;
        const NEXT_PRIMARY_WEAPON   = 0x0000_0800;
        const NEXT_SECONDARY_WEAPON = 0x0000_1000;
    }
}

/// Edge classification of one tick's input, one mask per kind of edge.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEvents {
    /// Held this tick.
    pub down: InputFlags,
    /// Went up or down this tick.
    pub changed: InputFlags,
    /// Went down this tick.
    pub pressed: InputFlags,
    /// Went up this tick.
    pub released: InputFlags,
    /// Short press (released before the hold threshold).
    pub tab: InputFlags,
    /// Held past the hold threshold.
    pub hold: InputFlags,
}

impl InputEvents {
    #[inline]
    pub fn is_down(&self, f: InputFlags) -> bool {
        self.down.intersects(f)
    }

    #[inline]
    pub fn is_pressed(&self, f: InputFlags) -> bool {
        self.pressed.intersects(f)
    }

    #[inline]
    pub fn is_released(&self, f: InputFlags) -> bool {
        self.released.intersects(f)
    }

    /// Copy with every bit of `locked` cleared from every edge kind.
    pub fn masked(&self, locked: InputFlags) -> Self {
        Self {
            down: self.down - locked,
            changed: self.changed - locked,
            pressed: self.pressed - locked,
            released: self.released - locked,
            tab: self.tab - locked,
            hold: self.hold - locked,
        }
    }

    /// Forget the one-tick edges; `down`/`hold` describe a level and stay.
    pub fn clear_edges(&mut self) {
        self.changed = InputFlags::empty();
        self.pressed = InputFlags::empty();
        self.released = InputFlags::empty();
        self.tab = InputFlags::empty();
    }

    /// Build the events for a button transitioning from `was` to `now`.
    pub fn from_levels(was: InputFlags, now: InputFlags) -> Self {
        Self {
            down: now,
            changed: was ^ now,
            pressed: now - was,
            released: was - now,
            tab: InputFlags::empty(),
            hold: InputFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masking_clears_every_edge_kind() {
        let all = InputFlags::JUMP | InputFlags::FIRE_PRIMARY;
        let ev = InputEvents {
            down: all,
            changed: all,
            pressed: all,
            released: all,
            tab: all,
            hold: all,
        };
        let m = ev.masked(InputFlags::JUMP);
        for mask in [m.down, m.changed, m.pressed, m.released, m.tab, m.hold] {
            assert_eq!(mask, InputFlags::FIRE_PRIMARY);
        }
    }

    #[test]
    fn levels_produce_edges() {
        let ev = InputEvents::from_levels(InputFlags::SPRINT, InputFlags::JUMP);
        assert!(ev.is_pressed(InputFlags::JUMP));
        assert!(ev.is_released(InputFlags::SPRINT));
        assert!(ev.is_down(InputFlags::JUMP));
        assert!(!ev.is_down(InputFlags::SPRINT));
        assert_eq!(ev.changed, InputFlags::JUMP | InputFlags::SPRINT);
    }

    #[test]
    fn clearing_edges_keeps_levels() {
        let mut ev = InputEvents::from_levels(InputFlags::empty(), InputFlags::CROUCH);
        ev.hold = InputFlags::CROUCH;
        ev.clear_edges();
        assert!(ev.is_down(InputFlags::CROUCH));
        assert_eq!(ev.hold, InputFlags::CROUCH);
        assert!(ev.pressed.is_empty() && ev.changed.is_empty());
    }
}
