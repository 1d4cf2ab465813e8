/// How Fx55/Fx65 leave the index register once the copy is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexIncrement {
    /// I advances by exactly one.
    #[default]
    ByOne,
    /// I advances past the last register touched (I += X + 1).
    ByCount,
    /// I is left where it was.
    Unchanged,
}

/// Compatibility switches for instructions whose behaviour differs between CHIP-8 machines.
///
/// `Quirks::default()` is the canonical behaviour of this interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    /// 8xy6/8xyE copy Vy into Vx before shifting. When false, Vx is shifted in place.
    pub shift_loads_vy: bool,
    /// Bnnn jumps to Vx + nnn (x being the top nibble of nnn) instead of V0 + nnn.
    pub jump_offset_uses_vx: bool,
    /// 8xy1/8xy2/8xy3 clear VF.
    pub logic_resets_vf: bool,
    pub index_increment: IndexIncrement,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            shift_loads_vy: true,
            jump_offset_uses_vx: false,
            logic_resets_vf: true,
            index_increment: IndexIncrement::ByOne,
        }
    }
}

impl IndexIncrement {
    /// Returns the index register after a load/store that touched registers `0..=x`.
    pub(crate) fn apply(self, i: u16, x: u8) -> u16 {
        match self {
            IndexIncrement::ByOne => i.wrapping_add(1),
            IndexIncrement::ByCount => i.wrapping_add(u16::from(x) + 1),
            IndexIncrement::Unchanged => i,
        }
    }
}
