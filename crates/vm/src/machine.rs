//! Machine state: the stack array and the three registers.

use crate::error::RuntimeFault;
use pcode_common::{Instruction, Program};

/// Default stack capacity in slots.
pub const DEFAULT_STACK_SIZE: usize = 4096;

/// Absolute base of the synthetic outermost frame.
pub const ENTRY_BASE: usize = 1;

/// Execution state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// `p` points at an instruction still to be executed.
    Running,
    /// `p` ran past the end of the code; the stack holds the final result.
    Halted,
    /// A runtime fault stopped execution. Registers remain inspectable
    /// but the stack contents are not a valid result.
    Faulted,
}

/// The P-code abstract machine.
///
/// A fixed-capacity array of integers is the sole mutable memory, holding
/// both operand stack and activation frames. Frames are laid out from
/// their base: static link, dynamic link, return address, then locals.
#[derive(Debug)]
pub struct Machine<'a> {
    /// The code being executed.
    code: &'a [Instruction],
    /// The stack array `s`. Capacity is fixed at construction.
    s: Vec<i64>,
    /// Program counter: index of the next instruction.
    p: usize,
    /// Base pointer: absolute index of the current frame's first word.
    b: usize,
    /// Stack-top pointer: absolute index of the last occupied word.
    t: usize,
    state: State,
}

impl<'a> Machine<'a> {
    /// Create a machine with the default stack capacity.
    pub fn new(program: &'a Program) -> Self {
        Self::with_capacity(program, DEFAULT_STACK_SIZE)
    }

    /// Create a machine with an explicit stack capacity.
    ///
    /// The capacity is clamped to at least 4 slots, the minimum needed for
    /// the synthetic outermost frame. Exceeding the capacity during
    /// execution is a [`RuntimeFault::StackFault`], never a reallocation.
    pub fn with_capacity(program: &'a Program, capacity: usize) -> Self {
        let code = program.instructions.as_slice();
        let mut s = vec![0i64; capacity.max(4)];
        // Synthetic top-level frame: SL = 0, DL = 0, RA = end of code, so
        // a top-level `OPR 0 0` return halts the machine like any other.
        s[1] = 0;
        s[2] = 0;
        s[3] = code.len() as i64;
        Self {
            code,
            s,
            p: 0,
            b: ENTRY_BASE,
            t: 3,
            state: State::Running,
        }
    }

    /// Program counter.
    pub fn p(&self) -> usize {
        self.p
    }

    /// Base pointer.
    pub fn b(&self) -> usize {
        self.b
    }

    /// Stack-top pointer.
    pub fn t(&self) -> usize {
        self.t
    }

    /// Current execution state.
    pub fn state(&self) -> State {
        self.state
    }

    /// The full stack array, for result read-back and diagnostics.
    pub fn stack(&self) -> &[i64] {
        &self.s
    }

    /// Resolve a compiler-assigned frame offset against the outermost
    /// frame and read the value stored there.
    ///
    /// Offsets come from the compiler's symbol table and start at 3; the
    /// outermost frame begins at absolute index [`ENTRY_BASE`], so the
    /// value of offset `o` lives at `s[ENTRY_BASE + o]`.
    pub fn local(&self, offset: i32) -> Option<i64> {
        if offset < 0 {
            return None;
        }
        self.s.get(ENTRY_BASE + offset as usize).copied()
    }

    /// Follow the static-link chain `level` times from the current base.
    ///
    /// `base(0)` is always the current `b`.
    pub fn base(&self, level: u16) -> Result<usize, RuntimeFault> {
        self.base_from(level, self.p)
    }

    pub(crate) fn base_from(&self, level: u16, at: usize) -> Result<usize, RuntimeFault> {
        let mut current = self.b;
        for _ in 0..level {
            let link = self.load(current, at)?;
            if link < 0 || link as usize >= self.s.len() {
                return Err(RuntimeFault::StackFault { at, addr: link });
            }
            current = link as usize;
        }
        Ok(current)
    }

    pub(crate) fn code(&self) -> &[Instruction] {
        self.code
    }

    pub(crate) fn set_p(&mut self, p: usize) {
        self.p = p;
    }

    pub(crate) fn set_b(&mut self, b: usize) {
        self.b = b;
    }

    pub(crate) fn set_t(&mut self, t: usize) {
        self.t = t;
    }

    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Read `s[addr]`, bounds-checked.
    pub(crate) fn load(&self, addr: usize, at: usize) -> Result<i64, RuntimeFault> {
        self.s
            .get(addr)
            .copied()
            .ok_or(RuntimeFault::StackFault {
                at,
                addr: addr as i64,
            })
    }

    /// Write `s[addr]`, bounds-checked.
    pub(crate) fn store(&mut self, addr: usize, value: i64, at: usize) -> Result<(), RuntimeFault> {
        match self.s.get_mut(addr) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeFault::StackFault {
                at,
                addr: addr as i64,
            }),
        }
    }

    /// Grow `t` by one and write `value` at the new top.
    pub(crate) fn push(&mut self, value: i64, at: usize) -> Result<(), RuntimeFault> {
        let new_t = self.t + 1;
        self.store(new_t, value, at)?;
        self.t = new_t;
        Ok(())
    }

    /// Read the top of stack and shrink `t` by one.
    pub(crate) fn pop(&mut self, at: usize) -> Result<i64, RuntimeFault> {
        let value = self.load(self.t, at)?;
        self.t = self.t.checked_sub(1).ok_or(RuntimeFault::StackFault {
            at,
            addr: -1,
        })?;
        Ok(value)
    }
}
