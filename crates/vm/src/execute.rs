//! Fetch-decode-execute loop and opcode dispatch.

use crate::error::RuntimeFault;
use crate::machine::{Machine, State};
use pcode_common::{Instruction, Opcode, Opr};

impl<'a> Machine<'a> {
    /// Run until the machine halts or faults.
    ///
    /// On `Err` the machine is left in the [`State::Faulted`] state with
    /// registers frozen at the faulting instruction.
    pub fn execute(&mut self) -> Result<(), RuntimeFault> {
        while self.state() == State::Running {
            self.step()?;
        }
        Ok(())
    }

    /// Execute a single instruction and return the resulting state.
    ///
    /// Calling `step` on a halted or faulted machine is a no-op.
    pub fn step(&mut self) -> Result<State, RuntimeFault> {
        if self.state() != State::Running {
            return Ok(self.state());
        }
        if self.p() >= self.code().len() {
            self.set_state(State::Halted);
            return Ok(State::Halted);
        }

        let at = self.p();
        let instr = self.code()[at];
        // The counter advances before any effect, so saved return
        // addresses and all targets are absolute code indices.
        self.set_p(at + 1);

        if let Err(fault) = self.dispatch(instr, at) {
            self.set_state(State::Faulted);
            return Err(fault);
        }

        if self.p() >= self.code().len() {
            self.set_state(State::Halted);
        }
        Ok(self.state())
    }

    fn dispatch(&mut self, instr: Instruction, at: usize) -> Result<(), RuntimeFault> {
        match instr.op {
            Opcode::Lit => self.push(instr.arg as i64, at),

            Opcode::Lod => {
                let addr = self.data_addr(instr.level, instr.arg, at)?;
                let value = self.load(addr, at)?;
                self.push(value, at)
            }

            Opcode::Sto => {
                let addr = self.data_addr(instr.level, instr.arg, at)?;
                let value = self.pop(at)?;
                self.store(addr, value, at)
            }

            Opcode::Int => {
                let new_t = self.t() as i64 + instr.arg as i64;
                if new_t < 0 || new_t >= self.stack().len() as i64 {
                    return Err(RuntimeFault::StackFault { at, addr: new_t });
                }
                self.set_t(new_t as usize);
                Ok(())
            }

            Opcode::Jmp => {
                let target = self.branch_target(instr.arg, at)?;
                self.set_p(target);
                Ok(())
            }

            Opcode::Jpc => {
                let target = self.branch_target(instr.arg, at)?;
                // The condition is consumed on both branches.
                let cond = self.pop(at)?;
                if cond == 0 {
                    self.set_p(target);
                }
                Ok(())
            }

            Opcode::Cal => {
                let target = self.branch_target(instr.arg, at)?;
                let static_link = self.base_from(instr.level, at)?;
                let nb = self.t() + 1;
                self.store(nb, static_link as i64, at)?;
                self.store(nb + 1, self.b() as i64, at)?;
                // p was already advanced past the CAL instruction.
                self.store(nb + 2, self.p() as i64, at)?;
                self.set_b(nb);
                self.set_t(nb + 2);
                self.set_p(target);
                Ok(())
            }

            Opcode::Opr => {
                let code =
                    Opr::from_arg(instr.arg).ok_or(RuntimeFault::InvalidOpcode {
                        at,
                        code: instr.arg,
                    })?;
                self.operate(code, at)
            }
        }
    }

    fn operate(&mut self, code: Opr, at: usize) -> Result<(), RuntimeFault> {
        match code {
            Opr::Return => self.op_return(at),

            Opr::Neg => self.unary(at, |v| v.wrapping_neg()),
            Opr::Odd => self.unary(at, |v| v & 1),

            Opr::Add => self.binary(at, |l, r| Ok(l.wrapping_add(r))),
            Opr::Sub => self.binary(at, |l, r| Ok(l.wrapping_sub(r))),
            Opr::Mul => self.binary(at, |l, r| Ok(l.wrapping_mul(r))),
            Opr::Div => self.binary(at, move |l, r| {
                if r == 0 {
                    Err(RuntimeFault::DivisionByZero { at })
                } else {
                    Ok(l.wrapping_div(r))
                }
            }),
            Opr::Mod => self.binary(at, move |l, r| {
                if r == 0 {
                    Err(RuntimeFault::DivisionByZero { at })
                } else {
                    Ok(l.wrapping_rem(r))
                }
            }),

            Opr::Eq => self.compare(at, |l, r| l == r),
            Opr::Ne => self.compare(at, |l, r| l != r),
            Opr::Lt => self.compare(at, |l, r| l < r),
            Opr::Ge => self.compare(at, |l, r| l >= r),
            Opr::Gt => self.compare(at, |l, r| l > r),
            Opr::Le => self.compare(at, |l, r| l <= r),

            Opr::And => self.compare(at, |l, r| l != 0 && r != 0),
            Opr::Or => self.compare(at, |l, r| l != 0 || r != 0),
        }
    }

    /// `OPR _ 0`: tear down the current frame and resume the caller.
    ///
    /// The word at the stack top survives as the return value; callers
    /// that expect no value simply ignore the slot.
    fn op_return(&mut self, at: usize) -> Result<(), RuntimeFault> {
        let value = self.load(self.t(), at)?;

        let b = self.b();
        let new_t = b.checked_sub(1).ok_or(RuntimeFault::StackFault {
            at,
            addr: -1,
        })?;

        let ra = self.load(b + 2, at)?;
        if ra < 0 || ra as usize > self.code().len() {
            return Err(RuntimeFault::InvalidAddress { at, target: ra });
        }
        let new_b = self.load(b + 1, at)?;
        if new_b < 0 || new_b as usize >= self.stack().len() {
            return Err(RuntimeFault::StackFault { at, addr: new_b });
        }

        self.set_t(new_t);
        self.set_p(ra as usize);
        self.set_b(new_b as usize);
        self.push(value, at)
    }

    /// Replace the top of stack in place.
    fn unary(&mut self, at: usize, f: impl FnOnce(i64) -> i64) -> Result<(), RuntimeFault> {
        let value = self.load(self.t(), at)?;
        self.store(self.t(), f(value), at)
    }

    /// Pop the right operand, combine with the left, store at the new top.
    fn binary(
        &mut self,
        at: usize,
        f: impl FnOnce(i64, i64) -> Result<i64, RuntimeFault>,
    ) -> Result<(), RuntimeFault> {
        let right = self.pop(at)?;
        let left = self.load(self.t(), at)?;
        let result = f(left, right)?;
        self.store(self.t(), result, at)
    }

    /// Binary comparison pushing 1 or 0.
    fn compare(&mut self, at: usize, f: impl FnOnce(i64, i64) -> bool) -> Result<(), RuntimeFault> {
        self.binary(at, |l, r| Ok(if f(l, r) { 1 } else { 0 }))
    }

    /// Resolve a LOD/STO data address through the static-link chain.
    fn data_addr(&self, level: u16, offset: i32, at: usize) -> Result<usize, RuntimeFault> {
        let base = self.base_from(level, at)?;
        let addr = base as i64 + offset as i64;
        if addr < 0 || addr as usize >= self.stack().len() {
            return Err(RuntimeFault::StackFault { at, addr });
        }
        Ok(addr as usize)
    }

    /// Validate a JMP/JPC/CAL target. `len(code)` itself is a legal
    /// target: jumping there halts the machine.
    fn branch_target(&self, arg: i32, at: usize) -> Result<usize, RuntimeFault> {
        if arg < 0 || arg as usize > self.code().len() {
            return Err(RuntimeFault::InvalidAddress {
                at,
                target: arg as i64,
            });
        }
        Ok(arg as usize)
    }
}
