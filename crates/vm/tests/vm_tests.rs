//! Integration tests for the P-code machine.

use pcode_common::{Instruction, Opr, Program};
use pcode_vm::{run, Machine, RuntimeFault, State};
use proptest::prelude::*;

fn top(machine: &Machine) -> i64 {
    machine.stack()[machine.t()]
}

#[test]
fn empty_program_halts_immediately() {
    let program = Program::new(vec![]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(machine.p(), 0);
}

#[test]
fn literal_addition() {
    let program = Program::new(vec![
        Instruction::lit(2),
        Instruction::lit(3),
        Instruction::opr(Opr::Add),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(top(&machine), 5);
    assert_eq!(machine.t(), 4);
}

#[test]
fn arithmetic_operators() {
    let cases = [
        (Opr::Add, 7, 3, 10),
        (Opr::Sub, 7, 3, 4),
        (Opr::Mul, 7, 3, 21),
        (Opr::Div, 7, 3, 2),
        (Opr::Mod, 7, 3, 1),
        (Opr::Div, -7, 2, -3), // truncates toward zero
    ];
    for (op, left, right, expected) in cases {
        let program = Program::new(vec![
            Instruction::lit(left),
            Instruction::lit(right),
            Instruction::opr(op),
        ]);
        let machine = run(&program).unwrap();
        assert_eq!(top(&machine), expected, "{left} {op:?} {right}");
    }
}

#[test]
fn unary_operators() {
    let program = Program::new(vec![Instruction::lit(9), Instruction::opr(Opr::Neg)]);
    assert_eq!(top(&run(&program).unwrap()), -9);

    let program = Program::new(vec![Instruction::lit(9), Instruction::opr(Opr::Odd)]);
    assert_eq!(top(&run(&program).unwrap()), 1);

    let program = Program::new(vec![Instruction::lit(8), Instruction::opr(Opr::Odd)]);
    assert_eq!(top(&run(&program).unwrap()), 0);
}

#[test]
fn comparisons_push_one_or_zero() {
    let cases = [
        (Opr::Eq, 4, 4, 1),
        (Opr::Eq, 4, 5, 0),
        (Opr::Ne, 4, 5, 1),
        (Opr::Lt, 4, 5, 1),
        (Opr::Lt, 5, 4, 0),
        (Opr::Ge, 5, 5, 1),
        (Opr::Gt, 5, 4, 1),
        (Opr::Le, 4, 4, 1),
        (Opr::Le, 5, 4, 0),
    ];
    for (op, left, right, expected) in cases {
        let program = Program::new(vec![
            Instruction::lit(left),
            Instruction::lit(right),
            Instruction::opr(op),
        ]);
        assert_eq!(top(&run(&program).unwrap()), expected);
    }
}

#[test]
fn logical_operators_are_truthiness() {
    let cases = [
        (Opr::And, 3, 2, 1),
        (Opr::And, 3, 0, 0),
        (Opr::Or, 0, 0, 0),
        (Opr::Or, 0, -1, 1),
    ];
    for (op, left, right, expected) in cases {
        let program = Program::new(vec![
            Instruction::lit(left),
            Instruction::lit(right),
            Instruction::opr(op),
        ]);
        assert_eq!(top(&run(&program).unwrap()), expected);
    }
}

#[test]
fn division_by_zero_faults() {
    let program = Program::new(vec![
        Instruction::lit(1),
        Instruction::lit(0),
        Instruction::opr(Opr::Div),
        Instruction::lit(42), // must never execute
    ]);
    let mut machine = Machine::new(&program);
    let err = machine.execute().unwrap_err();
    assert_eq!(err, RuntimeFault::DivisionByZero { at: 2 });
    assert_eq!(machine.state(), State::Faulted);
    // Stepping a faulted machine is a no-op.
    assert_eq!(machine.step(), Ok(State::Faulted));
    assert_eq!(machine.p(), 3);
}

#[test]
fn modulo_by_zero_faults() {
    let program = Program::new(vec![
        Instruction::lit(1),
        Instruction::lit(0),
        Instruction::opr(Opr::Mod),
    ]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::DivisionByZero { at: 2 }
    );
}

#[test]
fn unknown_opr_code_faults() {
    let program = Program::new(vec![
        Instruction::lit(1),
        Instruction::new(pcode_common::Opcode::Opr, 0, 99),
    ]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::InvalidOpcode { at: 1, code: 99 }
    );
}

#[test]
fn jmp_transfers_control() {
    let program = Program::new(vec![
        Instruction::jmp(2),
        Instruction::lit(1), // skipped
        Instruction::lit(7),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(top(&machine), 7);
}

#[test]
fn jmp_to_end_of_code_halts() {
    let program = Program::new(vec![Instruction::jmp(1)]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(machine.p(), 1);
}

#[test]
fn jmp_out_of_range_faults() {
    let program = Program::new(vec![Instruction::jmp(2)]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::InvalidAddress { at: 0, target: 2 }
    );
}

#[test]
fn jpc_consumes_condition_on_both_branches() {
    // Condition false: jump taken.
    let program = Program::new(vec![
        Instruction::lit(0),
        Instruction::jpc(3),
        Instruction::lit(111), // skipped
        Instruction::lit(7),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(top(&machine), 7);
    assert_eq!(machine.t(), 4); // condition popped, one literal pushed

    // Condition true: fall through, still popped.
    let program = Program::new(vec![
        Instruction::lit(1),
        Instruction::jpc(3),
        Instruction::lit(7),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(top(&machine), 7);
    assert_eq!(machine.t(), 4);
}

#[test]
fn jpc_validates_target_even_when_not_taken() {
    let program = Program::new(vec![Instruction::lit(1), Instruction::jpc(50)]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::InvalidAddress { at: 1, target: 50 }
    );
}

#[test]
fn int_allocates_and_releases() {
    let program = Program::new(vec![
        Instruction::int(3),
        Instruction::int(-3),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.t(), 3);
}

#[test]
fn int_underflow_faults() {
    let program = Program::new(vec![Instruction::int(-10)]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::StackFault { at: 0, addr: -7 }
    );
}

#[test]
fn lod_sto_move_values_through_frame_slots() {
    let program = Program::new(vec![
        Instruction::int(2),    // locals at offsets 3 and 4
        Instruction::lit(40),
        Instruction::sto(0, 3),
        Instruction::lod(0, 3),
        Instruction::lit(2),
        Instruction::opr(Opr::Add),
        Instruction::sto(0, 4),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.local(3), Some(40));
    assert_eq!(machine.local(4), Some(42));
}

#[test]
fn cal_builds_frame_and_return_restores_it() {
    let program = Program::new(vec![
        Instruction::cal(0, 2),
        Instruction::jmp(4),
        Instruction::lit(99),
        Instruction::opr(Opr::Return),
    ]);
    let mut machine = Machine::new(&program);

    let pre_t = machine.t();
    let pre_b = machine.b();
    machine.step().unwrap(); // CAL
    assert_eq!(machine.b(), pre_t + 1);
    assert_eq!(machine.t(), pre_t + 3);
    assert_eq!(machine.p(), 2);
    assert_eq!(machine.stack()[machine.b()], pre_b as i64); // static link
    assert_eq!(machine.stack()[machine.b() + 1], pre_b as i64); // dynamic link
    assert_eq!(machine.stack()[machine.b() + 2], 1); // return address

    machine.step().unwrap(); // LIT 99
    machine.step().unwrap(); // OPR 0 0
    assert_eq!(machine.b(), pre_b);
    assert_eq!(machine.p(), 1);
    // Return value occupies one new slot above the caller's stack.
    assert_eq!(machine.t(), pre_t + 1);
    assert_eq!(top(&machine), 99);
}

#[test]
fn cal_out_of_range_faults() {
    let program = Program::new(vec![Instruction::cal(0, 9)]);
    assert_eq!(
        run(&program).unwrap_err(),
        RuntimeFault::InvalidAddress { at: 0, target: 9 }
    );
}

#[test]
fn runaway_recursion_faults_instead_of_growing() {
    let program = Program::new(vec![Instruction::cal(0, 0)]);
    let mut machine = Machine::with_capacity(&program, 64);
    let err = machine.execute().unwrap_err();
    assert!(matches!(err, RuntimeFault::StackFault { .. }));
}

#[test]
fn stack_overflow_from_pushes_faults() {
    let code: Vec<Instruction> = (0..64).map(Instruction::lit).collect();
    let program = Program::new(code);
    let mut machine = Machine::with_capacity(&program, 16);
    let err = machine.execute().unwrap_err();
    assert_eq!(err, RuntimeFault::StackFault { at: 12, addr: 16 });
}

#[test]
fn iterative_factorial() {
    // n at offset 3, f at offset 4: f = n!, counting n down to 0.
    let program = Program::new(vec![
        Instruction::int(2),
        Instruction::lit(5),
        Instruction::sto(0, 3),
        Instruction::lit(1),
        Instruction::sto(0, 4),
        // loop head
        Instruction::lod(0, 3),
        Instruction::lit(0),
        Instruction::opr(Opr::Gt),
        Instruction::jpc(18),
        Instruction::lod(0, 4),
        Instruction::lod(0, 3),
        Instruction::opr(Opr::Mul),
        Instruction::sto(0, 4),
        Instruction::lod(0, 3),
        Instruction::lit(1),
        Instruction::opr(Opr::Sub),
        Instruction::sto(0, 3),
        Instruction::jmp(5),
        Instruction::opr(Opr::Return),
    ]);
    let machine = run(&program).unwrap();
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(machine.local(3), Some(0)); // n counted down
    assert_eq!(machine.local(4), Some(120)); // 5!
}

// main: n at offset 3, result at offset 4. fact reads its argument
// from the caller's frame through the static link (LOD 1 3).
fn recursive_factorial_program() -> Program {
    Program::new(vec![
        // main (0..6)
        Instruction::int(2),
        Instruction::lit(5),
        Instruction::sto(0, 3),
        Instruction::cal(0, 6),
        Instruction::sto(0, 4),
        Instruction::opr(Opr::Return),
        // fact (6..25): local n at offset 3, saved n at offset 4
        Instruction::int(2),
        Instruction::lod(1, 3),
        Instruction::sto(0, 3),
        Instruction::lod(0, 3),
        Instruction::lit(1),
        Instruction::opr(Opr::Le),
        Instruction::jpc(15),
        Instruction::lit(1),
        Instruction::opr(Opr::Return),
        Instruction::lod(0, 3),
        Instruction::sto(0, 4),
        Instruction::lod(0, 3),
        Instruction::lit(1),
        Instruction::opr(Opr::Sub),
        Instruction::sto(0, 3),
        Instruction::cal(0, 6),
        Instruction::lod(0, 4),
        Instruction::opr(Opr::Mul),
        Instruction::opr(Opr::Return),
    ])
}

#[test]
fn recursive_factorial() {
    let program = recursive_factorial_program();
    let machine = run(&program).unwrap();
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(machine.local(4), Some(120));
    // The top-level return also leaves the value just above the entry base.
    assert_eq!(machine.stack()[1], 120);
}

#[test]
fn deep_recursion_restores_registers() {
    // Five nested activations of fact; after the outermost one
    // returns, the caller's registers must be exactly as they were
    // before the call, plus one stack slot for the return value.
    let program = recursive_factorial_program();
    let mut machine = Machine::new(&program);

    // Run main up to its CAL at index 3.
    while machine.p() != 3 {
        machine.step().unwrap();
    }
    let pre_b = machine.b();
    let pre_t = machine.t();
    machine.step().unwrap(); // enter fact
    assert_eq!(machine.b(), pre_t + 1);

    // Step until control is back in main's frame.
    while machine.b() != pre_b {
        machine.step().unwrap();
    }
    assert_eq!(machine.p(), 4); // resumed right after the CAL
    assert_eq!(machine.t(), pre_t + 1); // return value on top
    assert_eq!(machine.stack()[machine.t()], 120);
}

/// Instruction sequence and expected value for a random expression tree
/// built from literals, `+`, `-`, and `*`.
fn arb_expr() -> impl Strategy<Value = (Vec<Instruction>, i64)> {
    let leaf = any::<i32>().prop_map(|n| (vec![Instruction::lit(n)], n as i64));
    leaf.prop_recursive(4, 32, 2, |inner| {
        (
            inner.clone(),
            inner,
            prop::sample::select(vec![Opr::Add, Opr::Sub, Opr::Mul]),
        )
            .prop_map(|((mut lc, lv), (rc, rv), op)| {
                lc.extend(rc);
                lc.push(Instruction::opr(op));
                let value = match op {
                    Opr::Add => lv.wrapping_add(rv),
                    Opr::Sub => lv.wrapping_sub(rv),
                    Opr::Mul => lv.wrapping_mul(rv),
                    _ => unreachable!(),
                };
                (lc, value)
            })
    })
}

proptest! {
    /// Evaluating a postorder-flattened expression tree leaves exactly
    /// its value on the stack.
    #[test]
    fn expression_trees_evaluate_correctly((code, expected) in arb_expr()) {
        let program = Program::new(code);
        let machine = run(&program).unwrap();
        prop_assert_eq!(machine.state(), State::Halted);
        prop_assert_eq!(machine.t(), 4);
        prop_assert_eq!(machine.stack()[4], expected);
    }
}
