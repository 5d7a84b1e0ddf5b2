//! End-to-end language semantics, driven through the public API.

use flux_eval::{buffer_handler, final_result_line, EvalError, EvalErrorKind, Interpreter, Value};
use flux_ir::{AstBuilder, BinaryOp, Block, Node, SharedInterner, UnaryOp};

struct Run {
    result: Result<Value, EvalError>,
    output: Vec<String>,
}

fn run_with(max_call_depth: Option<usize>, build: impl FnOnce(&AstBuilder<'_>) -> Vec<Node>) -> Run {
    let interner = SharedInterner::new();
    let program = Block::new(build(&AstBuilder::new(&interner)));
    let mut interp = Interpreter::builder()
        .interner(interner.clone())
        .print_handler(buffer_handler())
        .max_call_depth(max_call_depth)
        .build();
    let result = interp.run(&program);
    Run {
        result,
        output: interp.print_handler().lines(),
    }
}

fn run(build: impl FnOnce(&AstBuilder<'_>) -> Vec<Node>) -> Run {
    run_with(Some(flux_eval::DEFAULT_MAX_CALL_DEPTH), build)
}

fn value(build: impl FnOnce(&AstBuilder<'_>) -> Vec<Node>) -> Value {
    run(build).result.unwrap()
}

fn error(build: impl FnOnce(&AstBuilder<'_>) -> Vec<Node>) -> EvalError {
    run(build).result.unwrap_err()
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn division_and_remainder_by_zero() {
        for zero in [Node::Integer(0), Node::Float(0.0)] {
            let err = error(|b| vec![b.binary(BinaryOp::Div, b.int(10), zero.clone())]);
            assert_eq!(err.kind, EvalErrorKind::DivisionByZero);

            let err = error(|b| vec![b.binary(BinaryOp::Mod, b.float(2.5), zero.clone())]);
            assert_eq!(err.kind, EvalErrorKind::RemainderByZero);
        }
    }

    #[test]
    fn division_error_points_at_the_operator() {
        let err = error(|b| {
            vec![b
                .line(4)
                .binary(BinaryOp::Div, b.int(1), b.int(0))]
        });
        assert_eq!(err.to_string(), "[line 4] Error at '/': Division by zero");
    }

    #[test]
    fn nonzero_divisors_follow_standard_arithmetic() {
        assert_eq!(
            value(|b| vec![b.binary(BinaryOp::Div, b.int(9), b.int(2))]),
            Value::Float(4.5)
        );
        assert_eq!(
            value(|b| vec![b.binary(BinaryOp::Mod, b.int(9), b.int(4))]),
            Value::Int(1)
        );
    }

    #[test]
    fn unary_minus_needs_a_number() {
        let err = error(|b| vec![b.unary(UnaryOp::Neg, b.string("x"))]);
        assert_eq!(err.to_string(), "[line 1] Error at '-': Operand must be a number");
    }

    #[test]
    fn comparisons_need_numbers() {
        let err = error(|b| vec![b.binary(BinaryOp::Lt, b.string("a"), b.int(1))]);
        assert_eq!(err.message(), "Operands must be numbers");
    }
}

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concatenation_in_both_orders() {
        assert_eq!(
            value(|b| vec![b.add(b.string("x="), b.int(5))]),
            Value::string("x=5")
        );
        assert_eq!(value(|b| vec![b.add(b.int(5), b.string("!"))]), Value::string("5!"));
    }

    #[test]
    fn concatenation_is_left_associative() {
        // "a" + 1 + 2 == "a12"
        assert_eq!(
            value(|b| vec![b.add(b.add(b.string("a"), b.int(1)), b.int(2))]),
            Value::string("a12")
        );
        // 1 + 2 + "a" == "3a"
        assert_eq!(
            value(|b| vec![b.add(b.add(b.int(1), b.int(2)), b.string("a"))]),
            Value::string("3a")
        );
    }

    #[test]
    fn functions_concatenate_by_description() {
        let result = value(|b| {
            vec![
                b.func("greet", &["name"], vec![]),
                b.add(b.string("fn: "), b.var("greet")),
            ]
        });
        assert_eq!(result, Value::string("fn: <function greet(name)>"));
    }

    #[test]
    fn nil_does_not_concatenate() {
        let err = error(|b| vec![b.add(b.string("x"), b.nil())]);
        assert_eq!(
            err.message(),
            "Operands must be two numbers, two strings, or a string and another type for '+'"
        );
    }
}

mod truthiness {
    use super::*;
    use pretty_assertions::assert_eq;

    fn branch_taken(b: &AstBuilder<'_>, condition: Node) -> Vec<Node> {
        vec![b.if_(condition, vec![b.string("yes")], Some(b.scope(vec![b.string("no")])))]
    }

    #[test]
    fn falsy_conditions() {
        let falsy: [fn(&AstBuilder<'_>) -> Node; 5] = [
            |b| b.int(0),
            |b| b.float(0.0),
            |b| b.string(""),
            |b| b.nil(),
            |b| b.boolean(false),
        ];
        for make in falsy {
            assert_eq!(value(|b| branch_taken(b, make(b))), Value::string("no"));
        }
    }

    #[test]
    fn truthy_conditions() {
        let truthy: [fn(&AstBuilder<'_>) -> Node; 6] = [
            |b| b.array(vec![]),
            |b| b.dict(vec![]),
            |b| b.int(-3),
            |b| b.float(0.25),
            |b| b.string("0"),
            |b| b.lambda(&[], vec![]),
        ];
        for make in truthy {
            assert_eq!(value(|b| branch_taken(b, make(b))), Value::string("yes"));
        }
    }

    #[test]
    fn if_without_else_yields_nil() {
        assert_eq!(
            value(|b| vec![b.if_(b.boolean(false), vec![b.int(1)], None)]),
            Value::Nil
        );
    }

    #[test]
    fn logical_operators_evaluate_both_sides() {
        // let hits = 0
        // func bump() { hits = hits + 1  return true }
        // false and bump()
        // true or bump()
        // hits
        let result = value(|b| {
            vec![
                b.let_("hits", b.int(0)),
                b.func(
                    "bump",
                    &[],
                    vec![
                        b.assign("hits", b.add(b.var("hits"), b.int(1))),
                        b.ret(b.boolean(true)),
                    ],
                ),
                b.binary(BinaryOp::And, b.boolean(false), b.call("bump", vec![])),
                b.binary(BinaryOp::Or, b.boolean(true), b.call("bump", vec![])),
                b.var("hits"),
            ]
        });
        assert_eq!(result, Value::Int(2));
    }
}

mod scoping {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shadowing_in_a_block_leaves_the_outer_binding() {
        let run = run(|b| {
            vec![
                b.let_("x", b.int(1)),
                b.scope(vec![b.let_("x", b.int(2)), b.print(b.var("x"))]),
                b.print(b.var("x")),
            ]
        });
        assert_eq!(run.output, vec!["2", "1"]);
    }

    #[test]
    fn block_declarations_do_not_leak() {
        let err = error(|b| vec![b.scope(vec![b.let_("inner", b.int(1))]), b.var("inner")]);
        assert_eq!(err.message(), "Undefined variable 'inner'");
    }

    #[test]
    fn reassignment_reaches_the_enclosing_binding() {
        let result = value(|b| {
            vec![
                b.let_("count", b.int(0)),
                b.scope(vec![b.scope(vec![b.assign("count", b.int(5))])]),
                b.var("count"),
            ]
        });
        assert_eq!(result, Value::Int(5));
    }

    #[test]
    fn reassigning_an_undefined_name_fails() {
        let err = error(|b| vec![b.line(3).assign("ghost", b.int(1))]);
        assert_eq!(
            err.to_string(),
            "[line 3] Error at 'ghost': Cannot reassign undefined variable 'ghost'"
        );
    }

    #[test]
    fn functions_see_their_defining_scope_not_the_callers() {
        // let x = "global"
        // func show() { return x }
        // func caller() { let x = "local"  return show() }
        // caller()
        let result = value(|b| {
            vec![
                b.let_("x", b.string("global")),
                b.func("show", &[], vec![b.ret(b.var("x"))]),
                b.func(
                    "caller",
                    &[],
                    vec![b.let_("x", b.string("local")), b.ret(b.call("show", vec![]))],
                ),
                b.call("caller", vec![]),
            ]
        });
        assert_eq!(result, Value::string("global"));
    }
}

mod functions {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `func sum(n, acc) { if n == 0 { return acc } return sum(n - 1, acc + n) }`
    fn tail_sum(b: &AstBuilder<'_>) -> Node {
        b.func(
            "sum",
            &["n", "acc"],
            vec![
                b.if_(
                    b.binary(BinaryOp::Eq, b.var("n"), b.int(0)),
                    vec![b.ret(b.var("acc"))],
                    None,
                ),
                b.ret(b.call(
                    "sum",
                    vec![b.sub(b.var("n"), b.int(1)), b.add(b.var("acc"), b.var("n"))],
                )),
            ],
        )
    }

    /// `func naive(n) { if n == 0 { return 0 } return n + naive(n - 1) }`
    fn naive_sum(b: &AstBuilder<'_>) -> Node {
        b.func(
            "naive",
            &["n"],
            vec![
                b.if_(
                    b.binary(BinaryOp::Eq, b.var("n"), b.int(0)),
                    vec![b.ret(b.int(0))],
                    None,
                ),
                b.ret(b.add(b.var("n"), b.call("naive", vec![b.sub(b.var("n"), b.int(1))]))),
            ],
        )
    }

    #[test]
    fn deep_self_tail_recursion_completes() {
        let result = value(|b| vec![tail_sum(b), b.call("sum", vec![b.int(100_000), b.int(0)])]);
        assert_eq!(result, Value::Int(5_000_050_000));
    }

    #[test]
    fn tail_recursion_matches_naive_recursion() {
        for n in [0, 1, 2, 10, 250] {
            let results = value(|b| {
                vec![
                    tail_sum(b),
                    naive_sum(b),
                    b.array(vec![
                        b.call("sum", vec![b.int(n), b.int(0)]),
                        b.call("naive", vec![b.int(n)]),
                    ]),
                ]
            });
            let Value::Array(pair) = results else {
                panic!("expected an array");
            };
            let pair = pair.borrow();
            assert_eq!(pair[0], pair[1], "n = {n}");
        }
    }

    #[test]
    fn deep_naive_recursion_reports_the_limit() {
        let err = error(|b| vec![naive_sum(b), b.call("naive", vec![b.int(100_000)])]);
        assert_eq!(
            err.message(),
            format!(
                "Maximum recursion depth exceeded (limit: {})",
                flux_eval::DEFAULT_MAX_CALL_DEPTH
            )
        );
    }

    #[test]
    fn unlimited_depth_relies_on_stack_growth() {
        let run = run_with(None, |b| vec![naive_sum(b), b.call("naive", vec![b.int(5_000)])]);
        assert_eq!(run.result, Ok(Value::Int(12_502_500)));
    }

    #[test]
    fn arity_mismatch() {
        let err = error(|b| {
            vec![
                b.func("pair", &["a", "b"], vec![]),
                b.line(2).call("pair", vec![b.int(1)]),
            ]
        });
        assert_eq!(err.to_string(), "[line 2] Error at 'pair': Expected 2 arguments, got 1");
    }

    #[test]
    fn calling_a_non_function() {
        let err = error(|b| vec![b.let_("n", b.int(3)), b.call("n", vec![])]);
        assert_eq!(err.message(), "Can only call functions, got: int");
    }

    #[test]
    fn function_without_return_yields_its_last_value() {
        let result = value(|b| {
            vec![
                b.func("double", &["x"], vec![b.mul(b.var("x"), b.int(2))]),
                b.call("double", vec![b.int(21)]),
            ]
        });
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn closures_observe_later_mutation() {
        // let n = 1
        // let get = lambda() { return n }
        // n = 2
        // get()
        let result = value(|b| {
            vec![
                b.let_("n", b.int(1)),
                b.let_("get", b.lambda(&[], vec![b.ret(b.var("n"))])),
                b.assign("n", b.int(2)),
                b.call("get", vec![]),
            ]
        });
        assert_eq!(result, Value::Int(2));
    }

    #[test]
    fn counter_closure_keeps_private_state() {
        // func make_counter() {
        //   let c = 0
        //   return lambda() { c = c + 1  return c }
        // }
        // let tick = make_counter()
        // tick()  tick()  tick()
        let result = value(|b| {
            vec![
                b.func(
                    "make_counter",
                    &[],
                    vec![
                        b.let_("c", b.int(0)),
                        b.ret(b.lambda(
                            &[],
                            vec![
                                b.assign("c", b.add(b.var("c"), b.int(1))),
                                b.ret(b.var("c")),
                            ],
                        )),
                    ],
                ),
                b.let_("tick", b.call("make_counter", vec![])),
                b.call("tick", vec![]),
                b.call("tick", vec![]),
                b.call("tick", vec![]),
            ]
        });
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn loop_iterations_capture_their_own_bindings() {
        // let fs = [nil, nil, nil]
        // for i = 0 to 2 { let j = i  fs[i] = lambda() { return j } }
        // [fs[0](), fs[1](), fs[2]()]
        let result = value(|b| {
            vec![
                b.let_("fs", b.array(vec![b.nil(), b.nil(), b.nil()])),
                b.for_(
                    "i",
                    b.int(0),
                    b.int(2),
                    None,
                    vec![
                        b.let_("j", b.var("i")),
                        b.index_assign("fs", b.var("i"), b.lambda(&[], vec![b.ret(b.var("j"))])),
                    ],
                ),
                b.array(vec![
                    b.call_expr(b.index("fs", b.int(0)), vec![]),
                    b.call_expr(b.index("fs", b.int(1)), vec![]),
                    b.call_expr(b.index("fs", b.int(2)), vec![]),
                ]),
            ]
        });
        assert_eq!(
            result,
            Value::array(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn mutual_recursion_works_as_ordinary_calls() {
        // func is_even(n) { if n == 0 { return true } return is_odd(n - 1) }
        // func is_odd(n)  { if n == 0 { return false } return is_even(n - 1) }
        let parity = |b: &AstBuilder<'_>, name: &str, other: &str, base: bool| {
            b.func(
                name,
                &["n"],
                vec![
                    b.if_(
                        b.binary(BinaryOp::Eq, b.var("n"), b.int(0)),
                        vec![b.ret(b.boolean(base))],
                        None,
                    ),
                    b.ret(b.call(other, vec![b.sub(b.var("n"), b.int(1))])),
                ],
            )
        };
        let result = value(|b| {
            vec![
                parity(b, "is_even", "is_odd", true),
                parity(b, "is_odd", "is_even", false),
                b.call("is_even", vec![b.int(101)]),
            ]
        });
        assert_eq!(result, Value::Bool(false));
    }
}

mod arrays {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_array(b: &AstBuilder<'_>, rest: Vec<Node>) -> Vec<Node> {
        let mut program = vec![b.let_("a", b.array(vec![b.int(10), b.int(20), b.int(30)]))];
        program.extend(rest);
        program
    }

    #[test]
    fn in_bounds_write_is_visible_to_reads() {
        let result = value(|b| {
            with_array(
                b,
                vec![b.index_assign("a", b.int(1), b.int(99)), b.index("a", b.int(1))],
            )
        });
        assert_eq!(result, Value::Int(99));
    }

    #[test]
    fn arrays_stored_in_themselves_print_and_compare() {
        // let a = [1]  a[0] = a  let c = [1]  c[0] = c  print a  print a == c
        let run = run(|b| {
            vec![
                b.let_("a", b.array(vec![b.int(1)])),
                b.index_assign("a", b.int(0), b.var("a")),
                b.let_("c", b.array(vec![b.int(1)])),
                b.index_assign("c", b.int(0), b.var("c")),
                b.print(b.var("a")),
                b.print(b.binary(BinaryOp::Eq, b.var("a"), b.var("c"))),
            ]
        });
        assert!(run.result.is_ok());
        assert_eq!(run.output, vec!["[[...]]", "True"]);
    }

    #[test]
    fn out_of_bounds_reads_and_writes_fail() {
        for index in [-1, 3] {
            let err = error(|b| with_array(b, vec![b.index("a", b.int(index))]));
            assert_eq!(err.kind, EvalErrorKind::IndexOutOfBounds { index });

            let err = error(|b| with_array(b, vec![b.index_assign("a", b.int(index), b.int(0))]));
            assert_eq!(err.message(), format!("Array index {index} out of bounds"));
        }
    }

    #[test]
    fn index_must_be_an_integer() {
        let err = error(|b| with_array(b, vec![b.index("a", b.float(1.0))]));
        assert_eq!(err.message(), "Array index must be an integer, got float");
    }

    #[test]
    fn indexing_a_non_array_fails() {
        let err = error(|b| vec![b.let_("s", b.string("abc")), b.index("s", b.int(0))]);
        assert_eq!(err.message(), "Cannot index non-array type: string");

        let err = error(|b| {
            vec![
                b.let_("d", b.dict(vec![])),
                b.index_assign("d", b.int(0), b.int(1)),
            ]
        });
        assert_eq!(err.message(), "Cannot assign to non-array type: dict");
    }

    #[test]
    fn aliases_share_the_array() {
        let result = value(|b| {
            with_array(
                b,
                vec![
                    b.let_("alias", b.var("a")),
                    b.index_assign("alias", b.int(0), b.int(-1)),
                    b.index("a", b.int(0)),
                ],
            )
        });
        assert_eq!(result, Value::Int(-1));
    }

    #[test]
    fn literals_print_in_canonical_form() {
        let run = run(|b| {
            vec![
                b.print(b.array(vec![b.int(1), b.string("two"), b.float(3.0), b.boolean(true)])),
                b.print(b.dict(vec![(b.string("k"), b.nil())])),
            ]
        });
        assert_eq!(run.output, vec!["[1, 'two', 3, True]", "{'k': nil}"]);
    }

    #[test]
    fn array_dict_keys_are_rejected() {
        let err = error(|b| vec![b.dict(vec![(b.array(vec![]), b.int(1))])]);
        assert_eq!(err.message(), "Unhashable dict key: array");
    }
}

mod control_flow {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digits_match(b: &AstBuilder<'_>, scrutinee: i64) -> Vec<Node> {
        vec![b.match_(
            b.int(scrutinee),
            vec![(b.int(1), b.string("a")), (b.int(2), b.string("b"))],
        )]
    }

    #[test]
    fn match_takes_the_first_equal_case() {
        assert_eq!(value(|b| digits_match(b, 2)), Value::string("b"));
    }

    #[test]
    fn match_without_a_matching_case_fails() {
        let err = error(|b| digits_match(b, 3));
        assert_eq!(err.to_string(), "[line 1] Error at 'match': No matching case found");
    }

    #[test]
    fn match_evaluates_only_the_chosen_body() {
        let run = run(|b| {
            vec![b.match_(
                b.string("x"),
                vec![
                    (b.string("x"), b.print(b.string("chosen"))),
                    (b.string("x"), b.print(b.string("second"))),
                ],
            )]
        });
        assert_eq!(run.output, vec!["chosen"]);
    }

    #[test]
    fn for_with_positive_step() {
        let run = run(|b| {
            vec![b.for_("i", b.int(0), b.int(5), Some(b.int(2)), vec![b.print(b.var("i"))])]
        });
        assert_eq!(run.output, vec!["0", "2", "4"]);
    }

    #[test]
    fn for_with_negative_step() {
        let run = run(|b| {
            vec![b.for_("i", b.int(5), b.int(0), Some(b.int(-1)), vec![b.print(b.var("i"))])]
        });
        assert_eq!(run.output, vec!["5", "4", "3", "2", "1", "0"]);
    }

    #[test]
    fn for_defaults_to_step_one_and_yields_last_body_value() {
        let result = value(|b| {
            vec![b.for_("i", b.int(1), b.int(3), None, vec![b.mul(b.var("i"), b.int(10))])]
        });
        assert_eq!(result, Value::Int(30));
    }

    #[test]
    fn for_rejects_bad_bounds() {
        let err = error(|b| vec![b.for_("i", b.string("a"), b.int(3), None, vec![])]);
        assert_eq!(err.message(), "Start value must be a number");

        let err = error(|b| vec![b.for_("i", b.int(0), b.nil(), None, vec![])]);
        assert_eq!(err.message(), "End value must be a number");

        let err = error(|b| vec![b.for_("i", b.int(0), b.int(3), Some(b.boolean(true)), vec![])]);
        assert_eq!(err.message(), "Step value must be a number");

        let err = error(|b| vec![b.for_("i", b.int(0), b.int(3), Some(b.float(0.0)), vec![])]);
        assert_eq!(err.message(), "Step cannot be zero");
    }

    #[test]
    fn for_ends_cleanly_at_the_integer_limits() {
        let run = run(|b| {
            vec![b.for_("i", b.int(i64::MAX - 1), b.int(i64::MAX), None, vec![b.print(b.var("i"))])]
        });
        assert_eq!(run.result, Ok(Value::Int(i64::MAX)));
        assert_eq!(run.output, vec![(i64::MAX - 1).to_string(), i64::MAX.to_string()]);

        let run = super::run(|b| {
            vec![b.for_(
                "i",
                b.int(i64::MIN + 1),
                b.int(i64::MIN),
                Some(b.int(-1)),
                vec![b.print(b.var("i"))],
            )]
        });
        assert!(run.result.is_ok());
        assert_eq!(run.output, vec![(i64::MIN + 1).to_string(), i64::MIN.to_string()]);
    }

    #[test]
    fn for_counter_is_not_visible_after_the_loop() {
        let err = error(|b| vec![b.for_("i", b.int(0), b.int(1), None, vec![]), b.var("i")]);
        assert_eq!(err.kind, EvalErrorKind::UndefinedVariable { name: "i".into() });
    }

    #[test]
    fn while_runs_until_the_condition_is_falsy() {
        let result = value(|b| {
            vec![
                b.let_("n", b.int(0)),
                b.while_(
                    b.binary(BinaryOp::Lt, b.var("n"), b.int(4)),
                    vec![b.assign("n", b.add(b.var("n"), b.int(1)))],
                ),
            ]
        });
        assert_eq!(result, Value::Int(4));
    }

    #[test]
    fn while_that_never_runs_yields_nil() {
        assert_eq!(value(|b| vec![b.while_(b.boolean(false), vec![b.int(1)])]), Value::Nil);
    }

    #[test]
    fn repeat_until_runs_the_body_at_least_once() {
        let run = run(|b| {
            vec![b.repeat_until(vec![b.print(b.string("once"))], b.boolean(true))]
        });
        assert_eq!(run.output, vec!["once"]);
    }

    #[test]
    fn repeat_until_loops_while_the_condition_is_false() {
        let result = value(|b| {
            vec![
                b.let_("n", b.int(0)),
                b.repeat_until(
                    vec![b.assign("n", b.add(b.var("n"), b.int(1)))],
                    b.binary(BinaryOp::GtEq, b.var("n"), b.int(3)),
                ),
                b.var("n"),
            ]
        });
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn conditional_expression_picks_one_branch() {
        let run = run(|b| {
            vec![b.conditional(
                b.int(0),
                b.print(b.string("then")),
                b.print(b.string("else")),
            )]
        });
        assert_eq!(run.output, vec!["else"]);
    }
}

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn len_of_collections() {
        assert_eq!(value(|b| vec![b.call("len", vec![b.string("abc")])]), Value::Int(3));
        assert_eq!(
            value(|b| vec![b.call("len", vec![b.array(vec![b.int(1), b.int(2), b.int(3)])])]),
            Value::Int(3)
        );
        assert_eq!(value(|b| vec![b.call("len", vec![b.dict(vec![])])]), Value::Int(0));
    }

    #[test]
    fn len_of_nil_fails() {
        let err = error(|b| vec![b.call("len", vec![b.nil()])]);
        assert_eq!(err.to_string(), "[line 1] Error at 'len': 'len' cannot be applied to 'nil'");
    }

    #[test]
    fn builtins_print_their_name() {
        let run = run(|b| vec![b.print(b.var("len"))]);
        assert_eq!(run.output, vec!["<built-in function len>"]);
    }

    #[test]
    fn builtins_can_be_shadowed() {
        let result = value(|b| {
            vec![
                b.func("len", &["x"], vec![b.int(-1)]),
                b.call("len", vec![b.string("abc")]),
            ]
        });
        assert_eq!(result, Value::Int(-1));
    }
}

mod output {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn print_uses_canonical_stringification() {
        let run = run(|b| {
            vec![
                b.print(b.nil()),
                b.print(b.float(2.0)),
                b.print(b.float(2.5)),
                b.print(b.boolean(false)),
                b.print(b.lambda(&["a", "b"], vec![])),
            ]
        });
        assert_eq!(
            run.output,
            vec!["nil", "2", "2.5", "False", "<anonymous function(a, b)>"]
        );
    }

    #[test]
    fn print_small_and_non_finite_floats() {
        let run = run(|b| {
            vec![
                b.print(b.float(1.5e-7)),
                b.print(b.float(0.001)),
                b.print(b.float(f64::NAN)),
                b.print(b.unary(UnaryOp::Neg, b.float(f64::INFINITY))),
            ]
        });
        assert_eq!(run.output, vec!["1.5e-07", "0.001", "nan", "-inf"]);
    }

    #[test]
    fn print_yields_the_printed_value() {
        assert_eq!(value(|b| vec![b.print(b.int(7))]), Value::Int(7));
    }

    #[test]
    fn final_result_line_for_program_values() {
        let result = value(|b| vec![b.binary(BinaryOp::Div, b.int(6), b.int(2))]);
        assert_eq!(final_result_line(&result).as_deref(), Some("Final result: 3"));

        let result = value(|b| vec![b.print(b.nil())]);
        assert_eq!(final_result_line(&result), None);
    }

    #[test]
    fn interpret_prints_errors_and_keeps_earlier_output() {
        let interner = SharedInterner::new();
        let b = AstBuilder::new(&interner);
        let program = b.block(vec![
            b.print(b.string("before")),
            b.line(5).call("missing", vec![]),
            b.print(b.string("after")),
        ]);

        let handler = buffer_handler();
        let mut interp = Interpreter::builder()
            .interner(interner.clone())
            .print_handler(handler.clone())
            .build();
        assert_eq!(interp.interpret(&program), None);
        assert_eq!(
            handler.lines(),
            vec!["before", "[line 5] Error at 'missing': Undefined variable 'missing'"]
        );
    }
}
