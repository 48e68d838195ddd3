// Scoped stack checked against a plain vector-of-vectors model

use lrdom::action::ScopedStack;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Open,
    Push(u8),
    Pop,
    Close,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Open),
        any::<u8>().prop_map(Op::Push),
        Just(Op::Pop),
        Just(Op::Close),
    ]
}

fn growing_op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Open), any::<u8>().prop_map(Op::Push)]
}

fn apply(stack: &mut ScopedStack<u8>, op: &Op) {
    match op {
        Op::Open => stack.open_scope(),
        Op::Push(value) => stack.push(*value),
        Op::Pop => {
            let _ = stack.pop();
        }
        Op::Close => {
            let _ = stack.close_scope();
        }
    }
}

proptest! {
    #[test]
    fn test_matches_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut stack = ScopedStack::new();
        let mut model: Vec<Vec<u8>> = vec![Vec::new()];

        for op in &ops {
            match op {
                Op::Open => {
                    stack.open_scope();
                    model.push(Vec::new());
                }
                Op::Push(value) => {
                    stack.push(*value);
                    if let Some(top) = model.last_mut() {
                        top.push(*value);
                    }
                }
                Op::Pop => {
                    let expected = model.last_mut().and_then(Vec::pop);
                    prop_assert_eq!(stack.pop().ok(), expected);
                }
                Op::Close => {
                    if model.len() > 1 {
                        let expected = model.pop();
                        prop_assert_eq!(stack.close_scope().ok(), expected);
                    } else {
                        prop_assert!(stack.close_scope().is_err());
                    }
                }
            }

            prop_assert_eq!(stack.depth(), model.len());
            prop_assert_eq!(stack.top_scope(), model.last().map_or(&[][..], Vec::as_slice));
            prop_assert_eq!(stack.peek().ok(), model.last().and_then(|top| top.last()));
        }
    }

    #[test]
    fn test_rollback_undoes_growth(
        prefix in prop::collection::vec(op(), 0..50),
        speculative in prop::collection::vec(growing_op(), 0..50),
    ) {
        let mut stack = ScopedStack::new();
        for op in &prefix {
            apply(&mut stack, op);
        }
        let depth = stack.depth();
        let top = stack.top_scope().to_vec();

        let checkpoint = stack.checkpoint();
        for op in &speculative {
            apply(&mut stack, op);
        }
        stack.rollback(checkpoint);

        prop_assert_eq!(stack.depth(), depth);
        prop_assert_eq!(stack.top_scope(), top.as_slice());
    }
}
