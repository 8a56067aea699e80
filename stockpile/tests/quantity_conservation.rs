//! Property tests for stock conservation.
//!
//! Any sequence of reserve, extend and cancel calls on one item must keep
//! `quantity_available + reserved_quantity` equal to the starting stock, and
//! every call must succeed or fail exactly as a simple model predicts.

mod common;

use common::{item_id, memory_engine, widget};
use proptest::prelude::*;
use stockpile::ErrorKind;

const INITIAL: u32 = 20;

#[derive(Debug, Clone)]
enum Op {
    Reserve(u32),
    Extend(u64),
    Cancel(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..=25).prop_map(Op::Reserve),
        (1u64..=5_000).prop_map(Op::Extend),
        (1u32..=25).prop_map(Op::Cancel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn quantity_is_conserved(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let (engine, _store) = memory_engine([widget("X", INITIAL)]);
        let x = item_id("X");
        // Model: the quantity currently held, if reserved.
        let mut held: Option<u32> = None;

        for op in ops {
            match op {
                Op::Reserve(quantity) => {
                    let result = engine.reserve(&x, quantity, 600_000);
                    match held {
                        Some(_) => {
                            prop_assert_eq!(
                                result.unwrap_err().kind(),
                                ErrorKind::ReservationConflict
                            );
                        }
                        None if quantity > INITIAL => {
                            prop_assert_eq!(
                                result.unwrap_err().kind(),
                                ErrorKind::InsufficientQuantity
                            );
                        }
                        None => {
                            prop_assert!(result.is_ok());
                            held = Some(quantity);
                        }
                    }
                }
                Op::Extend(additional_ms) => {
                    let result = engine.extend(&x, additional_ms);
                    prop_assert_eq!(result.is_ok(), held.is_some());
                }
                Op::Cancel(quantity) => {
                    let result = engine.cancel(&x, quantity);
                    match held.take() {
                        Some(_) => {
                            prop_assert!(result.is_ok());
                        }
                        None => {
                            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::NotReserved);
                        }
                    }
                }
            }

            let status = engine.status(&x).unwrap();
            prop_assert_eq!(status.quantity_available + status.reserved_quantity, INITIAL);
            prop_assert_eq!(status.reserved, held.is_some());
            prop_assert_eq!(status.reserved_quantity, held.unwrap_or(0));
            prop_assert_eq!(engine.pending_expirations(), usize::from(held.is_some()));
        }
    }
}
