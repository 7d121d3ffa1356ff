//! Early-exit product of a list
//!
//! The product is computed with an effectful fold inside a capture scope. A
//! zero exits the scope immediately, so later elements are never visited.

use crate::runtime::{call_cc_command, fold, pure, Comp, ComputationExt, Val};

pub const ZERO_PRODUCT: &str = "Product is 0";

pub fn multiplier(xs: Vec<f64>) -> Comp {
    multiplier_inspect(xs, |_| ())
}

/// `multiplier`, calling `inspect` with every element it actually visits
pub fn multiplier_inspect<F>(xs: Vec<f64>, mut inspect: F) -> Comp
where
    F: FnMut(f64) + Send + 'static,
{
    let items = xs.into_iter().map(Val::Num).collect();
    call_cc_command(move |exit| {
        fold(items, 1.0, move |product, x| {
            let x = x.as_num().unwrap_or(0.0);
            inspect(x);
            if x == 0.0 {
                exit.exit(ZERO_PRODUCT)
            } else {
                pure(product.as_num().unwrap_or(0.0) * x)
            }
        })
    })
}

/// `"early exit"` through the escape, or `"normal exit"` by returning
pub fn simple_call_cc(exit_early: bool) -> Comp {
    call_cc_command(move |exit| {
        if exit_early {
            // Sequenced after the escape, so it never runs
            exit.exit("early exit").then(pure(Val::Null))
        } else {
            pure("normal exit")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{call_cc_interpreter, run, Interpreter};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn run_call_cc(comp: Comp) -> Val {
        run(call_cc_interpreter().interpret(comp)).unwrap()
    }

    #[test]
    fn test_product_without_zero() {
        assert_eq!(run_call_cc(multiplier(vec![2.0, 3.0, 4.0])), Val::Num(24.0));
    }

    #[test]
    fn test_zero_short_circuits() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let log = visited.clone();
        let comp = multiplier_inspect(vec![2.0, 3.0, 0.0, 5.0], move |x| {
            log.lock().push(x);
        });

        assert_eq!(run_call_cc(comp), Val::from(ZERO_PRODUCT));
        assert_eq!(*visited.lock(), vec![2.0, 3.0, 0.0]);
    }

    #[test]
    fn test_empty_list_is_one() {
        assert_eq!(run_call_cc(multiplier(vec![])), Val::Num(1.0));
    }

    #[test]
    fn test_simple_call_cc_both_paths() {
        assert_eq!(run_call_cc(simple_call_cc(true)), Val::from("early exit"));
        assert_eq!(run_call_cc(simple_call_cc(false)), Val::from("normal exit"));
    }
}
