//! Left-to-right composition of unary transforms.
//!
//! `pipe` works over tuples of `FnOnce` transforms so a whole chain is one
//! expression; the empty tuple is the identity. Implementations for arities
//! one through eight are macro-generated.

/// A tuple of unary transforms applied left to right.
pub trait PipeChain<In> {
  type Out;

  fn apply(self, input: In) -> Self::Out;
}

impl<In> PipeChain<In> for () {
  type Out = In;

  #[inline]
  fn apply(self, input: In) -> In { input }
}

macro_rules! pipe_chain_impl {
  ($(($f:ident, $i:ident, $o:ident)),+; $last:ident) => {
    impl<In, $($o,)+ $($f,)+> PipeChain<In> for ($($f,)+)
    where
      $($f: FnOnce($i) -> $o,)+
    {
      type Out = $last;

      fn apply(self, input: In) -> $last {
        #[allow(non_snake_case)]
        let ($($f,)+) = self;
        $(let input = $f(input);)+
        input
      }
    }
  };
}

pipe_chain_impl!((F1, In, O1); O1);
pipe_chain_impl!((F1, In, O1), (F2, O1, O2); O2);
pipe_chain_impl!((F1, In, O1), (F2, O1, O2), (F3, O2, O3); O3);
pipe_chain_impl!((F1, In, O1), (F2, O1, O2), (F3, O2, O3), (F4, O3, O4); O4);
pipe_chain_impl!((F1, In, O1), (F2, O1, O2), (F3, O2, O3), (F4, O3, O4), (F5, O4, O5); O5);
pipe_chain_impl!(
  (F1, In, O1), (F2, O1, O2), (F3, O2, O3), (F4, O3, O4), (F5, O4, O5), (F6, O5, O6); O6
);
pipe_chain_impl!(
  (F1, In, O1), (F2, O1, O2), (F3, O2, O3), (F4, O3, O4), (F5, O4, O5), (F6, O5, O6),
  (F7, O6, O7); O7
);
pipe_chain_impl!(
  (F1, In, O1), (F2, O1, O2), (F3, O2, O3), (F4, O3, O4), (F5, O4, O5), (F6, O5, O6),
  (F7, O6, O7), (F8, O7, O8); O8
);

/// Compose a tuple of unary transforms into one function.
///
/// ```rust
/// use rxlite::observable::pipe;
///
/// let f = pipe((|x: i32| x + 1, |x: i32| x * 10));
/// assert_eq!(f(4), 50);
///
/// // Zero transforms: the identity.
/// assert_eq!(pipe(())(4), 4);
/// ```
pub fn pipe<In, Ops: PipeChain<In>>(ops: Ops) -> impl FnOnce(In) -> Ops::Out {
  move |input| ops.apply(input)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_transforms_is_identity() {
    assert_eq!(pipe(())(42), 42);
    assert_eq!(pipe(())("untouched"), "untouched");
  }

  #[test]
  fn transforms_apply_left_to_right() {
    let f = pipe(((|x: i32| x + 1), (|x: i32| x * 2)));
    // (3 + 1) * 2, not (3 * 2) + 1.
    assert_eq!(f(3), 8);
  }

  #[test]
  fn transforms_may_change_type() {
    let f = pipe(((|x: i32| x.to_string()), (|s: String| s.len())));
    assert_eq!(f(1234), 4);
  }
}
