//! Shared-mutability handles for the single-threaded execution model.
//!
//! Everything in this crate lives on one logical thread, so interior
//! mutability is `Rc<RefCell<_>>` throughout. `MutRc` is the owning handle;
//! `WeakRc` is its non-owning companion, used for back-references that must
//! not keep their target alive (a subscription's parent links).

use std::{
  cell::{Ref, RefCell, RefMut},
  rc::{Rc, Weak},
};

pub struct MutRc<T>(Rc<RefCell<T>>);

impl<T> MutRc<T> {
  pub fn own(t: T) -> Self { Self(Rc::new(RefCell::new(t))) }

  #[inline]
  pub fn rc_deref(&self) -> Ref<'_, T> { self.0.borrow() }

  #[inline]
  pub fn rc_deref_mut(&self) -> RefMut<'_, T> { self.0.borrow_mut() }

  /// Identity comparison: two handles are the same iff they point at the
  /// same cell.
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }

  #[inline]
  pub fn downgrade(&self) -> WeakRc<T> { WeakRc(Rc::downgrade(&self.0)) }
}

impl<T> Clone for MutRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutRc<T> {
  fn default() -> Self { Self::own(T::default()) }
}

pub struct WeakRc<T>(Weak<RefCell<T>>);

impl<T> WeakRc<T> {
  #[inline]
  pub fn upgrade(&self) -> Option<MutRc<T>> { self.0.upgrade().map(MutRc) }

  #[inline]
  pub fn ptr_eq(&self, other: &MutRc<T>) -> bool {
    self.0.as_ptr() == Rc::as_ptr(&other.0)
  }
}

impl<T> Clone for WeakRc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
