// rivulet/src/core/data_object.rs

//! Data products flowing between stages, and the shared `DataHandle` wrapper.

use crate::error::RivuletResult;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Upcasting helper so trait objects can be downcast to their concrete kind.
/// Implemented for every `'static` type.
pub trait AsAny: Any {
  fn as_any(&self) -> &dyn Any;
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

/// A materialized data product.
///
/// Stages publish data objects on their output ports. A one-off pipeline call
/// hands the caller independent copies made with `new_instance` followed by
/// `shallow_copy_from`, so implementations should make shallow copies share
/// heavy storage while keeping the object's own structure independent.
pub trait DataObject: AsAny + fmt::Debug + Send + Sync {
  /// Name of the concrete kind, used in logs and error messages.
  fn class_name(&self) -> &'static str;

  /// A new, empty object of the same concrete kind.
  fn new_instance(&self) -> Box<dyn DataObject>;

  /// Replace this object's contents with a shallow copy of `source`.
  /// Fails with `TypeMismatch` if `source` is of an incompatible kind.
  fn shallow_copy_from(&mut self, source: &dyn DataObject) -> RivuletResult<()>;
}

/// Shared handle to a data object, with interior mutability through
/// `parking_lot::RwLock`. Cloning the handle shares the object.
#[derive(Clone)]
pub struct DataHandle(Arc<RwLock<Box<dyn DataObject>>>);

impl DataHandle {
  pub fn new<D: DataObject>(data: D) -> Self {
    DataHandle(Arc::new(RwLock::new(Box::new(data))))
  }

  pub fn from_boxed(data: Box<dyn DataObject>) -> Self {
    DataHandle(Arc::new(RwLock::new(data)))
  }

  /// Acquires a read lock on the object.
  pub fn read(&self) -> MappedRwLockReadGuard<'_, dyn DataObject> {
    RwLockReadGuard::map(self.0.read(), |boxed| &**boxed)
  }

  /// Acquires a write lock on the object.
  pub fn write(&self) -> MappedRwLockWriteGuard<'_, dyn DataObject> {
    RwLockWriteGuard::map(self.0.write(), |boxed| &mut **boxed)
  }

  pub fn class_name(&self) -> &'static str {
    self.read().class_name()
  }

  /// True if both handles refer to the same object.
  pub fn ptr_eq(&self, other: &DataHandle) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  /// Is the object of concrete kind `D`?
  pub fn is<D: DataObject>(&self) -> bool {
    let guard = self.read();
    let object: &dyn DataObject = &*guard;
    object.as_any().is::<D>()
  }

  /// Runs `f` against the object if it is of kind `D`.
  pub fn with<D: DataObject, R>(&self, f: impl FnOnce(&D) -> R) -> Option<R> {
    let guard = self.read();
    let object: &dyn DataObject = &*guard;
    object.as_any().downcast_ref::<D>().map(f)
  }

  /// Runs `f` against the object mutably if it is of kind `D`.
  pub fn with_mut<D: DataObject, R>(&self, f: impl FnOnce(&mut D) -> R) -> Option<R> {
    let mut guard = self.write();
    let object: &mut dyn DataObject = &mut *guard;
    object.as_any_mut().downcast_mut::<D>().map(f)
  }

  /// A fresh empty object of the same kind, in its own handle.
  pub fn new_instance(&self) -> DataHandle {
    DataHandle::from_boxed(self.read().new_instance())
  }

  /// An independent object of the same kind holding a shallow copy of this one.
  pub fn shallow_copy(&self) -> RivuletResult<DataHandle> {
    let copy = self.new_instance();
    {
      let source = self.read();
      copy.write().shallow_copy_from(&*source)?;
    }
    Ok(copy)
  }
}

impl fmt::Debug for DataHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0.try_read() {
      Some(guard) => f.debug_tuple("DataHandle").field(&**guard).finish(),
      None => f.debug_tuple("DataHandle").field(&"<locked>").finish(),
    }
  }
}

impl<D: DataObject> From<D> for DataHandle {
  fn from(data: D) -> Self {
    DataHandle::new(data)
  }
}
