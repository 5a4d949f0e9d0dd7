// rivulet/src/core/field_data.rs

//! `FieldData`: a general-purpose data object made of named `f64` arrays.

use super::data_object::DataObject;
use crate::error::{RivuletError, RivuletResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A set of named numeric arrays.
///
/// Array storage is reference counted: a shallow copy shares every array with
/// its source, while adding, replacing or removing arrays on either side
/// leaves the other untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldData {
  arrays: BTreeMap<String, Arc<Vec<f64>>>,
}

impl FieldData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style helper for constructing field data inline.
  pub fn with_array(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
    self.set_array(name, values);
    self
  }

  pub fn set_array(&mut self, name: impl Into<String>, values: Vec<f64>) {
    self.arrays.insert(name.into(), Arc::new(values));
  }

  /// Installs an already shared array without copying it.
  pub fn set_shared_array(&mut self, name: impl Into<String>, values: Arc<Vec<f64>>) {
    self.arrays.insert(name.into(), values);
  }

  pub fn array(&self, name: &str) -> Option<&[f64]> {
    self.arrays.get(name).map(|values| values.as_slice())
  }

  pub fn shared_array(&self, name: &str) -> Option<Arc<Vec<f64>>> {
    self.arrays.get(name).cloned()
  }

  pub fn remove_array(&mut self, name: &str) -> Option<Arc<Vec<f64>>> {
    self.arrays.remove(name)
  }

  pub fn array_names(&self) -> impl Iterator<Item = &str> {
    self.arrays.keys().map(String::as_str)
  }

  pub fn number_of_arrays(&self) -> usize {
    self.arrays.len()
  }

  pub fn is_empty(&self) -> bool {
    self.arrays.is_empty()
  }

  pub fn clear(&mut self) {
    self.arrays.clear();
  }
}

impl DataObject for FieldData {
  fn class_name(&self) -> &'static str {
    "FieldData"
  }

  fn new_instance(&self) -> Box<dyn DataObject> {
    Box::new(FieldData::new())
  }

  fn shallow_copy_from(&mut self, source: &dyn DataObject) -> RivuletResult<()> {
    let source = source
      .as_any()
      .downcast_ref::<FieldData>()
      .ok_or_else(|| RivuletError::TypeMismatch {
        expected: self.class_name().to_string(),
        found: source.class_name().to_string(),
      })?;
    self.arrays = source.arrays.clone();
    Ok(())
  }
}
