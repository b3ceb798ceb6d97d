//! The recursive value encoder.
//!
//! `store_value` is the central dispatch of the serializer: it resolves the
//! none sentinel, consults the content memoization table, and otherwise
//! lowers the value to a [`ValueRecord`] in strict post-order — every
//! element record is fully written (and its index known) before the record
//! that references it, so the value table never contains a forward
//! reference.
use flintir::value::{Dict, List, Value};
use log::debug;

use crate::{NONE_INDEX, error::PackResult, records::ValueRecord, session::Session};

impl Session<'_> {
    /// Serialize one value and return its value-table index.
    pub(crate) fn store_value(&mut self, value: &Value) -> PackResult<u32> {
        if value.is_none() {
            return Ok(NONE_INDEX);
        }

        // Functions are memoized by qualified name, not content.
        if let Value::Function(function) = value {
            return self.store_function(&function.qualified_name, function);
        }

        let key = value.dedup_key();
        if let Some(key) = &key {
            if let Some(index) = self.dedup.value_index(key) {
                return Ok(index);
            }
        }

        let record = self.value_to_record(value)?;
        let index = self.builder.push_value(record);

        match key {
            Some(key) => self.dedup.record_value(key, index),
            // Not internable: every further occurrence is serialized afresh.
            None => debug!(
                "value of kind {:?} at index {index} is not internable",
                value.kind()
            ),
        }
        Ok(index)
    }

    /// Lower one non-none value to its record form, recursing through
    /// `store_value` for every element.
    fn value_to_record(&mut self, value: &Value) -> PackResult<ValueRecord> {
        Ok(match value {
            // `None` is handled by the sentinel short-circuit above and
            // `Function` by the name-memoized path; neither reaches here.
            Value::None => ValueRecord::None,
            Value::Int(v) => ValueRecord::Int(*v),
            Value::Bool(v) => ValueRecord::Bool(*v),
            Value::Double(v) => ValueRecord::Double(*v),
            Value::ComplexDouble { re, im } => ValueRecord::ComplexDouble { re: *re, im: *im },
            Value::String(s) => ValueRecord::String(s.to_string()),
            Value::Tuple(elements) => ValueRecord::Tuple {
                items: self.store_values(elements)?,
            },
            Value::List(list) => self.list_to_record(list)?,
            Value::Dict(dict) => self.dict_to_record(dict)?,
            Value::Tensor(tensor) => ValueRecord::Tensor(self.tensor_to_record(tensor)?),
            Value::Object(object) => ValueRecord::Object(self.object_to_record(object)?),
            Value::Device(device) => ValueRecord::Device {
                name: device.to_string(),
            },
            Value::Enum(enum_value) => ValueRecord::Enum {
                type_name: enum_value.type_name.clone(),
                value_index: self.store_value(&enum_value.value)?,
            },
            Value::Function(_) => {
                unreachable!("functions are stored through the name-memoized path")
            }
        })
    }

    pub(crate) fn store_values(&mut self, values: &[Value]) -> PackResult<Vec<u32>> {
        values.iter().map(|value| self.store_value(value)).collect()
    }

    /// Lists with a primitive element annotation take a specialized inline
    /// record holding the raw scalars; everything else stores per-element
    /// indices plus the declared annotation.
    fn list_to_record(&mut self, list: &List) -> PackResult<ValueRecord> {
        match list.elem_annotation.as_str() {
            "int" => {
                if let Some(items) = collect_scalars(&list.elements, Value::try_as_int_ref) {
                    return Ok(ValueRecord::IntList(items));
                }
            }
            "float" => {
                if let Some(items) = collect_scalars(&list.elements, Value::try_as_double_ref) {
                    return Ok(ValueRecord::DoubleList(items));
                }
            }
            "bool" => {
                if let Some(items) = collect_scalars(&list.elements, Value::try_as_bool_ref) {
                    return Ok(ValueRecord::BoolList(items));
                }
            }
            _ => {}
        }

        Ok(ValueRecord::List {
            items: self.store_values(&list.elements)?,
            annotation: list.annotation(),
        })
    }

    fn dict_to_record(&mut self, dict: &Dict) -> PackResult<ValueRecord> {
        let mut keys = Vec::with_capacity(dict.entries.len());
        let mut values = Vec::with_capacity(dict.entries.len());
        for (key, value) in &dict.entries {
            keys.push(self.store_value(key)?);
            values.push(self.store_value(value)?);
        }
        Ok(ValueRecord::Dict {
            keys,
            values,
            annotation: dict.annotation(),
        })
    }
}

/// Extract every element through `accessor`, or bail with [`None`] if any
/// element is of an unexpected kind (the generic list path handles it).
fn collect_scalars<T: Copy>(
    elements: &[Value],
    accessor: impl Fn(&Value) -> Option<&T>,
) -> Option<Vec<T>> {
    elements
        .iter()
        .map(|element| accessor(element).copied())
        .collect()
}
