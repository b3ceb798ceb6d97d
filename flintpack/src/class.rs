//! The class/object encoder.
//!
//! Classes are classified into one of three storage strategies so the
//! loader knows how to rebuild instances without running arbitrary code;
//! objects are then encoded to match their class's strategy.
use std::rc::Rc;

use flintir::class::{ClassType, Object, SETSTATE_METHOD};
use log::warn;

use crate::{
    SETSTATE_NOT_FOUND,
    error::PackResult,
    records::{ObjectRecord, ObjectTypeKind, ObjectTypeRecord},
    session::Session,
};

impl Session<'_> {
    /// Serialize one class definition into the object-type table, memoized
    /// by qualified name. The index is reserved and interned before the
    /// record is built, so a reference back to the class from inside its
    /// own encoding resolves to the reserved slot.
    pub(crate) fn store_class(&mut self, class: &Rc<ClassType>) -> PackResult<u32> {
        if let Some(index) = self.dedup.class_index(&class.qualified_name) {
            return Ok(index);
        }

        let index = self.builder.reserve_object_type();
        self.dedup.record_class(class.qualified_name.clone(), index);
        let record = self.class_to_record(class);
        self.builder.populate_object_type(index, record);
        Ok(index)
    }

    /// Classification, checked in order: a free `<class>.__setstate__`
    /// function in the compilation unit wins, then a `__setstate__` method
    /// on the class itself (opaque capability class), else the class is a
    /// plain field container.
    fn class_to_record(&self, class: &ClassType) -> ObjectTypeRecord {
        let (kind, attribute_names) = if self.unit.find_function(&class.setstate_name()).is_some() {
            (ObjectTypeKind::ClassWithSetstate, Vec::new())
        } else if class.has_method(SETSTATE_METHOD) {
            (ObjectTypeKind::CustomClass, Vec::new())
        } else {
            (ObjectTypeKind::ClassWithFields, class.attributes.clone())
        };

        ObjectTypeRecord {
            qualified_name: class.qualified_name.clone(),
            kind,
            attribute_names,
        }
    }

    /// Serialize one object instance. A class with a get/set-state pair has
    /// its state extracted by invoking the (side-effecting) `get_state`
    /// capability, exactly once; a plain field container stores one value
    /// index per attribute slot, in declaration order.
    pub(crate) fn object_to_record(&mut self, object: &Object) -> PackResult<ObjectRecord> {
        let class = &object.class;

        if let Some(get_state) = class.get_state() {
            let state = get_state(object);
            let state_index = self.store_value(&state)?;
            let setstate_name = class.setstate_name();
            let setstate_index = match self.dedup.function_index(&setstate_name) {
                Some(index) => index,
                None => {
                    // The restorer was not part of the serialized function
                    // set; record the distinct not-found sentinel rather
                    // than an ambiguous 0.
                    warn!(
                        "restorer `{setstate_name}` not found among serialized functions, \
                         recording not-found sentinel"
                    );
                    SETSTATE_NOT_FOUND
                }
            };
            let type_index = self.store_class(class)?;
            Ok(ObjectRecord::WithState {
                type_index,
                state_index,
                setstate_index,
            })
        } else {
            let attributes = self.store_values(&object.slots)?;
            let type_index = self.store_class(class)?;
            Ok(ObjectRecord::WithFields {
                type_index,
                attributes,
            })
        }
    }
}
