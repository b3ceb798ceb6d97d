//! Class definitions and object instances.
//!
//! The class model is deliberately lightweight: a qualified name, attribute
//! names in declaration order, the set of method names the class exposes,
//! and an optional state-extraction capability. Attribute types are not
//! stored here; a loader recovers them structurally from the owning values.
use std::rc::Rc;

use crate::value::Value;

/// Method name of the state-extraction hook.
pub const GETSTATE_METHOD: &str = "__getstate__";
/// Method name of the state-restoration hook.
pub const SETSTATE_METHOD: &str = "__setstate__";

/// State-extraction capability of a class.
///
/// Invoking this runs user-visible code; the serializer calls it at most
/// once per encoded object, at serialization time only.
pub type GetStateFn = dyn Fn(&Object) -> Value;

/// A class definition.
pub struct ClassType {
    pub qualified_name: String,
    /// Attribute names in declaration order.
    pub attributes: Vec<String>,
    /// Names of the methods the class itself exposes.
    pub methods: Vec<String>,
    get_state: Option<Rc<GetStateFn>>,
}

impl ClassType {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            attributes: Vec::new(),
            methods: Vec::new(),
            get_state: None,
        }
    }

    pub fn with_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods<S: Into<String>>(mut self, methods: impl IntoIterator<Item = S>) -> Self {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Install the get/set-state pair: a state-extraction callable plus the
    /// two method names that advertise it.
    pub fn with_state_pair(mut self, get_state: Rc<GetStateFn>) -> Self {
        self.get_state = Some(get_state);
        for method in [GETSTATE_METHOD, SETSTATE_METHOD] {
            if !self.has_method(method) {
                self.methods.push(method.to_string());
            }
        }
        self
    }

    /// Whether the class itself exposes a method with this name.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }

    /// The state-extraction callable, present when the class carries a
    /// get/set-state pair.
    pub fn get_state(&self) -> Option<&GetStateFn> {
        self.get_state.as_deref()
    }

    /// Qualified name of the free restorer function matching this class.
    pub fn setstate_name(&self) -> String {
        format!("{}.{}", self.qualified_name, SETSTATE_METHOD)
    }
}

impl std::fmt::Debug for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassType")
            .field("qualified_name", &self.qualified_name)
            .field("attributes", &self.attributes)
            .field("methods", &self.methods)
            .field("get_state", &self.get_state.is_some())
            .finish()
    }
}

/// An instance of a [`ClassType`], holding one value slot per declared
/// attribute, in declaration order.
#[derive(Debug, Clone)]
pub struct Object {
    pub class: Rc<ClassType>,
    pub slots: Vec<Value>,
}

impl Object {
    pub fn new(class: Rc<ClassType>, slots: Vec<Value>) -> Self {
        debug_assert_eq!(
            class.attributes.len(),
            slots.len(),
            "object of class {} must carry one slot per attribute",
            class.qualified_name
        );
        Self { class, slots }
    }

    pub fn get_slot(&self, index: usize) -> &Value {
        &self.slots[index]
    }
}
