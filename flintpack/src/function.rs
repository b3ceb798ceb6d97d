//! The function/bytecode encoder.
use flintir::function::{Function, Schema};
use log::debug;

use crate::{
    CAPABILITY_CLASS_PREFIX, INTERNAL_TYPE_PREFIX,
    error::{PackError, PackResult},
    records::{ArgRecord, FunctionRecord, SchemaRecord, ValueRecord},
    session::Session,
};

impl Session<'_> {
    /// Serialize one function as a function-kind value record, memoized by
    /// qualified name: recursive references and repeated method lookups
    /// resolve to the same index.
    pub(crate) fn store_function(
        &mut self,
        qualified_name: &str,
        function: &Function,
    ) -> PackResult<u32> {
        if let Some(index) = self.dedup.function_index(qualified_name) {
            return Ok(index);
        }

        debug!("encoding function `{qualified_name}`");
        let record = self.function_to_record(qualified_name, function)?;
        let index = self.builder.push_value(ValueRecord::Function(Box::new(record)));
        self.dedup.record_function(qualified_name.to_string(), index);
        Ok(index)
    }

    fn function_to_record(
        &mut self,
        qualified_name: &str,
        function: &Function,
    ) -> PackResult<FunctionRecord> {
        // The instruction stream is transliterated verbatim, no
        // reinterpretation.
        let instructions = function.instructions.clone();
        let operators = function.operators.clone();

        let constants = self.store_values(&function.constants)?;

        for annotation in &function.types {
            check_type_annotation(qualified_name, annotation)?;
        }

        let (schema, class_index) = match &function.schema {
            Some(schema) => {
                check_schema(qualified_name, schema)?;
                let record = self.schema_to_record(schema)?;
                // The receiver type of a bound method is the class of the
                // schema's first argument.
                let class_index = match schema.receiver_class() {
                    Some(class) => Some(self.store_class(&class)?),
                    None => None,
                };
                (Some(record), class_index)
            }
            None => (None, None),
        };

        Ok(FunctionRecord {
            qualified_name: qualified_name.to_string(),
            instructions,
            operators,
            constants,
            types: function.types.clone(),
            register_size: function.register_size,
            schema,
            debug_handles: function.debug_handles.clone(),
            class_index,
        })
    }

    fn schema_to_record(&mut self, schema: &Schema) -> PackResult<SchemaRecord> {
        let mut record = SchemaRecord::default();
        for (source, sink) in [
            (&schema.arguments, &mut record.arguments),
            (&schema.returns, &mut record.returns),
        ] {
            for arg in source.iter() {
                sink.push(ArgRecord {
                    name: arg.name.clone(),
                    annotation: arg.annotation.clone(),
                    default_index: self.store_value(&arg.default_value)?,
                });
            }
        }
        Ok(record)
    }
}

/// Reject schemas the on-device interpreter cannot dispatch: overloads,
/// variadic arguments and variadic returns.
fn check_schema(qualified_name: &str, schema: &Schema) -> PackResult<()> {
    if !schema.overload_name.is_empty() {
        return Err(PackError::OverloadedSchema {
            function: qualified_name.to_string(),
            overload: schema.overload_name.clone(),
        });
    }
    if schema.is_vararg {
        return Err(PackError::VariadicArguments {
            function: qualified_name.to_string(),
        });
    }
    if schema.is_varret {
        return Err(PackError::VariadicReturns {
            function: qualified_name.to_string(),
        });
    }
    Ok(())
}

/// Compatibility boundary: types in the internal namespace may not cross
/// into a serialized module unless they are recognized capability classes.
fn check_type_annotation(qualified_name: &str, annotation: &str) -> PackResult<()> {
    if annotation.starts_with(INTERNAL_TYPE_PREFIX)
        && !annotation.starts_with(CAPABILITY_CLASS_PREFIX)
    {
        return Err(PackError::DisallowedTypeReference {
            function: qualified_name.to_string(),
            annotation: annotation.to_string(),
            allowlist: CAPABILITY_CLASS_PREFIX,
        });
    }
    Ok(())
}
