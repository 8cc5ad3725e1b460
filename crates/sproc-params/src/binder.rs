//! Parameter binder
//!
//! Builds the parameter collection of one invocation. Every parameter gets
//! its storage type at declaration, so an unsupported type fails here rather
//! than when the routine is executed.

use crate::conversion::storage_type_for;
use crate::output::OutputValue;
use parking_lot::RwLock;
use sproc_core::{
    BindError, BinderConfig, ColumnValue, Result, SemanticType, StorageType, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Direction of a routine parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl Direction {
    /// Whether the routine writes a value back into this parameter
    pub fn is_output(self) -> bool {
        !matches!(self, Direction::Input)
    }

    /// Whether the caller supplies a value for this parameter
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input | Direction::InputOutput)
    }
}

/// Storage shared between a parameter and its output handles
#[derive(Debug)]
pub(crate) struct ParameterSlot {
    pub(crate) value: RwLock<Value>,
    pub(crate) executed: Arc<AtomicBool>,
}

/// One declared routine parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    qualified_name: String,
    direction: Direction,
    semantic_type: SemanticType,
    storage_type: StorageType,
    size: Option<u32>,
    nullable: bool,
    pub(crate) slot: Arc<ParameterSlot>,
}

impl Parameter {
    /// Name without the server prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name with the server prefix, e.g. `@total`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Character width bound; only ever set for character storage types
    pub fn size(&self) -> Option<u32> {
        self.size
    }

    /// Whether SQL NULL is a legal value
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Current contents of the parameter's value slot
    pub fn value(&self) -> Value {
        self.slot.value.read().clone()
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Declares the parameters of one invocation
#[derive(Debug)]
pub struct ParameterBinder {
    config: BinderConfig,
    parameters: Vec<Parameter>,
    executed: Arc<AtomicBool>,
}

impl Default for ParameterBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::with_config(BinderConfig::default())
    }

    pub fn with_config(config: BinderConfig) -> Self {
        Self {
            config,
            parameters: Vec::new(),
            executed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add an input parameter.
    ///
    /// `Value::Null` carries no type of its own, so a NULL input needs an
    /// explicit `semantic_type`. When a type is given, a non-null value must
    /// be of that kind.
    pub fn add_input(
        &mut self,
        name: &str,
        value: Value,
        semantic_type: Option<SemanticType>,
    ) -> Result<&mut Self> {
        let semantic = resolve_input_type(name, &value, semantic_type)?;
        self.declare(name, Direction::Input, semantic, value, None)?;
        Ok(self)
    }

    /// Add an input parameter typed by its Rust value; `None` binds a typed NULL
    pub fn add_input_typed<T: ColumnValue>(&mut self, name: &str, value: T) -> Result<&mut Self> {
        self.add_input(name, value.into_value(), Some(T::SEMANTIC_TYPE))
    }

    /// Add an output parameter and return its read handle.
    ///
    /// `fixed_size` bounds the width of text outputs and is ignored for other
    /// types.
    pub fn add_output<T: ColumnValue>(
        &mut self,
        name: &str,
        fixed_size: Option<u32>,
    ) -> Result<OutputValue<T>> {
        let parameter = self.declare(
            name,
            Direction::Output,
            T::SEMANTIC_TYPE,
            Value::Null,
            fixed_size,
        )?;
        Ok(OutputValue::new(parameter))
    }

    /// Add a parameter that is both sent to and written back by the routine
    pub fn add_input_output<T: ColumnValue>(
        &mut self,
        name: &str,
        value: T,
        fixed_size: Option<u32>,
    ) -> Result<OutputValue<T>> {
        let parameter = self.declare(
            name,
            Direction::InputOutput,
            T::SEMANTIC_TYPE,
            value.into_value(),
            fixed_size,
        )?;
        Ok(OutputValue::new(parameter))
    }

    /// Add the reserved parameter carrying the routine's own status code.
    ///
    /// At most one can exist per invocation.
    pub fn add_return_value<T: ColumnValue>(&mut self) -> Result<OutputValue<T>> {
        if self
            .parameters
            .iter()
            .any(|p| p.direction == Direction::ReturnValue)
        {
            return Err(BindError::DuplicateReturnValue.into());
        }
        let name = self.config.return_value_name.clone();
        let parameter = self.declare(
            &name,
            Direction::ReturnValue,
            T::SEMANTIC_TYPE,
            Value::Null,
            None,
        )?;
        Ok(OutputValue::new(parameter))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Hand the declared parameters over to the executing collaborator
    pub fn finish(self) -> ParameterCollection {
        tracing::debug!(parameters = self.parameters.len(), "parameter collection built");
        ParameterCollection {
            prefix: self.config.parameter_prefix,
            parameters: self.parameters,
            executed: self.executed,
        }
    }

    fn declare(
        &mut self,
        name: &str,
        direction: Direction,
        semantic: SemanticType,
        value: Value,
        fixed_size: Option<u32>,
    ) -> Result<&Parameter> {
        let name = strip_prefix(name, &self.config.parameter_prefix);
        if name.is_empty() {
            return Err(BindError::EmptyName.into());
        }
        if self.parameters.iter().any(|p| p.answers_to(name)) {
            return Err(BindError::DuplicateName(name.to_string()).into());
        }

        let storage_type = storage_type_for(name, semantic)?;
        let size = if storage_type.is_character() {
            match (fixed_size, direction.is_output()) {
                (Some(size), _) => Some(size),
                (None, true) => self.config.default_text_size,
                (None, false) => None,
            }
        } else {
            if fixed_size.is_some() {
                tracing::debug!(parameter = %name, "fixed size ignored for non-character type");
            }
            None
        };
        let nullable = semantic.nullable || (direction.is_input() && value.is_null());

        tracing::debug!(
            parameter = %name,
            direction = ?direction,
            storage = ?storage_type,
            nullable,
            "parameter declared"
        );

        self.parameters.push(Parameter {
            name: name.to_string(),
            qualified_name: self.config.qualified_name(name),
            direction,
            semantic_type: semantic,
            storage_type,
            size,
            nullable,
            slot: Arc::new(ParameterSlot {
                value: RwLock::new(value),
                executed: self.executed.clone(),
            }),
        });
        let last = self.parameters.len() - 1;
        Ok(&self.parameters[last])
    }
}

fn strip_prefix<'a>(name: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        name
    } else {
        name.strip_prefix(prefix).unwrap_or(name)
    }
}

fn resolve_input_type(
    name: &str,
    value: &Value,
    declared: Option<SemanticType>,
) -> Result<SemanticType> {
    match (value.kind(), declared) {
        (None, None) => Err(BindError::UntypedNull(name.to_string()).into()),
        (None, Some(semantic)) => Ok(semantic),
        (Some(kind), None) => Ok(SemanticType::new(kind)),
        (Some(kind), Some(semantic)) if kind == semantic.kind => Ok(semantic),
        (Some(kind), Some(semantic)) => Err(BindError::TypeMismatch {
            parameter: name.to_string(),
            expected: semantic.to_string(),
            actual: kind.to_string(),
        }
        .into()),
    }
}

/// The parameters of one invocation, as handed to the executing collaborator.
///
/// The collaborator reads the inputs, runs the routine, writes every output
/// it received with [`set_value`](Self::set_value) and then calls
/// [`mark_executed`](Self::mark_executed). Output handles refuse to resolve
/// before that point.
#[derive(Debug, Clone)]
pub struct ParameterCollection {
    prefix: String,
    parameters: Vec<Parameter>,
    executed: Arc<AtomicBool>,
}

impl ParameterCollection {
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Look a parameter up by name, with or without the server prefix
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        let name = strip_prefix(name, &self.prefix);
        self.parameters.iter().find(|p| p.answers_to(name))
    }

    /// Parameters whose values are sent to the routine
    pub fn inputs(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.direction.is_input())
    }

    /// Parameters the routine writes back, including the return value
    pub fn outputs(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.direction.is_output())
    }

    pub fn return_value(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.direction == Direction::ReturnValue)
    }

    /// Store the value the routine produced for an output parameter
    pub fn set_value(&self, name: &str, value: Value) -> Result<()> {
        let parameter = self
            .get(name)
            .ok_or_else(|| BindError::UnknownParameter(name.to_string()))?;
        if !parameter.direction.is_output() {
            return Err(BindError::NotAnOutput(parameter.name.clone()).into());
        }
        tracing::trace!(parameter = %parameter.name, "output value received");
        *parameter.slot.value.write() = value;
        Ok(())
    }

    /// Declare the owning execution complete; output handles become readable
    pub fn mark_executed(&self) {
        self.executed.store(true, Ordering::Release);
    }

    pub fn is_executed(&self) -> bool {
        self.executed.load(Ordering::Acquire)
    }
}
