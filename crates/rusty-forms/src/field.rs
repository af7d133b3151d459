// File: src/field.rs
// Purpose: Per-input validation state and the handle the presentation layer drives

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

use crate::config::MessageConfig;
use crate::error::{FormError, Result};
use crate::form::FormContext;
use crate::messages::FieldMessages;
use crate::rules::{compile, compile_required, RequiredInput, RuleSpec, ValidationSpec};
use crate::value::ValueExt;

/// Identity of a field node within its form, stable for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    pub fn new(id: u64) -> Self {
        FieldId(id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the presentation layer supplies when it creates a field.
///
/// Deserializes from the camelCase prop names a component would carry
/// (`requiredError`, `validationErrors`, ...). A missing `name` deserializes
/// to an empty one and is rejected by [`Field::new`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldProps {
    pub name: String,
    pub value: Value,
    pub validations: Option<ValidationSpec>,
    pub required: Option<RequiredInput>,
    pub required_error: Option<String>,
    pub validation_error: Option<String>,
    pub validation_errors: HashMap<String, String>,
}

impl FieldProps {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn validations(mut self, spec: impl Into<ValidationSpec>) -> Self {
        self.validations = Some(spec.into());
        self
    }

    pub fn required(mut self, required: impl Into<RequiredInput>) -> Self {
        self.required = Some(required.into());
        self
    }

    pub fn required_error(mut self, message: impl Into<String>) -> Self {
        self.required_error = Some(message.into());
        self
    }

    pub fn validation_error(mut self, message: impl Into<String>) -> Self {
        self.validation_error = Some(message.into());
        self
    }

    /// Message for one failing rule of this field
    pub fn rule_error(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.validation_errors.insert(rule.into(), message.into());
        self
    }
}

/// Outcome of running a field's rules, written back by the collector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    pub is_valid: bool,
    pub show_required: bool,
    pub errors: Vec<String>,
}

/// Inputs of the last rule run, for skip-if-unchanged revalidation
#[derive(Debug, Clone, PartialEq)]
struct RunFingerprint {
    value: Value,
    validations: RuleSpec,
    required_validations: RuleSpec,
}

#[derive(Debug)]
pub(crate) struct FieldState {
    pub(crate) id: FieldId,
    pub(crate) name: String,
    pub(crate) value: Value,
    pub(crate) pristine_value: Value,
    pub(crate) is_pristine: bool,
    pub(crate) is_required: bool,
    pub(crate) show_required: bool,
    pub(crate) is_valid: bool,
    pub(crate) validation_error: Vec<String>,
    pub(crate) external_error: Option<Vec<String>>,
    pub(crate) is_form_submitted: bool,
    pub(crate) validations: RuleSpec,
    pub(crate) required_validations: RuleSpec,
    pub(crate) messages: FieldMessages,
    last_run: Option<RunFingerprint>,
}

/// Shared validation state of one input.
///
/// The collector keeps a clone of every attached node; clones share state.
/// All queries are plain reads of the current state.
#[derive(Clone)]
pub struct FieldNode(Rc<RefCell<FieldState>>);

impl FieldNode {
    fn new(id: FieldId, props: &FieldProps) -> Self {
        let state = FieldState {
            id,
            name: props.name.clone(),
            value: props.value.clone(),
            pristine_value: props.value.clone(),
            is_pristine: true,
            is_required: false,
            show_required: false,
            is_valid: true,
            validation_error: Vec::new(),
            external_error: None,
            is_form_submitted: false,
            validations: RuleSpec::new(),
            required_validations: RuleSpec::new(),
            messages: FieldMessages {
                required_error: props.required_error.clone(),
                validation_error: props.validation_error.clone(),
                validation_errors: props.validation_errors.clone(),
            },
            last_run: None,
        };
        FieldNode(Rc::new(RefCell::new(state)))
    }

    pub(crate) fn state(&self) -> Ref<'_, FieldState> {
        self.0.borrow()
    }

    pub fn id(&self) -> FieldId {
        self.0.borrow().id
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    /// Whether two handles point at the same node
    pub fn ptr_eq(&self, other: &FieldNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn value(&self) -> Value {
        self.0.borrow().value.clone()
    }

    pub fn pristine_value(&self) -> Value {
        self.0.borrow().pristine_value.clone()
    }

    /// `false` only for the empty string; `null`, `0` and `false` count as values
    pub fn has_value(&self) -> bool {
        !self.0.borrow().value.is_empty_string()
    }

    pub fn is_valid(&self) -> bool {
        self.0.borrow().is_valid
    }

    pub fn is_pristine(&self) -> bool {
        self.0.borrow().is_pristine
    }

    pub fn is_form_submitted(&self) -> bool {
        self.0.borrow().is_form_submitted
    }

    /// A required input was supplied, whether or not it is currently met
    pub fn is_required(&self) -> bool {
        self.0.borrow().is_required
    }

    /// The last run failed on a required-rule
    pub fn show_required(&self) -> bool {
        self.0.borrow().show_required
    }

    /// Invalid for a reason other than a missing required value
    pub fn show_error(&self) -> bool {
        let state = self.0.borrow();
        !state.show_required && !state.is_valid
    }

    pub fn validations(&self) -> RuleSpec {
        self.0.borrow().validations.clone()
    }

    pub fn required_validations(&self) -> RuleSpec {
        self.0.borrow().required_validations.clone()
    }

    /// Messages to display, highest priority source first: external errors,
    /// computed rule messages, then the required message once the form was
    /// submitted and the field touched.
    pub fn error_messages(&self) -> Vec<String> {
        let state = self.0.borrow();

        if state.is_valid && !state.show_required {
            return Vec::new();
        }
        if let Some(external) = &state.external_error {
            return external.clone();
        }
        if !state.validation_error.is_empty() {
            return state.validation_error.clone();
        }
        if state.is_required && !state.is_pristine && !state.is_valid && state.is_form_submitted {
            if let Some(message) = &state.messages.required_error {
                return vec![message.clone()];
            }
        }
        Vec::new()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_messages().into_iter().next()
    }

    /// Write a validation outcome back. Clears any external error.
    pub(crate) fn apply_validation(&self, validation: Validation) {
        let mut state = self.0.borrow_mut();
        let fingerprint = RunFingerprint {
            value: state.value.clone(),
            validations: state.validations.clone(),
            required_validations: state.required_validations.clone(),
        };
        state.is_valid = validation.is_valid;
        state.show_required = validation.show_required;
        state.validation_error = validation.errors;
        state.external_error = None;
        state.last_run = Some(fingerprint);
    }

    /// Compile and store both specs. Nothing is replaced if either fails to
    /// compile. Returns whether the compiled specs changed.
    pub(crate) fn set_validations(
        &self,
        spec: Option<&ValidationSpec>,
        required: Option<&RequiredInput>,
    ) -> Result<bool> {
        let validations = compile(spec)?;
        let required_validations = compile_required(required)?;

        let mut state = self.0.borrow_mut();
        let changed = state.validations != validations
            || state.required_validations != required_validations;
        state.validations = validations;
        state.required_validations = required_validations;
        state.is_required = required.map(RequiredInput::is_set).unwrap_or(false);
        Ok(changed)
    }

    pub(crate) fn store_value(&self, value: Value) {
        let mut state = self.0.borrow_mut();
        state.value = value;
        state.is_pristine = false;
    }

    pub(crate) fn restore_pristine(&self) {
        let mut state = self.0.borrow_mut();
        state.value = state.pristine_value.clone();
        state.is_pristine = true;
    }

    pub(crate) fn set_form_state(&self, submitted: bool, pristine: bool) {
        let mut state = self.0.borrow_mut();
        state.is_form_submitted = submitted;
        state.is_pristine = pristine;
    }

    pub(crate) fn set_form_submitted(&self, submitted: bool) {
        self.0.borrow_mut().is_form_submitted = submitted;
    }

    pub(crate) fn set_external_error(&self, messages: Vec<String>) {
        let mut state = self.0.borrow_mut();
        state.is_valid = false;
        state.external_error = Some(messages);
        state.last_run = None;
    }

    pub(crate) fn inherit_messages(&self, defaults: &MessageConfig) {
        self.0.borrow_mut().messages.inherit(defaults);
    }

    /// Value and specs deep-equal those of the last rule run
    pub(crate) fn matches_last_run(&self) -> bool {
        let state = self.0.borrow();
        match &state.last_run {
            Some(last) => {
                last.value == state.value
                    && last.validations == state.validations
                    && last.required_validations == state.required_validations
            }
            None => false,
        }
    }
}

impl fmt::Debug for FieldNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("FieldNode")
            .field("id", &state.id)
            .field("name", &state.name)
            .field("value", &state.value)
            .field("is_valid", &state.is_valid)
            .field("is_pristine", &state.is_pristine)
            .finish()
    }
}

/// A field attached to a form.
///
/// Created through [`Field::new`] with an explicit form reference; attaching
/// validates the field once. Mutators ask the form to revalidate and return
/// only after the new state is in place. Dropping the handle detaches the
/// field.
pub struct Field {
    node: FieldNode,
    form: Rc<dyn FormContext>,
    detached: Cell<bool>,
}

impl Field {
    /// Create a field and attach it to `form`
    pub fn new<C: FormContext + 'static>(form: &Rc<C>, props: FieldProps) -> Result<Self> {
        Self::with_context(form.clone(), props)
    }

    /// Same as [`Field::new`] for an already type-erased form
    pub fn with_context(form: Rc<dyn FormContext>, props: FieldProps) -> Result<Self> {
        if props.name.is_empty() {
            return Err(FormError::MissingName);
        }

        let node = FieldNode::new(form.next_field_id(), &props);
        node.set_validations(props.validations.as_ref(), props.required.as_ref())?;
        form.attach_to_form(&node)?;

        Ok(Self {
            node,
            form,
            detached: Cell::new(false),
        })
    }

    /// The shared node the form tracks
    pub fn node(&self) -> &FieldNode {
        &self.node
    }

    pub fn id(&self) -> FieldId {
        self.node.id()
    }

    pub fn name(&self) -> String {
        self.node.name()
    }

    /// Replace both rule specs. Does not revalidate.
    pub fn set_validations(
        &self,
        spec: Option<&ValidationSpec>,
        required: Option<&RequiredInput>,
    ) -> Result<()> {
        self.node.set_validations(spec, required).map(|_| ())
    }

    /// Replace both rule specs and revalidate in place if they changed.
    /// The pristine flag is left alone.
    pub fn update_validations(
        &self,
        spec: Option<&ValidationSpec>,
        required: Option<&RequiredInput>,
    ) -> Result<()> {
        if self.node.set_validations(spec, required)? && !self.ignored("update_validations") {
            self.form.validate(&self.node)?;
        }
        Ok(())
    }

    /// Store a new value and revalidate. Ignored once detached.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        if self.ignored("set_value") {
            return Ok(());
        }
        self.node.store_value(value.into());
        self.form.validate(&self.node)
    }

    /// Back to the value captured at creation, marked pristine. Ignored once
    /// detached.
    pub fn reset_value(&self) -> Result<()> {
        if self.ignored("reset_value") {
            return Ok(());
        }
        self.node.restore_pristine();
        self.form.validate(&self.node)
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    fn ignored(&self, call: &str) -> bool {
        if self.detached.get() {
            trace!(field = %self.node.name(), id = %self.node.id(), call, "ignored on detached field");
        }
        self.detached.get()
    }

    pub fn get_value(&self) -> Value {
        self.node.value()
    }

    pub fn has_value(&self) -> bool {
        self.node.has_value()
    }

    pub fn is_valid(&self) -> bool {
        self.node.is_valid()
    }

    pub fn is_pristine(&self) -> bool {
        self.node.is_pristine()
    }

    pub fn is_form_submitted(&self) -> bool {
        self.node.is_form_submitted()
    }

    pub fn is_required(&self) -> bool {
        self.node.is_required()
    }

    pub fn show_required(&self) -> bool {
        self.node.show_required()
    }

    pub fn show_error(&self) -> bool {
        self.node.show_error()
    }

    pub fn get_error_message(&self) -> Option<String> {
        self.node.error_message()
    }

    pub fn get_error_messages(&self) -> Vec<String> {
        self.node.error_messages()
    }

    pub fn is_form_disabled(&self) -> bool {
        self.form.is_form_disabled()
    }

    /// Would `candidate` pass this field's rules? Leaves the field untouched.
    pub fn is_valid_value(&self, candidate: impl Into<Value>) -> Result<bool> {
        self.form.is_valid_value(&self.node, &candidate.into())
    }

    /// Remove the field from its form for good. Repeated calls do nothing.
    pub fn detach(&self) {
        if !self.detached.replace(true) {
            self.form.detach_from_form(&self.node);
        }
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("node", &self.node).finish()
    }
}
