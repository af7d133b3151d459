// File: src/form.rs
// Purpose: The collector: owns attached fields, runs their rules, answers form-wide queries

use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

use crate::config::{FormConfig, RevalidationPolicy};
use crate::error::{FormError, Result};
use crate::field::{Field, FieldId, FieldNode, FieldProps, Validation};
use crate::rules::{RuleRegistry, RuleSpec};
use crate::value::insert_path;

/// What a field needs from the form it belongs to.
///
/// [`Form`] is the implementation shipped here; a field only ever talks to
/// its form through these calls.
pub trait FormContext {
    /// Identity for a field about to be created on this form
    fn next_field_id(&self) -> FieldId;

    /// Track `node` and validate it once. On error the node is left
    /// unattached.
    fn attach_to_form(&self, node: &FieldNode) -> Result<()>;

    /// Stop tracking `node`. A node that is not attached is ignored.
    fn detach_from_form(&self, node: &FieldNode);

    /// Re-run the rules of `node` and store the outcome on it
    fn validate(&self, node: &FieldNode) -> Result<()>;

    fn is_form_disabled(&self) -> bool;

    /// Run the rules of `node` against `value` without storing anything
    fn is_valid_value(&self, node: &FieldNode, value: &Value) -> Result<bool>;
}

/// Notifications for code observing a form
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Every attached field became valid
    Valid,
    /// Some attached field became invalid
    Invalid,
    /// Submitted while valid, with the model
    ValidSubmit(Value),
    /// Submitted while invalid, with the model
    InvalidSubmit(Value),
    Reset,
}

/// Result of [`Form::submit`]
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub valid: bool,
    pub model: Value,
}

type Listener = Rc<dyn Fn(&FormEvent)>;

/// Handle returned by [`Form::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct RuleResults {
    passed: Vec<String>,
    failed: Vec<String>,
}

/// Collector of fields.
///
/// Single-threaded: state lives in `Cell`/`RefCell`, and no borrow is held
/// while listeners run, so a listener may call back into the form.
pub struct Form {
    config: FormConfig,
    registry: Rc<RuleRegistry>,
    inputs: RefCell<Vec<FieldNode>>,
    disabled: Cell<bool>,
    submitted: Cell<bool>,
    last_validity: Cell<Option<bool>>,
    next_field: Cell<u64>,
    next_listener: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
}

impl Form {
    /// Form with the built-in rule set
    pub fn new(config: FormConfig) -> Self {
        Self::with_registry(config, Rc::new(RuleRegistry::new()))
    }

    /// Form using a caller-built registry, which may be shared between forms
    pub fn with_registry(config: FormConfig, registry: Rc<RuleRegistry>) -> Self {
        let disabled = config.form.disabled;
        Self {
            config,
            registry,
            inputs: RefCell::new(Vec::new()),
            disabled: Cell::new(disabled),
            submitted: Cell::new(false),
            last_validity: Cell::new(None),
            next_field: Cell::new(1),
            next_listener: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Create a field attached to this form
    pub fn field(self: &Rc<Self>, props: FieldProps) -> Result<Field> {
        Field::new(self, props)
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn is_form_submitted(&self) -> bool {
        self.submitted.get()
    }

    /// Number of attached fields
    pub fn len(&self) -> usize {
        self.inputs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.borrow().is_empty()
    }

    /// Every attached field is valid. An empty form is valid.
    pub fn is_form_valid(&self) -> bool {
        self.inputs.borrow().iter().all(FieldNode::is_valid)
    }

    /// Re-run the rules of every attached field
    pub fn validate_form(&self) -> Result<()> {
        for node in self.nodes() {
            self.run_and_store(&node)?;
        }
        self.refresh_validity();
        Ok(())
    }

    /// `(name, value)` of every attached field, in attach order
    pub fn current_values(&self) -> Vec<(String, Value)> {
        self.nodes()
            .iter()
            .map(|node| (node.name(), node.value()))
            .collect()
    }

    /// `(name, pristine value)` of every attached field, in attach order
    pub fn pristine_values(&self) -> Vec<(String, Value)> {
        self.nodes()
            .iter()
            .map(|node| (node.name(), node.pristine_value()))
            .collect()
    }

    /// Current values as a JSON object. `a.b` and `a[b]` names nest; when two
    /// fields share a name the later one wins.
    pub fn model(&self) -> Value {
        let mut model = Map::new();
        for (name, value) in self.current_values() {
            insert_path(&mut model, &name, value);
        }
        Value::Object(model)
    }

    /// Some field's value differs from its pristine value
    pub fn is_changed(&self) -> bool {
        self.current_values() != self.pristine_values()
    }

    /// `(name, messages)` of every field currently showing messages
    pub fn errors(&self) -> Vec<(String, Vec<String>)> {
        self.nodes()
            .iter()
            .filter_map(|node| {
                let messages = node.error_messages();
                (!messages.is_empty()).then(|| (node.name(), messages))
            })
            .collect()
    }

    /// Mark fields invalid with messages from outside the rule set, e.g. a
    /// server response. Every field sharing a name receives the messages.
    /// The next revalidation of a field clears them.
    ///
    /// Names must all belong to attached fields; otherwise nothing is applied.
    pub fn update_inputs_with_error<I>(&self, errors: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let errors: Vec<(String, Vec<String>)> = errors.into_iter().collect();
        let nodes = self.nodes();

        if let Some((name, _)) = errors
            .iter()
            .find(|(name, _)| !nodes.iter().any(|node| node.has_name(name)))
        {
            warn!(field = %name, "external error for a field that is not attached");
            return Err(FormError::UnknownField(name.clone()));
        }

        for (name, messages) in errors {
            debug!(field = %name, count = messages.len(), "applying external errors");
            for node in nodes.iter().filter(|node| node.has_name(&name)) {
                node.set_external_error(messages.clone());
            }
        }

        self.refresh_validity();
        Ok(())
    }

    /// Flag the form and all fields as submitted and report the outcome.
    ///
    /// Fields are marked non-pristine so required messages become visible.
    /// Validity is already settled by earlier calls, so no rules run here.
    pub fn submit(&self) -> Submission {
        self.submitted.set(true);
        for node in self.nodes() {
            node.set_form_state(true, false);
        }

        let valid = self.is_form_valid();
        let model = self.model();
        info!(valid, fields = self.len(), "form submitted");

        self.emit(if valid {
            FormEvent::ValidSubmit(model.clone())
        } else {
            FormEvent::InvalidSubmit(model.clone())
        });

        Submission { valid, model }
    }

    /// Clear the submitted flag and reset every field.
    ///
    /// A field whose name appears in `values` gets that value (as if the user
    /// typed it); the rest return to their pristine values.
    pub fn reset(&self, values: Option<&Map<String, Value>>) -> Result<()> {
        self.submitted.set(false);

        for node in self.nodes() {
            node.set_form_state(false, true);
            match values.and_then(|values| values.get(node.name().as_str())) {
                Some(value) => node.store_value(value.clone()),
                None => node.restore_pristine(),
            }
            self.run_and_store(&node)?;
        }

        self.refresh_validity();
        info!(fields = self.len(), "form reset");
        self.emit(FormEvent::Reset);
        Ok(())
    }

    /// Register a listener for [`FormEvent`]s
    pub fn subscribe(&self, listener: impl Fn(&FormEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Snapshot of attached nodes, so no borrow of the set outlives the call
    fn nodes(&self) -> Vec<FieldNode> {
        self.inputs.borrow().clone()
    }

    fn run_and_store(&self, node: &FieldNode) -> Result<()> {
        let validation = self.run_validation(node, None)?;
        debug!(
            field = %node.name(),
            id = %node.id(),
            valid = validation.is_valid,
            show_required = validation.show_required,
            "validated field"
        );
        node.apply_validation(validation);
        Ok(())
    }

    /// Evaluate a node's rules against its value, or against `candidate`.
    fn run_validation(&self, node: &FieldNode, candidate: Option<&Value>) -> Result<Validation> {
        let state = node.state();
        let value = candidate.unwrap_or(&state.value);

        let rules = self.run_rules(value, &state.validations)?;
        let required = self.run_rules(value, &state.required_validations)?;

        // A required-rule that *passes* means the field is missing its value
        let show_required = !required.passed.is_empty();
        let is_valid = !show_required && rules.failed.is_empty();

        let errors = if is_valid {
            Vec::new()
        } else if show_required {
            required
                .passed
                .first()
                .and_then(|rule| state.messages.required_rule_message(rule))
                .into_iter()
                .collect()
        } else {
            let mut errors: Vec<String> = Vec::new();
            for rule in &rules.failed {
                let message = state.messages.resolve_rule(rule, &self.config.messages);
                if !errors.contains(&message) {
                    errors.push(message);
                }
            }
            errors
        };

        Ok(Validation {
            is_valid,
            show_required,
            errors,
        })
    }

    fn run_rules(&self, value: &Value, spec: &RuleSpec) -> Result<RuleResults> {
        let mut results = RuleResults::default();
        for (rule, arg) in spec.iter() {
            if self.registry.evaluate(rule, value, arg)? {
                results.passed.push(rule.to_string());
            } else {
                results.failed.push(rule.to_string());
            }
        }
        Ok(results)
    }

    /// Emit Valid/Invalid when form-wide validity flips
    fn refresh_validity(&self) {
        let valid = self.is_form_valid();
        if self.last_validity.replace(Some(valid)) != Some(valid) {
            debug!(valid, "form validity changed");
            self.emit(if valid {
                FormEvent::Valid
            } else {
                FormEvent::Invalid
            });
        }
    }

    fn emit(&self, event: FormEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

impl FormContext for Form {
    fn next_field_id(&self) -> FieldId {
        let id = self.next_field.get();
        self.next_field.set(id + 1);
        FieldId::new(id)
    }

    fn attach_to_form(&self, node: &FieldNode) -> Result<()> {
        let attached = {
            let mut inputs = self.inputs.borrow_mut();
            if inputs.iter().any(|input| input.ptr_eq(node)) {
                false
            } else {
                node.inherit_messages(&self.config.messages);
                node.set_form_submitted(self.submitted.get());
                inputs.push(node.clone());
                true
            }
        };

        if let Err(err) = self.validate(node) {
            if attached {
                // Undo the push without emitting
                self.inputs.borrow_mut().retain(|input| !input.ptr_eq(node));
            }
            return Err(err);
        }

        if attached {
            debug!(field = %node.name(), id = %node.id(), fields = self.len(), "attached field");
        }
        Ok(())
    }

    fn detach_from_form(&self, node: &FieldNode) {
        let removed = {
            let mut inputs = self.inputs.borrow_mut();
            let before = inputs.len();
            inputs.retain(|input| !input.ptr_eq(node));
            inputs.len() != before
        };

        if removed {
            debug!(field = %node.name(), id = %node.id(), fields = self.len(), "detached field");
            self.refresh_validity();
        } else {
            trace!(id = %node.id(), "detach of a field that is not attached");
        }
    }

    fn validate(&self, node: &FieldNode) -> Result<()> {
        if self.config.form.revalidation == RevalidationPolicy::SkipUnchanged
            && node.matches_last_run()
        {
            trace!(field = %node.name(), "value and rules unchanged, skipping validation");
            return Ok(());
        }

        self.run_and_store(node)?;
        self.refresh_validity();
        Ok(())
    }

    fn is_form_disabled(&self) -> bool {
        self.disabled.get()
    }

    fn is_valid_value(&self, node: &FieldNode, value: &Value) -> Result<bool> {
        Ok(self.run_validation(node, Some(value))?.is_valid)
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("config", &self.config)
            .field("inputs", &self.inputs.borrow())
            .field("disabled", &self.disabled.get())
            .field("submitted", &self.submitted.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn form() -> Rc<Form> {
        Rc::new(Form::new(FormConfig::default()))
    }

    #[test]
    fn test_attach_validates_immediately() {
        let form = form();
        let field = form
            .field(FieldProps::new("age").value("abc").validations("isInt"))
            .unwrap();

        assert_eq!(form.len(), 1);
        assert!(!field.is_valid());
        assert_eq!(field.get_error_messages(), vec!["isInt"]);
    }

    #[test]
    fn test_attach_twice_keeps_one_entry() {
        let form = form();
        let field = form.field(FieldProps::new("a")).unwrap();
        form.attach_to_form(field.node()).unwrap();
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_missing_name_never_attaches() {
        let form = form();
        let err = form.field(FieldProps::default()).unwrap_err();
        assert_eq!(err, FormError::MissingName);
        assert!(form.is_empty());
    }

    #[test]
    fn test_unknown_rule_surfaces_and_leaves_no_node() {
        let form = form();
        let err = form
            .field(FieldProps::new("a").validations("isBanana"))
            .unwrap_err();
        assert_eq!(err, FormError::UnknownRule("isBanana".to_string()));
        assert!(form.is_empty());
    }

    #[test]
    fn test_failed_attach_emits_nothing() {
        let form = form();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        form.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let err = form
            .field(FieldProps::new("a").value("x").validations("isBanana"))
            .unwrap_err();
        assert_eq!(err, FormError::UnknownRule("isBanana".to_string()));
        assert!(form.is_empty());
        assert!(events.borrow().is_empty());

        let _field = form.field(FieldProps::new("b")).unwrap();
        assert_eq!(*events.borrow(), vec![FormEvent::Valid]);
    }

    #[test]
    fn test_field_ids_are_per_form() {
        let first = form();
        let second = form();
        let a = first.field(FieldProps::new("a")).unwrap();
        let b = first.field(FieldProps::new("b")).unwrap();
        let c = second.field(FieldProps::new("c")).unwrap();

        assert_eq!(a.id(), FieldId::new(1));
        assert_eq!(b.id(), FieldId::new(2));
        assert_eq!(c.id(), FieldId::new(1));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let form = form();
        let count = Rc::new(Cell::new(0usize));
        let counter = count.clone();
        let id = form.subscribe(move |_| counter.set(counter.get() + 1));

        let field = form
            .field(FieldProps::new("n").value("1").validations("isInt"))
            .unwrap();
        assert_eq!(count.get(), 1);

        assert!(form.unsubscribe(id));
        assert!(!form.unsubscribe(id));
        field.set_value("x").unwrap();
        form.submit();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_failed_messages_are_deduplicated_in_order() {
        let form = form();
        let field = form
            .field(
                FieldProps::new("code")
                    .value("a")
                    .validations("isInt,minLength:3,isNumeric")
                    .rule_error("minLength", "Too short")
                    .validation_error("Invalid"),
            )
            .unwrap();

        assert_eq!(field.get_error_messages(), vec!["Invalid", "Too short"]);
        assert_eq!(field.get_error_message().as_deref(), Some("Invalid"));
    }

    #[test]
    fn test_required_failure_uses_required_rule_message() {
        let form = form();
        let field = form
            .field(
                FieldProps::new("name")
                    .value("")
                    .required(true)
                    .rule_error("isDefaultRequiredValue", "Fill me in"),
            )
            .unwrap();

        assert!(field.show_required());
        assert!(!field.is_valid());
        assert!(!field.show_error());
        assert_eq!(field.get_error_messages(), vec!["Fill me in"]);
    }

    #[test]
    fn test_is_valid_value_is_a_dry_run() {
        let form = form();
        let field = form
            .field(FieldProps::new("n").value("12").validations("isInt").required(true))
            .unwrap();

        assert!(field.is_valid_value("7").unwrap());
        assert!(!field.is_valid_value("x").unwrap());
        assert!(!field.is_valid_value("").unwrap());
        assert_eq!(field.get_value(), json!("12"));
        assert!(field.is_valid());
        assert!(field.is_pristine());
    }

    #[test]
    fn test_model_and_values() {
        let form = form();
        let _name = form.field(FieldProps::new("name").value("Ada")).unwrap();
        let _street = form.field(FieldProps::new("address.street").value("Main")).unwrap();
        let _city = form.field(FieldProps::new("address[city]").value("Paris")).unwrap();

        assert_eq!(
            form.model(),
            json!({ "name": "Ada", "address": { "street": "Main", "city": "Paris" } })
        );
        assert_eq!(
            form.current_values(),
            vec![
                ("name".to_string(), json!("Ada")),
                ("address.street".to_string(), json!("Main")),
                ("address[city]".to_string(), json!("Paris")),
            ]
        );
    }

    #[test]
    fn test_is_changed() {
        let form = form();
        let field = form.field(FieldProps::new("a").value("x")).unwrap();
        assert!(!form.is_changed());

        field.set_value("y").unwrap();
        assert!(form.is_changed());

        field.set_value("x").unwrap();
        assert!(!form.is_changed(), "same value again is not a change");
        assert!(!field.is_pristine());
    }

    #[test]
    fn test_disabled_flag() {
        let form = Rc::new(Form::new(FormConfig {
            form: crate::config::FormSettings {
                disabled: true,
                ..Default::default()
            },
            ..Default::default()
        }));
        let field = form.field(FieldProps::new("a")).unwrap();
        assert!(field.is_form_disabled());

        form.set_disabled(false);
        assert!(!field.is_form_disabled());
    }

    #[test]
    fn test_validity_events_fire_on_transitions() {
        let form = form();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        form.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let field = form
            .field(FieldProps::new("n").value("1").validations("isInt"))
            .unwrap();
        field.set_value("2").unwrap();
        field.set_value("x").unwrap();
        field.set_value("y").unwrap();
        field.set_value("3").unwrap();

        assert_eq!(
            *events.borrow(),
            vec![FormEvent::Valid, FormEvent::Invalid, FormEvent::Valid]
        );
    }

    #[test]
    fn test_listener_may_query_form() {
        let form = form();
        let seen = Rc::new(Cell::new(0usize));
        let weak = Rc::downgrade(&form);
        let counter = seen.clone();
        form.subscribe(move |_| {
            if let Some(form) = weak.upgrade() {
                counter.set(form.len());
            }
        });

        let _field = form.field(FieldProps::new("a")).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_registry_can_be_shared() {
        let mut registry = RuleRegistry::new();
        registry.register("isUpper", |value, _| {
            value
                .as_str()
                .map(|s| s.chars().all(char::is_uppercase))
                .unwrap_or(false)
        });
        let registry = Rc::new(registry);

        let first = Rc::new(Form::with_registry(FormConfig::default(), registry.clone()));
        let second = Rc::new(Form::with_registry(FormConfig::default(), registry));

        let a = first.field(FieldProps::new("a").value("ABC").validations("isUpper")).unwrap();
        let b = second.field(FieldProps::new("b").value("abc").validations("isUpper")).unwrap();
        assert!(a.is_valid());
        assert!(!b.is_valid());
        assert!(first.registry().has("isUpper"));
    }
}
