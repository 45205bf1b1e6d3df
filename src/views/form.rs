//! Typed model of the cascading entry form.
//!
//! The form walks through
//! `NoClassSelected -> ClassSelected -> PropertiesLoaded -> PropertySelected -> ObjectKindResolved`.
//! Every selection that triggers a fetch hands out a [`FetchTicket`]. A
//! response is only applied when its ticket belongs to the latest generation,
//! so a slow answer for an earlier selection can never overwrite a newer one.
//! Any upstream change resets every control below it.

use serde::Serialize;

use crate::ontology::{Class, Instance, Iri, ObjectKind, Property};

pub const SELECT_CLASS_FIRST: &str = "-- select a class first --";
pub const SELECT_PROPERTY: &str = "-- select a property --";
pub const SELECT_PROPERTY_FIRST: &str = "-- select a property first --";
pub const SELECT_INSTANCE: &str = "-- select an instance --";
pub const LOADING_PROPERTIES: &str = "Loading properties...";
pub const LOADING_INSTANCES: &str = "Loading instances...";
pub const PROPERTIES_FAILED: &str = "Error loading properties";
pub const INSTANCES_FAILED: &str = "Error loading instances";
pub const NO_PROPERTIES: &str = "No relevant properties found";
pub const NO_INSTANCES: &str = "No instances found";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "object_kind")]
pub enum FormStage {
    NoClassSelected,
    /// Properties of the chosen class are being fetched.
    ClassSelected,
    PropertiesLoaded,
    /// Object choices for the chosen property are being fetched.
    PropertySelected,
    ObjectKindResolved(ObjectKind),
}

/// What a fetch issued by the machine should retrieve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchTarget {
    Properties { class: Iri },
    /// Instances, filtered by `range` when the property declares one.
    Instances { range: Option<Iri> },
}

/// Receipt for a pending fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    target: FetchTarget,
}

impl FetchTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn target(&self) -> &FetchTarget {
        &self.target
    }
}

/// Content of a dependent select control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Choices<T> {
    /// Waiting for an upstream selection.
    Disabled,
    Loading,
    Failed,
    Ready(Vec<T>),
}

impl<T> Default for Choices<T> {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Visibility and validation flags of an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
}

impl FieldState {
    const SHOWN: Self = Self {
        visible: true,
        enabled: true,
        required: true,
    };
    const HIDDEN: Self = Self {
        visible: false,
        enabled: false,
        required: false,
    };
}

/// State of the cascading form.
#[derive(Clone, Debug)]
pub struct FormMachine {
    generation: u64,
    stage: FormStage,
    class: Option<Iri>,
    properties: Choices<Property>,
    property: Option<Property>,
    instances: Choices<Instance>,
    object_kind: ObjectKind,
}

impl Default for FormMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generation: 0,
            stage: FormStage::NoClassSelected,
            class: None,
            properties: Choices::Disabled,
            property: None,
            instances: Choices::Disabled,
            object_kind: ObjectKind::Literal,
        }
    }

    #[must_use]
    pub fn stage(&self) -> FormStage {
        self.stage
    }

    #[must_use]
    pub fn selected_class(&self) -> Option<&Iri> {
        self.class.as_ref()
    }

    #[must_use]
    pub fn selected_property(&self) -> Option<&Property> {
        self.property.as_ref()
    }

    #[must_use]
    pub fn properties(&self) -> &Choices<Property> {
        &self.properties
    }

    #[must_use]
    pub fn instances(&self) -> &Choices<Instance> {
        &self.instances
    }

    /// Value of the hidden `objectKind` tracker.
    #[must_use]
    pub fn object_kind(&self) -> ObjectKind {
        self.object_kind
    }

    #[must_use]
    pub fn literal_field(&self) -> FieldState {
        match self.stage {
            FormStage::ObjectKindResolved(ObjectKind::Instance) => FieldState::HIDDEN,
            _ => FieldState::SHOWN,
        }
    }

    #[must_use]
    pub fn instance_field(&self) -> FieldState {
        match self.stage {
            FormStage::ObjectKindResolved(ObjectKind::Instance) => FieldState::SHOWN,
            _ => FieldState::HIDDEN,
        }
    }

    fn next_ticket(&mut self, target: FetchTarget) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            target,
        }
    }

    fn reset_object(&mut self) {
        self.property = None;
        self.instances = Choices::Disabled;
        self.object_kind = ObjectKind::Literal;
    }

    /// Selects a subject class, or clears the selection with `None`.
    ///
    /// Returns the ticket for fetching the class's properties.
    pub fn select_class(&mut self, class: Option<Iri>) -> Option<FetchTicket> {
        self.generation += 1;
        self.reset_object();

        let Some(class) = class else {
            self.class = None;
            self.properties = Choices::Disabled;
            self.stage = FormStage::NoClassSelected;
            return None;
        };
        self.class = Some(class.clone());
        self.properties = Choices::Loading;
        self.stage = FormStage::ClassSelected;
        Some(self.next_ticket(FetchTarget::Properties { class }))
    }

    /// Applies a property listing. Returns `false` when `ticket` is stale.
    pub fn properties_loaded<E>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Property>, E>,
    ) -> bool {
        let current = matches!(
            &ticket.target,
            FetchTarget::Properties { class } if self.class.as_ref() == Some(class)
        );
        if ticket.generation != self.generation || !current {
            return false;
        }
        self.properties = match result {
            Ok(properties) => Choices::Ready(properties),
            Err(_) => Choices::Failed,
        };
        self.stage = FormStage::PropertiesLoaded;
        true
    }

    /// Selects a property among the loaded ones.
    ///
    /// Kind and range come from the option cached when properties were
    /// loaded. Instance-kind properties return a ticket for fetching the
    /// object choices; literal and unknown kinds resolve immediately.
    pub fn select_property(&mut self, property: Option<&Iri>) -> Option<FetchTicket> {
        if matches!(
            self.stage,
            FormStage::NoClassSelected | FormStage::ClassSelected
        ) {
            return None;
        }
        self.generation += 1;
        self.reset_object();
        self.stage = FormStage::PropertiesLoaded;

        let Choices::Ready(options) = &self.properties else {
            return None;
        };
        let chosen = property.and_then(|iri| options.iter().find(|p| p.iri() == iri))?;
        let chosen = chosen.clone();
        let kind = chosen.object_kind();
        let range = chosen.range().cloned();
        self.property = Some(chosen);

        if kind == Some(ObjectKind::Instance) {
            self.instances = Choices::Loading;
            self.stage = FormStage::PropertySelected;
            Some(self.next_ticket(FetchTarget::Instances { range }))
        } else {
            self.object_kind = ObjectKind::Literal;
            self.stage = FormStage::ObjectKindResolved(ObjectKind::Literal);
            None
        }
    }

    /// Applies an instance listing. Returns `false` when `ticket` is stale.
    pub fn instances_loaded<E>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Instance>, E>,
    ) -> bool {
        let current = matches!(
            &ticket.target,
            FetchTarget::Instances { range }
                if self.property.as_ref().map(Property::range) == Some(range.as_ref())
        );
        if ticket.generation != self.generation || !current {
            return false;
        }
        self.instances = match result {
            Ok(instances) => Choices::Ready(instances),
            Err(_) => Choices::Failed,
        };
        self.object_kind = ObjectKind::Instance;
        self.stage = FormStage::ObjectKindResolved(ObjectKind::Instance);
        true
    }

    /// Flattens the machine into the template model.
    #[must_use]
    pub fn view(&self, classes: &[Class]) -> FormView {
        let selected_class = self.class.as_ref().map(Iri::as_str);
        let selected_property = self.property.as_ref().map(|p| p.iri().as_str());

        let class_control = SelectView {
            enabled: true,
            placeholder: None,
            options: classes
                .iter()
                .map(|class| OptionView {
                    value: class.iri().to_string(),
                    label: class.label().to_owned(),
                    selected: Some(class.iri().as_str()) == selected_class,
                    object_kind: None,
                    range: None,
                })
                .collect(),
        };

        let property_control = match &self.properties {
            Choices::Disabled => SelectView::disabled(SELECT_CLASS_FIRST),
            Choices::Loading => SelectView::disabled(LOADING_PROPERTIES),
            Choices::Failed => SelectView::disabled(PROPERTIES_FAILED),
            Choices::Ready(properties) if properties.is_empty() => {
                SelectView::disabled(NO_PROPERTIES)
            }
            Choices::Ready(properties) => SelectView {
                enabled: true,
                placeholder: Some(SELECT_PROPERTY),
                options: properties
                    .iter()
                    .map(|property| OptionView {
                        value: property.iri().to_string(),
                        label: property.label().to_owned(),
                        selected: Some(property.iri().as_str()) == selected_property,
                        object_kind: property.object_kind(),
                        range: property.range().map(Iri::to_string),
                    })
                    .collect(),
            },
        };

        let instance_control = match &self.instances {
            Choices::Disabled => SelectView::disabled(SELECT_PROPERTY_FIRST),
            Choices::Loading => SelectView::disabled(LOADING_INSTANCES),
            Choices::Failed => SelectView::disabled(INSTANCES_FAILED),
            Choices::Ready(instances) if instances.is_empty() => {
                SelectView::disabled(NO_INSTANCES)
            }
            Choices::Ready(instances) => SelectView {
                enabled: true,
                placeholder: Some(SELECT_INSTANCE),
                options: instances
                    .iter()
                    .map(|instance| OptionView {
                        value: instance.iri().to_string(),
                        label: instance.label().to_owned(),
                        selected: false,
                        object_kind: None,
                        range: None,
                    })
                    .collect(),
            },
        };

        FormView {
            stage: self.stage,
            object_kind: self.object_kind,
            class_control,
            property_control,
            instance_control,
            literal_field: self.literal_field(),
            instance_field: self.instance_field(),
        }
    }
}

/// Render model of the whole form.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub stage: FormStage,
    pub object_kind: ObjectKind,
    pub class_control: SelectView,
    pub property_control: SelectView,
    pub instance_control: SelectView,
    pub literal_field: FieldState,
    pub instance_field: FieldState,
}

#[derive(Debug, Serialize)]
pub struct SelectView {
    pub enabled: bool,
    pub placeholder: Option<&'static str>,
    pub options: Vec<OptionView>,
}

impl SelectView {
    fn disabled(placeholder: &'static str) -> Self {
        Self {
            enabled: false,
            placeholder: Some(placeholder),
            options: vec![],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub object_kind: Option<ObjectKind>,
    pub range: Option<String>,
}
