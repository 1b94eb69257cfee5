use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::profile::analyzer::{ClassProfile, ProfileConfig};

/// Methods selected for instrumentation, grouped by class.
///
/// Classes are keyed by their Java name (`com.acme.OrderService`) and kept sorted, as are the
/// method names of each class, so the rendered include value is stable.
///
/// # Examples
///
/// ```rust
/// use jarscope::profile::{ClassProfile, InstrumentationPlan, MethodProfile, ProfileConfig};
///
/// let profile = ClassProfile {
///     class_name: "com/acme/OrderService".into(),
///     methods: vec![MethodProfile {
///         name: "place".into(),
///         descriptor: "()V".into(),
///         synchronized: true,
///         call_count: 0,
///         branch_count: 0,
///         client_calls: vec![],
///     }],
/// };
///
/// let mut plan = InstrumentationPlan::new();
/// plan.add(&profile, &ProfileConfig::default());
/// assert_eq!(plan.include_value(), "com.acme.OrderService[place];");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentationPlan {
    classes: BTreeMap<String, BTreeSet<String>>,
}

impl InstrumentationPlan {
    /// An empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a plan from many class profiles.
    pub fn from_profiles<'a>(
        profiles: impl IntoIterator<Item = &'a ClassProfile>,
        config: &ProfileConfig,
    ) -> Self {
        let mut plan = Self::new();
        for profile in profiles {
            plan.add(profile, config);
        }
        plan
    }

    /// Add the flagged methods of `profile`; classes with none are skipped.
    pub fn add(&mut self, profile: &ClassProfile, config: &ProfileConfig) {
        let flagged = profile.flagged_methods(config);
        if flagged.is_empty() {
            return;
        }
        self.classes
            .entry(profile.class_name.replace('/', "."))
            .or_default()
            .extend(flagged.into_iter().map(String::from));
    }

    /// Number of classes with at least one selected method.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no method was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Selected method names of `class` (Java name).
    #[must_use]
    pub fn methods(&self, class: &str) -> Option<&BTreeSet<String>> {
        self.classes.get(class)
    }

    /// `Class[m1,m2];` for every class, concatenated, as accepted by method-include settings.
    #[must_use]
    pub fn include_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for InstrumentationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (class, methods) in &self.classes {
            write!(f, "{class}[")?;
            for (position, method) in methods.iter().enumerate() {
                if position > 0 {
                    f.write_str(",")?;
                }
                f.write_str(method)?;
            }
            f.write_str("];")?;
        }
        Ok(())
    }
}
