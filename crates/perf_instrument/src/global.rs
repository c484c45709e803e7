//! Shared global properties and the rules for patching them
//!
//! A [`GlobalScope`] models the runtime's global object: named properties
//! with descriptor flags. [`install_property`] overwrites one of them
//! without losing the original:
//!
//! 1. a property that exists and is not configurable is refused, with a
//!    diagnostic, and left untouched;
//! 2. a configurable property is first copied to a backup name
//!    (`setTimeout` -> `originalRNSetTimeout`);
//! 3. the replacement is installed enumerable, writable and configurable.

use crate::error::{PatchError, PatchResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// A property value plus its flags.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor<V> {
    /// The property value
    pub value: V,
    /// Shows up when the scope's properties are listed
    pub enumerable: bool,
    /// The value may be reassigned
    pub writable: bool,
    /// The property may be redefined
    pub configurable: bool,
}

impl<V> PropertyDescriptor<V> {
    /// An ordinary property: enumerable, writable and configurable.
    pub fn data(value: V) -> Self {
        Self {
            value,
            enumerable: true,
            writable: true,
            configurable: true,
        }
    }

    /// A locked property that can be neither reassigned nor redefined.
    pub fn locked(value: V) -> Self {
        Self {
            value,
            enumerable: true,
            writable: false,
            configurable: false,
        }
    }
}

/// Named properties of a shared global object.
pub struct GlobalScope<V> {
    properties: RefCell<HashMap<String, PropertyDescriptor<V>>>,
}

impl<V> Default for GlobalScope<V> {
    fn default() -> Self {
        Self {
            properties: RefCell::new(HashMap::new()),
        }
    }
}

impl<V: Clone> GlobalScope<V> {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<V> {
        self.properties
            .borrow()
            .get(name)
            .map(|descriptor| descriptor.value.clone())
    }

    /// Check whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.properties.borrow().contains_key(name)
    }

    /// Copy of the descriptor for `name`.
    pub fn get_own_property_descriptor(&self, name: &str) -> Option<PropertyDescriptor<V>> {
        self.properties.borrow().get(name).cloned()
    }

    /// Define or redefine `name`.
    ///
    /// Redefining a non-configurable property fails and leaves it intact.
    pub fn define_property(
        &self,
        name: &str,
        descriptor: PropertyDescriptor<V>,
    ) -> PatchResult<()> {
        let mut properties = self.properties.borrow_mut();
        if let Some(existing) = properties.get(name) {
            if !existing.configurable {
                return Err(PatchError::NotConfigurable {
                    property: name.to_string(),
                });
            }
        }
        properties.insert(name.to_string(), descriptor);
        Ok(())
    }
}

impl<V> fmt::Debug for GlobalScope<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties = self.properties.borrow();
        let mut names: Vec<&String> = properties.keys().collect();
        names.sort();
        f.debug_struct("GlobalScope")
            .field("properties", &names)
            .finish()
    }
}

/// What [`install_property`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The property did not exist before
    Created,
    /// The property existed; its old descriptor lives under `backup`
    Replaced {
        /// Name the original descriptor was copied to
        backup: String,
    },
}

/// Backup name for a patched property: `originalRN` + capitalized name.
pub fn backup_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("originalRN{}{}", first.to_uppercase(), chars.as_str()),
        None => "originalRN".to_string(),
    }
}

/// Overwrite `name` on `scope` with `value`, keeping a backup of the
/// original.
///
/// A non-configurable existing property is refused: the original value
/// stays in place, a diagnostic is logged and the error is returned for
/// the caller to record. An existing backup is never overwritten, so the
/// pre-patch value stays reachable across repeated installs.
pub fn install_property<V: Clone>(
    scope: &GlobalScope<V>,
    name: &str,
    value: V,
) -> PatchResult<InstallOutcome> {
    let outcome = match scope.get_own_property_descriptor(name) {
        Some(existing) if !existing.configurable => {
            return Err(refused(PatchError::NotConfigurable {
                property: name.to_string(),
            }));
        }
        Some(existing) => {
            let backup = backup_name(name);
            if !scope.contains(&backup) {
                scope.define_property(&backup, existing).map_err(refused)?;
            }
            InstallOutcome::Replaced { backup }
        }
        None => InstallOutcome::Created,
    };

    scope
        .define_property(name, PropertyDescriptor::data(value))
        .map_err(refused)?;
    tracing::debug!(
        target: "perf::instrument",
        property = name,
        outcome = ?outcome,
        "global property installed"
    );
    Ok(outcome)
}

fn refused(err: PatchError) -> PatchError {
    tracing::error!(target: "perf::instrument", "{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_backup_name() {
        assert_eq!(backup_name("setTimeout"), "originalRNSetTimeout");
        assert_eq!(backup_name("requestAnimationFrame"), "originalRNRequestAnimationFrame");
        assert_eq!(backup_name(""), "originalRN");
    }

    #[test]
    fn test_install_creates_missing_property() {
        let scope: GlobalScope<u32> = GlobalScope::new();
        let outcome = install_property(&scope, "setTimeout", 1).unwrap();

        assert_eq!(outcome, InstallOutcome::Created);
        assert_eq!(scope.get("setTimeout"), Some(1));
        assert!(!scope.contains("originalRNSetTimeout"));
    }

    #[test]
    fn test_install_backs_up_configurable_property() {
        let scope: GlobalScope<u32> = GlobalScope::new();
        scope
            .define_property("setTimeout", PropertyDescriptor::data(1))
            .unwrap();

        let outcome = install_property(&scope, "setTimeout", 2).unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Replaced {
                backup: "originalRNSetTimeout".to_string()
            }
        );
        assert_eq!(scope.get("setTimeout"), Some(2));
        assert_eq!(scope.get("originalRNSetTimeout"), Some(1));

        let installed = scope.get_own_property_descriptor("setTimeout").unwrap();
        assert!(installed.enumerable && installed.writable && installed.configurable);
    }

    #[test]
    fn test_install_refuses_non_configurable_property() {
        let scope: GlobalScope<u32> = GlobalScope::new();
        scope
            .define_property("setTimeout", PropertyDescriptor::locked(1))
            .unwrap();

        let err = install_property(&scope, "setTimeout", 2).unwrap_err();

        assert_eq!(
            err,
            PatchError::NotConfigurable {
                property: "setTimeout".to_string()
            }
        );
        assert_eq!(scope.get("setTimeout"), Some(1));
        assert!(!scope.contains("originalRNSetTimeout"));
    }

    #[test]
    fn test_define_property_rejects_locked_redefinition() {
        let scope: GlobalScope<&str> = GlobalScope::new();
        scope
            .define_property("x", PropertyDescriptor::locked("a"))
            .unwrap();
        assert!(scope
            .define_property("x", PropertyDescriptor::data("b"))
            .is_err());
        assert_eq!(scope.get("x"), Some("a"));
    }

    #[test]
    fn test_repeated_install_keeps_first_backup() {
        let scope: GlobalScope<&str> = GlobalScope::new();
        scope
            .define_property("setTimeout", PropertyDescriptor::data("native"))
            .unwrap();

        install_property(&scope, "setTimeout", "wrapped-once").unwrap();
        let outcome = install_property(&scope, "setTimeout", "wrapped-twice").unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Replaced {
                backup: "originalRNSetTimeout".to_string()
            }
        );
        assert_eq!(scope.get("setTimeout"), Some("wrapped-twice"));
        assert_eq!(scope.get("originalRNSetTimeout"), Some("native"));
    }

    #[test]
    fn test_locked_backup_slot_is_left_alone() {
        let scope: GlobalScope<&str> = GlobalScope::new();
        scope
            .define_property("setTimeout", PropertyDescriptor::data("native"))
            .unwrap();
        scope
            .define_property("originalRNSetTimeout", PropertyDescriptor::locked("pinned"))
            .unwrap();

        install_property(&scope, "setTimeout", "wrapped").unwrap();

        assert_eq!(scope.get("setTimeout"), Some("wrapped"));
        assert_eq!(scope.get("originalRNSetTimeout"), Some("pinned"));
    }

    proptest! {
        #[test]
        fn prop_install_never_loses_original(
            name in "[a-z][A-Za-z]{0,12}",
            original in any::<u32>(),
            replacement in any::<u32>(),
            locked in any::<bool>(),
        ) {
            let scope: GlobalScope<u32> = GlobalScope::new();
            let descriptor = if locked {
                PropertyDescriptor::locked(original)
            } else {
                PropertyDescriptor::data(original)
            };
            scope.define_property(&name, descriptor).unwrap();

            let result = install_property(&scope, &name, replacement);

            if locked {
                prop_assert!(result.is_err());
                prop_assert_eq!(scope.get(&name), Some(original));
            } else {
                prop_assert_eq!(scope.get(&name), Some(replacement));
                prop_assert_eq!(scope.get(&backup_name(&name)), Some(original));
            }
        }
    }
}
