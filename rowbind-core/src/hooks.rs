use crate::{Error, Record, Result};
use std::{collections::HashMap, fmt, sync::Arc};
use thiserror::Error as ThisError;

/// Lifecycle point a callback is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeCreate,
    BeforeSave,
    AfterSave,
    AfterCreate,
    BeforeDestroy,
    AfterDestroy,
}

/// Error a hook returns to deliberately cancel a save or destroy.
///
/// ```ignore
/// TableDef::new("users").hook(Hook::BeforeSave, |user| {
///     if user.value("name").is_null() {
///         return Err(Cancel::new("name is required").into());
///     }
///     Ok(())
/// })
/// ```
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("Cancelled: {reason}")]
pub struct Cancel {
    pub reason: String,
}

impl Cancel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type HookFn = Arc<dyn Fn(&mut Record) -> Result<()> + Send + Sync>;

/// Callbacks of a table, several per hook, run in registration order.
#[derive(Default, Clone)]
pub struct Hooks(HashMap<Hook, Vec<HookFn>>);

impl Hooks {
    pub fn register(
        &mut self,
        hook: Hook,
        callback: impl Fn(&mut Record) -> Result<()> + Send + Sync + 'static,
    ) {
        self.0.entry(hook).or_default().push(Arc::new(callback));
    }

    /// Run the callbacks of `hook` on `record`, stopping at the first error.
    pub fn run(&self, hook: Hook, record: &mut Record) -> Result<()> {
        for callback in self.0.get(&hook).into_iter().flatten() {
            callback(record)?;
        }
        Ok(())
    }

    /// Run the cancelling hooks in order, `false` when the operation on `table` must stop.
    pub(crate) fn proceed(&self, table: &str, hooks: &[Hook], record: &mut Record) -> bool {
        for hook in hooks {
            if let Err(error) = self.run(*hook, record) {
                log_cancelled(table, *hook, &error);
                return false;
            }
        }
        true
    }

    pub fn count(&self, hook: Hook) -> usize {
        self.0.get(&hook).map_or(0, Vec::len)
    }
}

fn log_cancelled(table: &str, hook: Hook, error: &Error) {
    if let Some(cancel) = error.downcast_ref::<Cancel>() {
        log::debug!("{:?} hook of `{}` cancelled: {}", hook, table, cancel.reason);
    } else {
        log::warn!(
            "{:?} hook of `{}` failed, the operation is cancelled: {:#}",
            hook,
            table,
            error
        );
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cancel, Hook, Hooks};
    use crate::{Error, Record};

    #[test]
    fn run_in_order() {
        let mut hooks = Hooks::default();
        hooks.register(
            Hook::BeforeSave,
            |r: &mut Record| {
                r.set("trace", "a");
                Ok(())
            },
        );
        hooks.register(
            Hook::BeforeSave,
            |r: &mut Record| {
                let trace = format!("{}b", r.value("trace").as_str().unwrap_or_default());
                r.set("trace", trace);
                Ok(())
            },
        );
        let mut record = Record::new();
        hooks.run(Hook::BeforeSave, &mut record).unwrap();
        hooks.run(Hook::AfterSave, &mut record).unwrap();
        assert_eq!(record.value("trace").as_str(), Some("ab"));
        assert_eq!(hooks.count(Hook::BeforeSave), 2);
        assert_eq!(hooks.count(Hook::AfterSave), 0);
    }

    #[test]
    fn proceed_stops_at_first_failure() {
        let mut hooks = Hooks::default();
        hooks.register(
            Hook::BeforeCreate,
            |_: &mut Record| Err(Cancel::new("nope").into()),
        );
        hooks.register(
            Hook::BeforeSave,
            |r: &mut Record| {
                r.set("reached", true);
                Ok(())
            },
        );
        let mut record = Record::new();
        assert!(!hooks.proceed(
            "items",
            &[Hook::BeforeCreate, Hook::BeforeSave],
            &mut record
        ));
        assert!(record.value("reached").is_null());
        assert!(hooks.proceed("items", &[Hook::BeforeSave], &mut record));
        assert_eq!(record.value("reached").as_bool(), Some(true));
    }

    #[test]
    fn cancel_is_recognizable() {
        let error: Error = Cancel::new("stop").into();
        assert_eq!(error.to_string(), "Cancelled: stop");
        assert!(error.downcast_ref::<Cancel>().is_some());
    }
}
