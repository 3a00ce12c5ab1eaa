use tracing::{error, warn};

use super::{NamespaceHandle, NamespaceSwitch};
use crate::error::Result;

/// Run `work` inside `target`'s network namespace.
///
/// The previous namespace is restored explicitly after `work` returns,
/// whatever it returned. If `work` unwinds, a drop guard performs the same
/// restore. When entering fails, `work` is not run. A failed restore is
/// reported in preference to the result of `work`, since the thread is then
/// left in the wrong namespace.
pub fn within<S, T, F>(switch: &S, target: &NamespaceHandle, work: F) -> Result<T>
where
    S: NamespaceSwitch + ?Sized,
    F: FnOnce() -> Result<T>,
{
    let saved = switch.enter(target)?;
    let mut guard = RestoreGuard {
        switch,
        saved: Some(saved),
    };

    let result = work();

    match guard.restore() {
        Ok(()) => result,
        Err(restore_err) => {
            if let Err(e) = &result {
                warn!(namespace = %target, error = %e, "namespace work failed before restore");
            }
            error!(namespace = %target, error = %restore_err, "failed to restore network namespace");
            Err(restore_err)
        }
    }
}

struct RestoreGuard<'a, S: NamespaceSwitch + ?Sized> {
    switch: &'a S,
    saved: Option<S::Saved>,
}

impl<S: NamespaceSwitch + ?Sized> RestoreGuard<'_, S> {
    fn restore(&mut self) -> Result<()> {
        match self.saved.take() {
            Some(saved) => self.switch.restore(saved),
            None => Ok(()),
        }
    }
}

impl<S: NamespaceSwitch + ?Sized> Drop for RestoreGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!(error = %e, "failed to restore network namespace while unwinding");
        }
    }
}
