//! Pool flushing
//!
//! One flush walks a pool in a given order, checks each entry's required
//! handles, runs it with the context and records what happened. Entries
//! registered into the same pool while it flushes are picked up at the end of
//! the pass; entries removed before their turn are skipped silently.

use std::collections::{HashSet, VecDeque};

use super::error::StageError;
use crate::context::{CallbackPool, ContextError, LifecycleCallback, LifecyclePools, PoolKind, SceneContext};
use crate::core::FaultPolicy;
use crate::foundation::collections::CallbackId;

/// A callback that failed or was skipped during a flush
#[derive(Debug)]
pub struct FlushFault {
    /// Label of the callback
    pub label: String,
    /// What went wrong
    pub error: ContextError,
}

/// Outcome of one flush
#[derive(Debug)]
pub struct FlushReport {
    /// Pool that was flushed
    pub pool: PoolKind,
    /// Callbacks that ran, successfully or not
    pub ran: usize,
    /// Callbacks skipped because a required handle was missing
    pub skipped: usize,
    /// Every fault in the order it happened
    pub faults: Vec<FlushFault>,
}

impl FlushReport {
    fn new(pool: PoolKind) -> Self {
        Self {
            pool,
            ran: 0,
            skipped: 0,
            faults: Vec::new(),
        }
    }

    /// Whether every callback ran and succeeded
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    fn record(&mut self, policy: FaultPolicy, label: String, error: ContextError) -> Result<(), StageError> {
        match policy {
            FaultPolicy::Abort => Err(StageError::CallbackFailed {
                pool: self.pool,
                label,
                source: error,
            }),
            FaultPolicy::Isolate => {
                if matches!(error, ContextError::MissingDependency { .. }) {
                    log::warn!("Skipped {} callback `{}`: {}", self.pool, label, error);
                } else {
                    log::error!("{} callback `{}` failed: {}", self.pool, label, error);
                }
                self.faults.push(FlushFault { label, error });
                Ok(())
            }
        }
    }
}

/// Flush one pool.
///
/// `select` picks the pool out of the context, `first_pass` is the order for
/// the entries present when the flush starts and `invoke` calls one callback.
pub(crate) fn flush<F, S, I>(
    ctx: &mut SceneContext,
    kind: PoolKind,
    policy: FaultPolicy,
    select: S,
    first_pass: Vec<CallbackId>,
    mut invoke: I,
) -> Result<FlushReport, StageError>
where
    F: ?Sized,
    S: Fn(&mut LifecyclePools) -> &mut CallbackPool<F>,
    I: FnMut(&mut F, &mut SceneContext) -> Result<(), ContextError>,
{
    let mut report = FlushReport::new(kind);
    let mut visited: HashSet<CallbackId> = HashSet::new();
    let mut queue: VecDeque<CallbackId> = first_pass.into();

    loop {
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(registration) = select(&mut ctx.pools).registration(id).cloned() else {
                continue;
            };

            let missing = registration.required() - ctx.present();
            if !missing.is_empty() {
                report.skipped += 1;
                let error = ContextError::missing(registration.label(), missing);
                report.record(policy, registration.label().to_string(), error)?;
                continue;
            }

            let Some(mut callback) = select(&mut ctx.pools).take_callback(id) else {
                continue;
            };
            log::trace!("Running {} callback `{}`", kind, registration.label());
            let result = invoke(&mut *callback, ctx);
            select(&mut ctx.pools).restore_callback(id, callback);
            report.ran += 1;

            if let Err(error) = result {
                report.record(policy, registration.label().to_string(), error)?;
            }
        }

        let added: Vec<CallbackId> = select(&mut ctx.pools)
            .ids()
            .iter()
            .copied()
            .filter(|id| !visited.contains(id))
            .collect();
        if added.is_empty() {
            break;
        }
        log::trace!("{} callbacks registered during the {} flush", added.len(), kind);
        queue.extend(added);
    }

    Ok(report)
}

/// Flush a lifecycle pool in registration order
pub(crate) fn flush_lifecycle(
    ctx: &mut SceneContext,
    kind: PoolKind,
    policy: FaultPolicy,
) -> Result<FlushReport, StageError> {
    let select: fn(&mut LifecyclePools) -> &mut CallbackPool<LifecycleCallback> = match kind {
        PoolKind::Init => LifecyclePools::init_mut,
        PoolKind::Resize => LifecyclePools::resize_mut,
        PoolKind::Dispose => LifecyclePools::dispose_mut,
        PoolKind::Frame => {
            log::error!("flush_lifecycle called for the frame pool");
            return Ok(FlushReport::new(kind));
        }
    };
    let order = select(&mut ctx.pools).ids().to_vec();
    flush(ctx, kind, policy, select, order, |callback: &mut LifecycleCallback, ctx: &mut SceneContext| {
        callback(ctx)
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::context::{Handles, Registration};
    use crate::scene::Scene;

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_isolate_keeps_flushing() {
        let mut ctx = SceneContext::default();
        let log = recorder();
        for label in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            ctx.register_resize(label, move |_ctx| {
                log.borrow_mut().push(label.to_string());
                if label == "b" {
                    Err(ContextError::Custom("boom".into()))
                } else {
                    Ok(())
                }
            });
        }

        let report = flush_lifecycle(&mut ctx, PoolKind::Resize, FaultPolicy::Isolate).unwrap();
        assert_eq!(*log.borrow(), ["a", "b", "c"]);
        assert_eq!(report.ran, 3);
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].label, "b");
    }

    #[test]
    fn test_abort_stops_at_first_fault() {
        let mut ctx = SceneContext::default();
        let log = recorder();
        for label in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            ctx.register_dispose(label, move |_ctx| {
                log.borrow_mut().push(label.to_string());
                if label == "b" {
                    Err(ContextError::Custom("boom".into()))
                } else {
                    Ok(())
                }
            });
        }

        let err = flush_lifecycle(&mut ctx, PoolKind::Dispose, FaultPolicy::Abort).unwrap_err();
        assert!(matches!(err, StageError::CallbackFailed { pool: PoolKind::Dispose, ref label, .. } if label == "b"));
        assert_eq!(*log.borrow(), ["a", "b"]);
    }

    #[test]
    fn test_missing_dependency_is_skipped() {
        let mut ctx = SceneContext::default();
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);
        ctx.register_resize(Registration::new("needs-scene").requires(Handles::SCENE), move |_ctx| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let report = flush_lifecycle(&mut ctx, PoolKind::Resize, FaultPolicy::Isolate).unwrap();
        assert!(!*ran.borrow());
        assert_eq!(report.skipped, 1);
        assert!(matches!(
            report.faults[0].error,
            ContextError::MissingDependency { missing, .. } if missing == Handles::SCENE
        ));

        ctx.set_scene(Scene::new()).unwrap();
        let report = flush_lifecycle(&mut ctx, PoolKind::Resize, FaultPolicy::Isolate).unwrap();
        assert!(report.is_clean());
        assert!(*ran.borrow());
    }

    #[test]
    fn test_registration_during_flush_runs_in_same_flush() {
        let mut ctx = SceneContext::default();
        let log = recorder();
        let outer = Rc::clone(&log);
        ctx.register_init("first", move |ctx| {
            outer.borrow_mut().push("first".into());
            let inner = Rc::clone(&outer);
            ctx.register_init("late", move |_ctx| {
                inner.borrow_mut().push("late".into());
                Ok(())
            });
            Ok(())
        });
        let second = Rc::clone(&log);
        ctx.register_init("second", move |_ctx| {
            second.borrow_mut().push("second".into());
            Ok(())
        });

        let report = flush_lifecycle(&mut ctx, PoolKind::Init, FaultPolicy::Isolate).unwrap();
        assert_eq!(*log.borrow(), ["first", "second", "late"]);
        assert_eq!(report.ran, 3);
    }

    #[test]
    fn test_removed_before_turn_is_skipped() {
        let mut ctx = SceneContext::default();
        let log = recorder();
        let first = Rc::clone(&log);
        let victim = Rc::new(RefCell::new(None));
        let victim_id = Rc::clone(&victim);
        ctx.register_resize("remover", move |ctx| {
            first.borrow_mut().push("remover".into());
            if let Some(id) = victim_id.borrow_mut().take() {
                ctx.unregister(PoolKind::Resize, id);
            }
            Ok(())
        });
        let second = Rc::clone(&log);
        let id = ctx.register_resize("victim", move |_ctx| {
            second.borrow_mut().push("victim".into());
            Ok(())
        });
        *victim.borrow_mut() = Some(id);

        let report = flush_lifecycle(&mut ctx, PoolKind::Resize, FaultPolicy::Isolate).unwrap();
        assert_eq!(*log.borrow(), ["remover"]);
        assert_eq!(report.ran, 1);
        assert_eq!(ctx.pools().len(PoolKind::Resize), 1);
    }
}
