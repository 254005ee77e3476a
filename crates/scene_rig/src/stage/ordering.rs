//! Init pool ordering
//!
//! Producers declare which handles their init callbacks need and which they
//! assign. The mount flush runs the pool in an order that satisfies those
//! declarations while staying as close to registration order as possible.

use crate::context::{CallbackPool, Handles};
use crate::foundation::collections::CallbackId;

/// Stable topological order of `pool`.
///
/// `available` holds the handles already set when the flush starts. An entry
/// is held back only while it needs a handle that is neither available nor
/// already provided, and some other pending entry provides it. Among the
/// entries that are ready, the earliest registered runs first. On a cycle the
/// remaining entries keep registration order.
pub fn dependency_order<F: ?Sized>(pool: &CallbackPool<F>, available: Handles) -> Vec<CallbackId> {
    let mut pending: Vec<(CallbackId, Handles, Handles)> = pool
        .ids()
        .iter()
        .filter_map(|&id| {
            pool.registration(id)
                .map(|registration| (id, registration.required(), registration.provided()))
        })
        .collect();
    let mut provided = available;
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let ready = (0..pending.len()).find(|&index| {
            let (_, requires, _) = pending[index];
            let outstanding = requires - provided;
            outstanding.is_empty()
                || !pending
                    .iter()
                    .enumerate()
                    .any(|(other, &(_, _, provides))| other != index && provides.intersects(outstanding))
        });

        match ready {
            Some(index) => {
                let (id, _, provides) = pending.remove(index);
                provided |= provides;
                order.push(id);
            }
            None => {
                let labels: Vec<&str> = pending
                    .iter()
                    .filter_map(|&(id, _, _)| pool.registration(id).map(|registration| registration.label()))
                    .collect();
                log::warn!(
                    "Circular handle dependency between init callbacks {:?}, keeping registration order",
                    labels
                );
                order.extend(pending.drain(..).map(|(id, _, _)| id));
            }
        }
    }

    order
}
