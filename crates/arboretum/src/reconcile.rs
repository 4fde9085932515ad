//! Keyed enter/update/exit reconciliation with animated geometry.
//!
//! A [`Reconciler`] remembers the elements it drew last time, keyed by [`RenderKey`]. Each
//! `reconcile` call diffs a new item list against them:
//!
//! - new keys enter, starting at the interaction origin;
//! - surviving keys move from wherever they currently are to their new geometry;
//! - missing keys exit toward the origin and are pruned once their transition ends.
//!
//! A reconcile arriving while transitions are still running restarts them from their sampled
//! geometry, so the latest interaction always wins without jumps.

use crate::easing::Easing;
use crate::tween::{Transition, Tween};
use arboretum_core::RenderKey;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Enter,
    Update,
    Exit,
}

/// One item of a render pass: a key, what to draw, and where it should end up.
#[derive(Debug, Clone)]
pub struct Keyed<D, G> {
    pub key: RenderKey,
    pub data: D,
    pub geometry: G,
}

/// Keys classified by the last reconcile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Join {
    pub enter: Vec<RenderKey>,
    pub update: Vec<RenderKey>,
    pub exit: Vec<RenderKey>,
}

#[derive(Debug, Clone)]
pub struct Element<D, G> {
    pub key: RenderKey,
    pub data: D,
    pub phase: Phase,
    transition: Transition<G>,
}

impl<D, G: Tween> Element<D, G> {
    pub fn geometry(&self, now: f64) -> G {
        self.transition.sample(now)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.transition.is_finished(now)
    }
}

#[derive(Debug, Clone)]
pub struct Reconciler<D, G> {
    elements: IndexMap<RenderKey, Element<D, G>, FxBuildHasher>,
    duration: f64,
    easing: Easing,
}

impl<D, G: Tween> Reconciler<D, G> {
    pub fn new(duration: f64, easing: Easing) -> Self {
        Self {
            elements: IndexMap::with_hasher(FxBuildHasher),
            duration,
            easing,
        }
    }

    /// Diffs `items` against the current elements and starts their transitions at `now`.
    ///
    /// `origin` is where entering elements start and exiting elements go. Element order after
    /// the call is `items` order followed by exiting elements.
    pub fn reconcile(&mut self, items: Vec<Keyed<D, G>>, origin: G, now: f64) -> Join {
        let _span = tracing::debug_span!("reconcile", items = items.len()).entered();
        self.prune(now);

        let mut join = Join::default();
        let mut next: IndexMap<RenderKey, Element<D, G>, FxBuildHasher> =
            IndexMap::with_capacity_and_hasher(items.len(), FxBuildHasher);

        for item in items {
            let element = match self.elements.shift_remove(&item.key) {
                Some(mut prior) => {
                    prior
                        .transition
                        .retarget(item.geometry, now, self.duration, self.easing);
                    prior.data = item.data;
                    prior.phase = Phase::Update;
                    join.update.push(item.key);
                    prior
                }
                None => {
                    join.enter.push(item.key);
                    Element {
                        key: item.key,
                        data: item.data,
                        phase: Phase::Enter,
                        transition: Transition::new(
                            origin,
                            item.geometry,
                            now,
                            self.duration,
                            self.easing,
                        ),
                    }
                }
            };
            next.insert(element.key, element);
        }

        for (key, mut gone) in self.elements.drain(..) {
            gone.transition
                .retarget(origin, now, self.duration, self.easing);
            gone.phase = Phase::Exit;
            join.exit.push(key);
            next.insert(key, gone);
        }

        self.elements = next;
        tracing::trace!(
            enter = join.enter.len(),
            update = join.update.len(),
            exit = join.exit.len(),
            "reconciled"
        );
        join
    }

    /// Drops exiting elements whose transition has ended. Returns how many were removed.
    pub fn prune(&mut self, now: f64) -> usize {
        let before = self.elements.len();
        self.elements
            .retain(|_, e| !(e.phase == Phase::Exit && e.transition.is_finished(now)));
        before - self.elements.len()
    }

    pub fn get(&self, key: RenderKey) -> Option<&Element<D, G>> {
        self.elements.get(&key)
    }

    pub fn geometry(&self, key: RenderKey, now: f64) -> Option<G> {
        self.get(key).map(|e| e.geometry(now))
    }

    /// Live elements at `now`: exits that already finished are skipped.
    pub fn sample(&self, now: f64) -> impl Iterator<Item = (&Element<D, G>, G)> {
        self.elements
            .values()
            .filter(move |e| !(e.phase == Phase::Exit && e.is_finished(now)))
            .map(move |e| (e, e.geometry(now)))
    }

    pub fn is_settled(&self, now: f64) -> bool {
        self.elements.values().all(|e| e.is_finished(now))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
