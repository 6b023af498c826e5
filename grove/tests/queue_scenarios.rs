//! End-to-end scheduler scenarios over a small one-dimensional workload.
//!
//! The query tree is a balanced binary tree over 8 points with a frontier
//! size cap of 4, so the queue starts with two slots of 4 points each
//! (`[0,3]` and `[4,7]`).

mod common;

use std::sync::Arc;

use common::{binding, build_tree, leaf_at, LineMetric, PointTable, RecordingCache};
use grove::{CacheSlotId, DualTreeTaskQueue, ReferenceCache, SlotId, TreeNode};

fn eight_point_queue() -> (
    DualTreeTaskQueue<(), common::PointNode>,
    Arc<RecordingCache>,
) {
    let cache = Arc::new(RecordingCache::default());
    let table = PointTable::new(8);
    let queue = DualTreeTaskQueue::new(&table, 4, cache.clone() as Arc<dyn ReferenceCache>);
    (queue, cache)
}

const SLOT_0: SlotId = SlotId::new(0);
const SLOT_1: SlotId = SlotId::new(1);
const SLOT_2: SlotId = SlotId::new(2);

#[test]
fn basic_push_dequeue_prefers_closer_pair() {
    let (mut queue, _) = eight_point_queue();
    let metric = LineMetric;

    // Two leaf references against slot 0 (bound [0,3]): the point at 6 is
    // farther than the point at 5, so the latter dequeues first.
    queue.push(&metric, SLOT_0, binding(leaf_at(6), 1)).unwrap();
    queue.push(&metric, SLOT_0, binding(leaf_at(5), 2)).unwrap();

    let (task, slot) = queue.dequeue(SLOT_0, true).unwrap().unwrap();
    assert_eq!(task.cache_slot(), CacheSlotId::new(2));
    assert_eq!(slot, SLOT_0);
    assert_eq!(queue.remaining_tasks(), 1);
    assert_eq!(queue.is_locked(SLOT_0), Some(true));
}

#[test]
fn lock_blocks_dequeue_until_unlock() {
    let (mut queue, _) = eight_point_queue();
    let metric = LineMetric;

    queue.push(&metric, SLOT_0, binding(leaf_at(6), 1)).unwrap();
    queue.push(&metric, SLOT_0, binding(leaf_at(5), 2)).unwrap();
    assert!(queue.dequeue(SLOT_0, true).unwrap().is_some());

    // The slot is held: the remaining task is invisible until unlock.
    assert!(queue.dequeue(SLOT_0, true).unwrap().is_none());

    queue.unlock(&metric, SLOT_0).unwrap();
    let (task, _) = queue.dequeue(SLOT_0, true).unwrap().unwrap();
    assert_eq!(task.cache_slot(), CacheSlotId::new(1));
}

#[test]
fn split_after_unlock_redistributes_leaf_references() {
    let (mut queue, cache) = eight_point_queue();
    let metric = LineMetric;

    // Take one task so slot 0 is held with one task left pending, then push
    // another while held.
    queue.push(&metric, SLOT_0, binding(leaf_at(6), 1)).unwrap();
    queue.push(&metric, SLOT_0, binding(leaf_at(5), 2)).unwrap();
    assert!(queue.dequeue(SLOT_0, true).unwrap().is_some());
    queue.push(&metric, SLOT_0, binding(leaf_at(4), 3)).unwrap();

    queue.request_split();
    queue.unlock(&metric, SLOT_0).unwrap();

    // A new slot appeared; slot 0 now carries [0,1] and slot 2 carries
    // [2,3]. Each pending task was duplicated across both halves.
    assert_eq!(queue.size(), 3);
    assert_eq!(queue.subtree(SLOT_0).unwrap().count(), 2);
    assert_eq!(queue.subtree(SLOT_2).unwrap().count(), 2);
    assert_eq!(queue.pending_tasks(SLOT_0), Some(2));
    assert_eq!(queue.pending_tasks(SLOT_2), Some(2));
    assert_eq!(queue.remaining_tasks(), 4);

    // One extra cache reference per original task.
    assert_eq!(cache.call_count(), 2);
    assert_eq!(cache.total_for(CacheSlotId::new(1)), 1);
    assert_eq!(cache.total_for(CacheSlotId::new(3)), 1);
}

#[test]
fn split_expands_internal_reference_into_children() {
    let (mut queue, cache) = eight_point_queue();
    let metric = LineMetric;

    // One task against an internal reference node covering [5,6].
    queue
        .push(&metric, SLOT_0, binding(build_tree(5, 6), 7))
        .unwrap();

    // Set up the split trigger on a held slot: consume a helper task from
    // slot 1, request the split, and unlock.
    queue.push(&metric, SLOT_1, binding(leaf_at(0), 9)).unwrap();
    assert!(queue.dequeue(SLOT_1, true).unwrap().is_some());
    queue.request_split();
    queue.unlock(&metric, SLOT_1).unwrap();

    // Slot 0 split; the drained task expanded into both reference children
    // for both query halves.
    assert_eq!(queue.size(), 3);
    assert_eq!(queue.pending_tasks(SLOT_0), Some(2));
    assert_eq!(queue.pending_tasks(SLOT_2), Some(2));
    assert_eq!(queue.remaining_tasks(), 4);

    // Exactly one lock call, adding three references for the three net new
    // tasks.
    assert_eq!(cache.calls(), vec![(CacheSlotId::new(7), 3)]);
}

#[test]
fn split_with_no_eligible_slot_clears_request() {
    let cache = Arc::new(RecordingCache::default());
    // Two points with a cap of 1: both slots are leaves.
    let table = PointTable::new(2);
    let mut queue: DualTreeTaskQueue<(), common::PointNode> =
        DualTreeTaskQueue::new(&table, 1, cache.clone() as Arc<dyn ReferenceCache>);
    let metric = LineMetric;

    queue.push(&metric, SLOT_0, binding(leaf_at(1), 1)).unwrap();
    queue.request_split();
    queue.unlock(&metric, SLOT_0).unwrap();

    assert_eq!(queue.size(), 2);
    assert!(!queue.split_requested());
    assert_eq!(cache.call_count(), 0);
    assert_eq!(queue.remaining_tasks(), 1);
}

#[test]
fn repeated_dequeue_drives_queue_to_empty() {
    let (mut queue, _) = eight_point_queue();
    let metric = LineMetric;

    for (id, position) in [(1u64, 4u32), (2, 5), (3, 6), (4, 0), (5, 1)] {
        let slot = if position < 4 { SLOT_1 } else { SLOT_0 };
        queue
            .push(&metric, slot, binding(leaf_at(position), id))
            .unwrap();
    }
    assert!(!queue.is_empty());

    // Workers drain both slots without pushing anything new.
    loop {
        let mut progressed = false;
        for index in 0..queue.size() {
            let slot = SlotId::new(index);
            if let Some((_, taken)) = queue.dequeue(slot, true).unwrap() {
                queue.unlock(&metric, taken).unwrap();
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    assert!(queue.is_empty());
    assert_eq!(queue.remaining_tasks(), 0);
    for index in 0..queue.size() {
        assert!(queue.dequeue(SlotId::new(index), true).unwrap().is_none());
    }
}

#[test]
fn slot_indices_stay_valid_across_splits() {
    let (mut queue, _) = eight_point_queue();
    let metric = LineMetric;

    queue.push(&metric, SLOT_0, binding(leaf_at(7), 1)).unwrap();
    queue.push(&metric, SLOT_1, binding(leaf_at(0), 2)).unwrap();

    let sizes_before = queue.size();
    queue.request_split();
    queue.unlock(&metric, SLOT_0).unwrap();
    assert!(queue.size() > sizes_before);

    // The pre-split indices still resolve, and dequeue on them still works.
    assert!(queue.dequeue(SLOT_0, false).unwrap().is_some());
    assert!(queue.dequeue(SLOT_1, false).unwrap().is_some());
}
