//! Time-ordered store over a self-adjusting (splay) binary search tree.

use simbridge_types::SimTime;

/// Index sentinel for "no node".
const NIL: usize = usize::MAX;

/// Free slots retained for reuse before the arena is shrunk.
const DEFAULT_POOL_CAP: usize = 128;

#[derive(Debug)]
struct Node<T> {
    time: SimTime,
    data: Option<T>,
    parent: usize,
    left: usize,
    right: usize,
}

/// Pending timed elements ordered by [`SimTime`], with amortized-logarithmic
/// access biased toward the minimum.
///
/// Every insert splays the new node to the root; the dominant access pattern
/// is "peek or extract the smallest time", so recently touched nodes stay
/// near the top. [`peek_min`] deliberately does **not** splay: callers peek
/// repeatedly between extractions and should not pay rebalancing on every
/// look, at the cost of a later extraction not being optimally amortized.
///
/// Nodes live in an arena of slots addressed by index; parent links are
/// back-references, never ownership edges. Freed slots are recycled through a
/// free list to bound allocator churn under high event rates; past the pool
/// cap, trailing free slots are returned to the allocator.
///
/// Duplicate times are allowed; extraction order among equal times is
/// unspecified. Not thread-safe; see the crate docs.
///
/// [`peek_min`]: TimeStore::peek_min
#[derive(Debug)]
pub struct TimeStore<T> {
    slots: Vec<Node<T>>,
    free: Vec<usize>,
    root: usize,
    len: usize,
    pool_cap: usize,
}

impl<T> TimeStore<T> {
    /// Create an empty store with the default node-pool cap.
    pub fn new() -> Self {
        Self::with_pool_cap(DEFAULT_POOL_CAP)
    }

    /// Create an empty store retaining at most `pool_cap` free slots.
    pub fn with_pool_cap(pool_cap: usize) -> Self {
        TimeStore {
            slots: Vec::new(),
            free: Vec::new(),
            root: NIL,
            len: 0,
            pool_cap,
        }
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an element, then splay it to the root.
    pub fn insert(&mut self, time: SimTime, data: T) {
        let node = self.alloc(time, data);
        if self.root == NIL {
            self.root = node;
        } else {
            let mut cur = self.root;
            loop {
                // Ties descend right so earlier-inserted equal times sit left.
                if time < self.slots[cur].time {
                    if self.slots[cur].left == NIL {
                        self.slots[cur].left = node;
                        break;
                    }
                    cur = self.slots[cur].left;
                } else {
                    if self.slots[cur].right == NIL {
                        self.slots[cur].right = node;
                        break;
                    }
                    cur = self.slots[cur].right;
                }
            }
            self.slots[node].parent = cur;
            self.splay(node);
        }
        self.len += 1;
    }

    /// The minimum-time element, without restructuring the tree.
    pub fn peek_min(&self) -> Option<(SimTime, &T)> {
        let node = self.leftmost()?;
        let slot = &self.slots[node];
        Some((slot.time, slot.data.as_ref().expect("occupied slot")))
    }

    /// Remove and return the minimum-time element.
    ///
    /// The removed node's right subtree is relinked into its parent, and the
    /// parent is splayed toward the root.
    pub fn extract_min(&mut self) -> Option<(SimTime, T)> {
        let node = self.leftmost()?;
        let parent = self.slots[node].parent;
        let right = self.slots[node].right;
        if parent == NIL {
            self.root = right;
            if right != NIL {
                self.slots[right].parent = NIL;
            }
        } else {
            self.slots[parent].left = right;
            if right != NIL {
                self.slots[right].parent = parent;
            }
            self.splay(parent);
        }
        let time = self.slots[node].time;
        let data = self.slots[node].data.take().expect("occupied slot");
        self.release(node);
        self.len -= 1;
        Some((time, data))
    }

    fn leftmost(&self) -> Option<usize> {
        if self.root == NIL {
            return None;
        }
        let mut cur = self.root;
        while self.slots[cur].left != NIL {
            cur = self.slots[cur].left;
        }
        Some(cur)
    }

    /// Splay `node` to the root with the standard zig / zig-zig / zig-zag
    /// rotations over arena indices.
    fn splay(&mut self, node: usize) {
        while self.slots[node].parent != NIL {
            let parent = self.slots[node].parent;
            let grand = self.slots[parent].parent;
            if grand == NIL {
                self.rotate(node);
            } else if (self.slots[grand].left == parent) == (self.slots[parent].left == node) {
                self.rotate(parent);
                self.rotate(node);
            } else {
                self.rotate(node);
                self.rotate(node);
            }
        }
    }

    /// Rotate `node` above its parent, fixing the grandparent link.
    fn rotate(&mut self, node: usize) {
        let parent = self.slots[node].parent;
        debug_assert_ne!(parent, NIL);
        let grand = self.slots[parent].parent;

        if self.slots[parent].left == node {
            let inner = self.slots[node].right;
            self.slots[parent].left = inner;
            if inner != NIL {
                self.slots[inner].parent = parent;
            }
            self.slots[node].right = parent;
        } else {
            let inner = self.slots[node].left;
            self.slots[parent].right = inner;
            if inner != NIL {
                self.slots[inner].parent = parent;
            }
            self.slots[node].left = parent;
        }
        self.slots[parent].parent = node;
        self.slots[node].parent = grand;
        if grand == NIL {
            self.root = node;
        } else if self.slots[grand].left == parent {
            self.slots[grand].left = node;
        } else {
            self.slots[grand].right = node;
        }
    }

    fn alloc(&mut self, time: SimTime, data: T) -> usize {
        let node = Node {
            time,
            data: Some(data),
            parent: NIL,
            left: NIL,
            right: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = node;
                idx
            }
            None => {
                self.slots.push(node);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        self.slots[idx].parent = NIL;
        self.slots[idx].left = NIL;
        self.slots[idx].right = NIL;
        self.free.push(idx);
        // Past the pool cap, give trailing free slots back to the allocator.
        while self.free.len() > self.pool_cap {
            let last = self.slots.len() - 1;
            match self.free.iter().position(|&i| i == last) {
                Some(pos) => {
                    self.free.swap_remove(pos);
                    self.slots.pop();
                }
                None => break,
            }
        }
    }
}

impl<T> Default for TimeStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
