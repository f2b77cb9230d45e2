// LRU ordering over chunk ids
//
// Responsibility: recency order for resident chunks, kept apart from the
//                 chunk storage itself (parallel prev/next arrays)

use crate::core::chunk::ChunkId;

#[derive(Debug, Clone, Copy, Default)]
struct Link {
    prev: Option<ChunkId>,
    next: Option<ChunkId>,
    linked: bool,
}

/// Doubly-linked recency list indexed by chunk id.
///
/// Front is most recently used, back is the eviction candidate. Every
/// operation is O(1).
#[derive(Debug, Clone)]
pub(crate) struct LruList {
    links: Vec<Link>,
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
    len: usize,
}

impl LruList {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            links: vec![Link::default(); capacity],
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn contains(&self, id: ChunkId) -> bool {
        self.links[id as usize].linked
    }

    pub(crate) fn back(&self) -> Option<ChunkId> {
        self.tail
    }

    pub(crate) fn push_front(&mut self, id: ChunkId) {
        debug_assert!(!self.contains(id), "chunk {} already linked", id);

        self.links[id as usize] = Link {
            prev: None,
            next: self.head,
            linked: true,
        };
        match self.head {
            Some(old) => self.links[old as usize].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    pub(crate) fn remove(&mut self, id: ChunkId) {
        let link = self.links[id as usize];
        if !link.linked {
            return;
        }

        match link.prev {
            Some(prev) => self.links[prev as usize].next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => self.links[next as usize].prev = link.prev,
            None => self.tail = link.prev,
        }

        self.links[id as usize] = Link::default();
        self.len -= 1;
    }

    pub(crate) fn move_to_front(&mut self, id: ChunkId) {
        if self.head == Some(id) {
            return;
        }
        self.remove(id);
        self.push_front(id);
    }

    /// Ids from most to least recently used.
    pub(crate) fn iter(&self) -> impl Iterator<Item = ChunkId> + '_ {
        std::iter::successors(self.head, move |&id| self.links[id as usize].next)
    }
}
