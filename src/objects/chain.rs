//! Bounded walks over singly linked lists in foreign memory

use crate::Error;

/// Lazily follows a `next` link from a first node until null.
///
/// Stops after `limit` nodes and logs the overrun; the nodes seen so far
/// are still yielded.
pub struct LinkedChain<F> {
    current: usize,
    steps: usize,
    limit: usize,
    chain: &'static str,
    next: F,
}

impl<F> LinkedChain<F>
where
    F: FnMut(usize) -> usize,
{
    pub fn new(first: usize, limit: usize, chain: &'static str, next: F) -> Self {
        LinkedChain {
            current: first,
            steps: 0,
            limit,
            chain,
            next,
        }
    }
}

impl<F> Iterator for LinkedChain<F>
where
    F: FnMut(usize) -> usize,
{
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.current == 0 {
            return None;
        }
        if self.steps >= self.limit {
            tracing::warn!(
                "{}",
                Error::ChainOverrun {
                    chain: self.chain,
                    limit: self.limit
                }
            );
            self.current = 0;
            return None;
        }
        let node = self.current;
        self.steps += 1;
        self.current = (self.next)(node);
        Some(node)
    }
}
