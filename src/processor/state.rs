use super::{Error, ErrorKind, Item, Processor};

/// Immutable cursor over the input of a single application.
///
/// A state is a position into a borrowed, never-mutated buffer plus the registry
/// used to resolve references. Copying it is cheap, so backtracking is simply a
/// matter of keeping the old state around.
pub struct State<'a, I: Item> {
    items: &'a [I],
    pos: usize,
    processor: &'a Processor<I>,
}

impl<I: Item> Clone for State<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: Item> Copy for State<'_, I> {}

impl<'a, I: Item> State<'a, I> {
    pub fn new(items: &'a [I], processor: &'a Processor<I>) -> Self {
        Self {
            items,
            pos: 0,
            processor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.items.len()
    }

    pub fn head(&self) -> Result<&'a I, Error> {
        self.items
            .get(self.pos)
            .ok_or_else(|| Error::new(ErrorKind::StateEmpty).at(self.pos))
    }

    pub fn tail(&self) -> Result<State<'a, I>, Error> {
        if self.is_empty() {
            return Err(Error::new(ErrorKind::StateEmpty).at(self.pos));
        }
        Ok(self.at_pos(self.pos + 1))
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Items not yet consumed.
    pub fn remaining(&self) -> &'a [I] {
        self.items.get(self.pos..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn processor(&self) -> &'a Processor<I> {
        self.processor
    }

    fn at_pos(&self, pos: usize) -> Self {
        Self { pos, ..*self }
    }
}

impl<I: Item> std::fmt::Debug for State<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "State({}/{})", self.pos, self.items.len())
    }
}
