//! Container stack
//!
//! A LIFO of in-progress frames owned by one encode or decode call. Only the
//! top frame is ever mutated; descending into a nested container pushes a
//! frame and finishing it pops the frame and folds its product into the new
//! top. Composite records never share a stack with their encloser: each
//! nested record gets a fresh one.

/// LIFO of frames for one pass
#[derive(Debug)]
pub struct ContainerStack<F> {
    frames: Vec<F>,
}

impl<F> ContainerStack<F> {
    /// Empty stack
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Push a frame; it becomes the only mutable one
    pub fn push(&mut self, frame: F) {
        self.frames.push(frame);
    }

    /// Pop the top frame
    pub fn pop(&mut self) -> Option<F> {
        self.frames.pop()
    }

    /// Top frame
    pub fn top(&self) -> Option<&F> {
        self.frames.last()
    }

    /// Top frame, mutably
    pub fn top_mut(&mut self) -> Option<&mut F> {
        self.frames.last_mut()
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when no frame is open
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<F> Default for ContainerStack<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-value slot, written at most once
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    value: Option<T>,
}

impl<T> Slot<T> {
    /// Unwritten slot
    pub fn empty() -> Self {
        Self { value: None }
    }

    /// Write the slot
    ///
    /// Returns the rejected value if the slot already holds one.
    pub fn write(&mut self, value: T) -> Result<(), T> {
        if self.value.is_some() {
            return Err(value);
        }
        self.value = Some(value);
        Ok(())
    }

    /// True once written
    pub fn is_written(&self) -> bool {
        self.value.is_some()
    }

    /// Consume the slot
    pub fn into_inner(self) -> Option<T> {
        self.value
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}
