use p4lower_core::BlockId;

#[derive(Debug, Default, Clone)]
struct Frame {
    pre: Vec<String>,
    post: Vec<String>,
}

/// Statement-scoped accumulator of hoisted code.
///
/// A frame is opened for every nested statement body so that code hoisted by an expression
/// inside a branch, a switch case or an atomic block stays inside that body.
#[derive(Debug, Clone)]
pub struct EmissionContext {
    frames: Vec<Frame>,
    scope: Option<BlockId>,
}

impl EmissionContext {
    pub fn new(scope: Option<BlockId>) -> Self {
        Self {
            frames: vec![Frame::default()],
            scope,
        }
    }

    /// The control or parser block the statement belongs to.
    pub fn scope(&self) -> Option<BlockId> {
        self.scope
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Hoists `code` before the statement; identical code is hoisted once per frame.
    pub fn prepend(&mut self, code: impl Into<String>) {
        let code = code.into();
        let frame = self.current();
        if !frame.pre.contains(&code) {
            frame.pre.push(code);
        }
    }

    pub fn append(&mut self, code: impl Into<String>) {
        self.current().post.push(code.into());
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Closes the innermost frame and hands back its hoisted code.
    pub fn pop_frame(&mut self) -> (Vec<String>, Vec<String>) {
        match self.frames.pop() {
            Some(frame) if !self.frames.is_empty() => (frame.pre, frame.post),
            Some(frame) => {
                self.frames.push(Frame::default());
                (frame.pre, frame.post)
            }
            None => (Vec::new(), Vec::new()),
        }
    }

    /// Empties every frame, outermost first.
    pub fn drain(&mut self) -> (Vec<String>, Vec<String>) {
        let mut pre = Vec::new();
        let mut post = Vec::new();
        for frame in self.frames.drain(..) {
            pre.extend(frame.pre);
            post.extend(frame.post);
        }
        self.frames.push(Frame::default());
        (pre, post)
    }
}
