use crate::luac::function::LuaFunction;

/// Hooks fired while a chunk is decoded. Every hook is optional; a hook's
/// behavior never influences decoding.
///
/// Hooks may be called more than once for the same data when a cached
/// function is revisited, so they must tolerate duplicate notifications.
#[derive(Default)]
pub struct ChunkVisitor<'a> {
    /// Called once per completed function, children before their parent.
    pub on_function: Option<Box<dyn FnMut(&LuaFunction) + 'a>>,

    /// Called with the payload bytes and chunk offset of every nonempty
    /// string (names, string constants, debug strings).
    pub on_string: Option<Box<dyn FnMut(&[u8], u64) + 'a>>,

    /// Called with the payload bytes and chunk offset of every scalar
    /// constant (boolean, float, integer).
    pub on_const: Option<Box<dyn FnMut(&[u8], u64) + 'a>>,
}

impl<'a> ChunkVisitor<'a> {
    /// A visitor with no hooks set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the visitor cares about string or constant notifications.
    /// Cached functions are only re-walked for callbacks when this holds.
    pub(crate) fn wants_values(&self) -> bool {
        self.on_string.is_some() || self.on_const.is_some()
    }

    pub(crate) fn notify_function(&mut self, function: &LuaFunction) {
        if let Some(hook) = self.on_function.as_mut() {
            hook(function);
        }
    }

    pub(crate) fn notify_string(&mut self, bytes: &[u8], offset: u64) {
        if let Some(hook) = self.on_string.as_mut() {
            hook(bytes, offset);
        }
    }

    pub(crate) fn notify_const(&mut self, bytes: &[u8], offset: u64) {
        if let Some(hook) = self.on_const.as_mut() {
            hook(bytes, offset);
        }
    }
}

impl std::fmt::Debug for ChunkVisitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkVisitor")
            .field("on_function", &self.on_function.is_some())
            .field("on_string", &self.on_string.is_some())
            .field("on_const", &self.on_const.is_some())
            .finish()
    }
}
