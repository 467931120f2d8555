//! Single-slot audio playback ownership.
//!
//! At most one reply plays at a time. Starting a new playback stops and
//! replaces whatever was in flight; disabling voice mid-reply stops the
//! slot outright. The slot owns the handle, so a stopped playback cannot
//! be resumed or leak.

/// A running playback that can be stopped.
///
/// Implementations wrap whatever the embedding application uses to emit
/// audio. Stop must be idempotent.
pub trait PlaybackHandle: Send {
    fn stop(&mut self);
}

impl<T: PlaybackHandle + ?Sized> PlaybackHandle for Box<T> {
    fn stop(&mut self) {
        (**self).stop();
    }
}

/// Turns decoded audio bytes into a running playback.
pub trait AudioSink: Send + Sync {
    fn play(&self, audio: Vec<u8>) -> Box<dyn PlaybackHandle>;
}

/// The single playback slot.
#[derive(Default)]
pub struct PlaybackSlot<H: PlaybackHandle> {
    current: Option<H>,
}

impl<H: PlaybackHandle> PlaybackSlot<H> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Start a new playback, stopping any in-flight one first.
    pub fn start(&mut self, handle: H) {
        self.stop();
        self.current = Some(handle);
    }

    /// Stop the current playback, if any.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.current.take() {
            handle.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }
}
