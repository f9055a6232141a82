//! Vsync-driven animation loop with a strict mount/unmount lifecycle.
//!
//! Exactly one frame request is outstanding while mounted. Each step
//! schedules its successor before running the tick, so steps never overlap
//! and a panicking tick still leaves a single request for [`Drop`] to
//! cancel. Data updates and resizes are forwarded synchronously and never
//! touch the pending request.

use web_time::Instant;

use crate::error::XtalError;
use crate::util::frame_timing::FrameTiming;

/// Handle for one requested vsync callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Platform hook that delivers vsync callbacks.
pub trait VsyncSource {
    /// Ask for one callback at the next vertical sync.
    fn request_frame(&mut self) -> FrameRequest;
    /// Withdraw a pending callback.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Timing passed to every animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    /// Wall-clock seconds since mount; the phase for all oscillations.
    pub time: f32,
    /// Seconds since the previous step.
    pub dt: f32,
    /// Whether playback is running. Autonomous motion freezes when false.
    pub playing: bool,
}

/// Consumer of loop events.
pub trait FrameHooks {
    /// Data-driven input; a change triggers [`FrameHooks::on_data_change`].
    type Input: PartialEq;

    /// One animation step.
    fn tick(&mut self, clock: &FrameClock);
    /// New input arrived.
    fn on_data_change(&mut self, input: &Self::Input);
    /// Display surface changed size.
    fn on_resize(&mut self, width: u32, height: u32);
}

/// Mounted animation loop.
pub struct FrameLoop<H: FrameHooks, V: VsyncSource> {
    hooks: H,
    vsync: V,
    pending: Option<FrameRequest>,
    timing: Option<FrameTiming>,
    playing: bool,
    last_input: Option<H::Input>,
    size: Option<(u32, u32)>,
}

impl<H: FrameHooks, V: VsyncSource> FrameLoop<H, V> {
    /// Unmounted loop.
    pub fn new(hooks: H, vsync: V) -> Self {
        Self {
            hooks,
            vsync,
            pending: None,
            timing: None,
            playing: false,
            last_input: None,
            size: None,
        }
    }

    /// Start the loop; `now` becomes phase zero.
    pub fn mount(&mut self, now: Instant) -> Result<(), XtalError> {
        if self.timing.is_some() {
            return Err(XtalError::LoopAlreadyMounted);
        }
        self.timing = Some(FrameTiming::new(now));
        self.pending = Some(self.vsync.request_frame());
        log::debug!("frame loop mounted");
        Ok(())
    }

    /// Vsync callback. Stale or unknown requests are ignored; returns whether
    /// a step ran.
    pub fn on_vsync(&mut self, request: FrameRequest, now: Instant) -> bool {
        if self.pending != Some(request) {
            return false;
        }
        let Some(timing) = self.timing.as_mut() else {
            return false;
        };
        let sample = timing.advance(now);
        self.pending = Some(self.vsync.request_frame());

        let clock = FrameClock {
            time: sample.time,
            dt: sample.dt,
            playing: self.playing,
        };
        self.hooks.tick(&clock);
        true
    }

    /// Offer new input. Returns whether it differed from the last one.
    pub fn submit(&mut self, input: H::Input) -> bool {
        if self.last_input.as_ref() == Some(&input) {
            return false;
        }
        self.hooks.on_data_change(&input);
        self.last_input = Some(input);
        true
    }

    /// Set the play flag seen by subsequent ticks.
    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Forward a surface resize. Repeats of the current size are dropped.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.size == Some((width, height)) {
            return false;
        }
        self.size = Some((width, height));
        self.hooks.on_resize(width, height);
        true
    }

    /// Stop the loop, cancelling the outstanding request. Safe to call
    /// repeatedly; only the first call cancels.
    pub fn unmount(&mut self) -> bool {
        let was_mounted = self.timing.take().is_some();
        if let Some(request) = self.pending.take() {
            self.vsync.cancel_frame(request);
            log::debug!("frame loop unmounted");
        }
        was_mounted
    }

    /// Whether the loop is running.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.timing.is_some()
    }

    /// The outstanding request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Whether ticks currently see `playing = true`.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Smoothed step rate.
    #[must_use]
    pub fn fps(&self) -> Option<f32> {
        self.timing.as_ref().map(FrameTiming::fps)
    }

    /// The hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The hooks, mutably.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// The vsync source.
    pub fn vsync(&self) -> &V {
        &self.vsync
    }

    /// The vsync source, mutably.
    pub fn vsync_mut(&mut self) -> &mut V {
        &mut self.vsync
    }
}

impl<H: FrameHooks, V: VsyncSource> Drop for FrameLoop<H, V> {
    fn drop(&mut self) {
        let _ = self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use web_time::Duration;

    use super::*;

    #[derive(Default)]
    struct Log {
        requested: Vec<FrameRequest>,
        cancelled: Vec<FrameRequest>,
    }

    struct MockVsync {
        next: u64,
        log: Rc<RefCell<Log>>,
    }

    impl VsyncSource for MockVsync {
        fn request_frame(&mut self) -> FrameRequest {
            self.next += 1;
            let r = FrameRequest(self.next);
            self.log.borrow_mut().requested.push(r);
            r
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            self.log.borrow_mut().cancelled.push(request);
        }
    }

    #[derive(Default)]
    struct Recorder {
        ticks: Vec<FrameClock>,
        data: Vec<u32>,
        resizes: Vec<(u32, u32)>,
        panic_on_tick: bool,
    }

    impl FrameHooks for Recorder {
        type Input = u32;

        fn tick(&mut self, clock: &FrameClock) {
            assert!(!self.panic_on_tick, "tick failed");
            self.ticks.push(*clock);
        }

        fn on_data_change(&mut self, input: &u32) {
            self.data.push(*input);
        }

        fn on_resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }
    }

    fn new_loop() -> (FrameLoop<Recorder, MockVsync>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let vsync = MockVsync {
            next: 0,
            log: Rc::clone(&log),
        };
        (FrameLoop::new(Recorder::default(), vsync), log)
    }

    #[test]
    fn one_request_outstanding_per_step() {
        let (mut fl, log) = new_loop();
        let t0 = Instant::now();
        fl.mount(t0).unwrap();
        for i in 1..=5 {
            let req = fl.pending().unwrap();
            assert!(fl.on_vsync(req, t0 + Duration::from_millis(16 * i)));
        }
        assert_eq!(log.borrow().requested.len(), 6);
        assert_eq!(fl.hooks().ticks.len(), 5);
        // stale callback is ignored
        assert!(!fl.on_vsync(FrameRequest(1), t0));
        assert_eq!(fl.hooks().ticks.len(), 5);
    }

    #[test]
    fn mount_twice_is_an_error() {
        let (mut fl, _log) = new_loop();
        fl.mount(Instant::now()).unwrap();
        assert!(matches!(
            fl.mount(Instant::now()),
            Err(XtalError::LoopAlreadyMounted)
        ));
    }

    #[test]
    fn unmount_cancels_exactly_once() {
        let (mut fl, log) = new_loop();
        fl.mount(Instant::now()).unwrap();
        assert!(fl.unmount());
        assert!(!fl.unmount());
        drop(fl);
        assert_eq!(log.borrow().cancelled, vec![FrameRequest(1)]);
    }

    #[test]
    fn drop_cancels_after_a_panicking_tick() {
        let (mut fl, log) = new_loop();
        let t0 = Instant::now();
        fl.mount(t0).unwrap();
        fl.hooks_mut().panic_on_tick = true;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let req = fl.pending().unwrap();
            let _ = fl.on_vsync(req, t0);
        }));
        assert!(result.is_err());
        let log = log.borrow();
        assert_eq!(log.requested.len(), 2);
        assert_eq!(log.cancelled, vec![FrameRequest(2)]);
    }

    #[test]
    fn data_change_only_on_new_input() {
        let (mut fl, _log) = new_loop();
        assert!(fl.submit(3));
        assert!(!fl.submit(3));
        assert!(fl.submit(4));
        assert_eq!(fl.hooks().data, vec![3, 4]);
    }

    #[test]
    fn resize_is_idempotent_and_keeps_the_loop() {
        let (mut fl, log) = new_loop();
        fl.mount(Instant::now()).unwrap();
        let pending = fl.pending();
        assert!(fl.resize(800, 600));
        assert!(!fl.resize(800, 600));
        assert!(fl.resize(1024, 768));
        assert_eq!(fl.pending(), pending);
        assert!(log.borrow().cancelled.is_empty());
        assert_eq!(fl.hooks().resizes.len(), 2);
    }

    #[test]
    fn play_flag_reaches_ticks() {
        let (mut fl, _log) = new_loop();
        let t0 = Instant::now();
        fl.mount(t0).unwrap();
        let req = fl.pending().unwrap();
        let _ = fl.on_vsync(req, t0);
        fl.set_playing(true);
        let req = fl.pending().unwrap();
        let _ = fl.on_vsync(req, t0 + Duration::from_millis(20));
        let ticks = &fl.hooks().ticks;
        assert!(!ticks[0].playing);
        assert!(ticks[1].playing);
        assert!((ticks[1].dt - 0.02).abs() < 1e-6);
    }
}
