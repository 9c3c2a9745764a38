//!
//! The frame scan loop
//!
//! Continuously samples camera frames and attempts to decode a
//! machine-readable code from each, emitting the navigation target on the
//! first success. Every collaborator is injected: the capture session, the
//! decode routine, the navigation sink, and the tick scheduler, so the loop
//! itself never touches hardware or global state.
//!

use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, Interval, MissedTickBehavior},
};

use crate::{
    cameras::CaptureSession,
    config::CfgFraction,
    error::Error,
    nav::{Navigator, ScanTarget},
    raster::Raster,
};

/// A payload decoded out of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
}

/// The decode routine
///
/// Opaque to the loop: it gets raw RGBA bytes and dimensions and either finds
/// a code or doesn't. Expected to be a pure function of the pixel input.
pub trait Decoder: Send + 'static {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<Decoded>;
}

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The capture session has no full frame yet; the raster was not touched
    NotReady,
    /// A frame was sampled but no code was found in it
    NoCode,
    /// A code was decoded; holds the finished navigation target
    Decoded(String),
}

/// One capture session plus everything needed to scan it
///
/// Owns the session by value; a second loop over the same stream is
/// unrepresentable.
pub struct Scanner<S: CaptureSession, D: Decoder> {
    session: S,
    decoder: D,
    raster: Raster,
    target: ScanTarget,
}

impl<S: CaptureSession, D: Decoder> Scanner<S, D> {
    pub fn new(session: S, decoder: D, target: ScanTarget) -> Self {
        Self {
            session,
            decoder,
            raster: Raster::new(),
            target,
        }
    }

    /// Run one tick of the scan loop
    ///
    /// Guarded by a readiness check. On a ready frame the raster is resized
    /// to the frame's current dimensions (every tick, no caching), the frame
    /// is copied in, and the pixel bytes go to the decoder.
    pub fn tick(&mut self) -> Result<Tick, Error> {
        if !self.session.ready() {
            return Ok(Tick::NotReady);
        }

        let (width, height) = self.session.dimensions();
        self.raster.resize(width, height);
        self.session.capture_into(&mut self.raster)?;

        let (width, height) = self.raster.dimensions();
        match self.decoder.decode(self.raster.data(), width, height) {
            Some(code) => Ok(Tick::Decoded(self.target.url_for(&code.text))),
            None => Ok(Tick::NoCode),
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    fn release(&mut self) {
        self.session.release();
    }
}

/// Schedules ticks for the loop
///
/// Stands in for the display's repaint scheduler: cooperative, sequential,
/// and owned by the single loop task. Skipped ticks are never made up.
pub enum Pacer {
    /// Refresh-rate pacing for production use
    Refresh(Interval),
    /// Externally driven ticks, one per message
    Manual(mpsc::Receiver<()>),
}

impl Pacer {
    /// Pace ticks at the given refresh rate (frames per second as a fraction)
    pub fn refresh(rate: &CfgFraction) -> Self {
        let (num, den) = if rate.num == 0 || rate.den == 0 {
            (60, 1)
        } else {
            (rate.num, rate.den)
        };
        let mut ticker = interval(Duration::from_secs_f64(den as f64 / num as f64));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Pacer::Refresh(ticker)
    }

    /// A pacer driven by the returned sender; dropping it ends the loop
    pub fn manual() -> (mpsc::Sender<()>, Self) {
        let (tx, rx) = mpsc::channel(1);
        (tx, Pacer::Manual(rx))
    }

    async fn next_tick(&mut self) -> bool {
        match self {
            Pacer::Refresh(ticker) => {
                ticker.tick().await;
                true
            }
            Pacer::Manual(rx) => rx.recv().await.is_some(),
        }
    }
}

/// A handle to a running scan loop
///
/// Dropping the handle also cancels the loop; [ScanHandle::stop] does so
/// explicitly and waits until the capture session has been released.
pub struct ScanHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<Result<Option<String>, Error>>,
}

impl ScanHandle {
    /// Cancel the loop and wait for the session to be released
    ///
    /// Returns the navigation target if a decode won the race with the
    /// cancellation.
    pub async fn stop(self) -> Result<Option<String>, Error> {
        let _ = self.cancel.send(true);
        self.task.await.map_err(|_| Error::ScanTaskFailed)?
    }

    /// Wait for the loop to finish on its own
    pub async fn join(self) -> Result<Option<String>, Error> {
        self.task.await.map_err(|_| Error::ScanTaskFailed)?
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start the scan loop as a task on the current runtime
///
/// Ticks run strictly sequentially: the task awaits one pacer tick, runs one
/// loop body, and reschedules, so no tick is ever concurrent with another.
/// The loop ends on the first decoded code, on cancellation, or when the
/// pacer's driver goes away; in every case the capture session is released
/// before the task returns, and the navigator fires only in the decode case,
/// exactly once, after the release.
pub fn start<S, D, N>(scanner: Scanner<S, D>, mut navigator: N, mut pacer: Pacer) -> ScanHandle
where
    S: CaptureSession,
    D: Decoder,
    N: Navigator,
{
    let (cancel, mut cancelled) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut scanner = scanner;
        loop {
            tokio::select! {
                // Err means the handle was dropped; treat it like a stop
                _ = cancelled.changed() => {
                    debug!("scan loop cancelled");
                    scanner.release();
                    return Ok(None);
                }
                alive = pacer.next_tick() => {
                    if !alive {
                        debug!("tick source gone, stopping scan loop");
                        scanner.release();
                        return Ok(None);
                    }
                    match scanner.tick() {
                        Ok(Tick::NotReady) => {
                            debug!("waiting on first frame...");
                        }
                        Ok(Tick::NoCode) => {}
                        Ok(Tick::Decoded(target)) => {
                            scanner.release();
                            info!("decoded a code, navigating to {target}");
                            navigator.navigate(target.clone());
                            return Ok(Some(target));
                        }
                        Err(err) => {
                            error!("scan tick failed: {err}");
                            scanner.release();
                            return Err(err);
                        }
                    }
                }
            }
        }
    });

    ScanHandle { cancel, task }
}
