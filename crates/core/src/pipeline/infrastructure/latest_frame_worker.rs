use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use crate::pipeline::touch_pipeline::{FrameReport, TouchPipeline};
use crate::shared::frame::Frame;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("touch worker has stopped")]
    Stopped,
    #[error("touch worker panicked")]
    Panicked,
}

/// Requests that must never be dropped, unlike frames.
enum Command {
    CaptureReference(Frame),
    Calibrate(Frame),
}

/// Runs a [`TouchPipeline`] on a dedicated thread, always on the newest
/// frame.
///
/// Layout: `submit → [1-slot frame channel] → worker → results`
///
/// At most one frame waits while another is processed. Submitting while
/// the slot is full replaces the waiting frame, so a slow frame never
/// builds a backlog. Commands travel on their own unbounded channel and
/// are applied before the next frame.
pub struct LatestFrameWorker {
    frame_tx: Sender<Frame>,
    /// Second handle on the frame slot, used to evict a stale frame.
    slot: Receiver<Frame>,
    control_tx: Sender<Command>,
    results: Receiver<FrameReport>,
    dropped: Arc<AtomicUsize>,
    handle: JoinHandle<TouchPipeline>,
}

impl LatestFrameWorker {
    pub fn spawn(pipeline: TouchPipeline) -> Self {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Frame>(1);
        let (control_tx, control_rx) = crossbeam_channel::unbounded::<Command>();
        let (result_tx, results) = crossbeam_channel::unbounded::<FrameReport>();
        let slot = frame_rx.clone();
        let handle = std::thread::spawn(move || run(pipeline, frame_rx, control_rx, result_tx));

        Self {
            frame_tx,
            slot,
            control_tx,
            results,
            dropped: Arc::new(AtomicUsize::new(0)),
            handle,
        }
    }

    /// Queues `frame` without blocking, evicting a frame that is still
    /// waiting.
    pub fn submit(&self, frame: Frame) -> Result<(), WorkerError> {
        let frame = match self.frame_tx.try_send(frame) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Disconnected(_)) => return Err(WorkerError::Stopped),
            Err(TrySendError::Full(frame)) => frame,
        };
        if let Ok(stale) = self.slot.try_recv() {
            log::debug!("dropping stale frame #{}", stale.index());
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        match self.frame_tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::Stopped),
            Err(TrySendError::Full(frame)) => {
                log::debug!("frame slot refilled, dropping frame #{}", frame.index());
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    pub fn capture_reference(&self, frame: Frame) -> Result<(), WorkerError> {
        self.send(Command::CaptureReference(frame))
    }

    pub fn calibrate(&self, frame: Frame) -> Result<(), WorkerError> {
        self.send(Command::Calibrate(frame))
    }

    fn send(&self, command: Command) -> Result<(), WorkerError> {
        self.control_tx.send(command).map_err(|_| WorkerError::Stopped)
    }

    /// Reports of processed frames, in processing order.
    pub fn results(&self) -> &Receiver<FrameReport> {
        &self.results
    }

    pub fn dropped_frames(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Finishes any waiting frame, stops the thread and hands the
    /// pipeline back. Reports still unread stay in `results`.
    pub fn shutdown(self) -> Result<(TouchPipeline, Receiver<FrameReport>), WorkerError> {
        let Self {
            frame_tx,
            slot,
            control_tx,
            results,
            dropped,
            handle,
        } = self;
        drop(frame_tx);
        drop(control_tx);
        drop(slot);

        let mut pipeline = handle.join().map_err(|_| WorkerError::Panicked)?;
        pipeline
            .logger_mut()
            .metric("dropped_frames", dropped.load(Ordering::Relaxed) as f64);
        Ok((pipeline, results))
    }
}

fn run(
    mut pipeline: TouchPipeline,
    frame_rx: Receiver<Frame>,
    control_rx: Receiver<Command>,
    result_tx: Sender<FrameReport>,
) -> TouchPipeline {
    let mut control_open = true;
    loop {
        while let Ok(command) = control_rx.try_recv() {
            apply(&mut pipeline, command);
        }

        let frame = if control_open {
            crossbeam_channel::select! {
                recv(control_rx) -> command => {
                    match command {
                        Ok(command) => apply(&mut pipeline, command),
                        Err(_) => control_open = false,
                    }
                    continue;
                }
                recv(frame_rx) -> frame => frame,
            }
        } else {
            frame_rx.recv()
        };

        let Ok(frame) = frame else {
            break;
        };
        while let Ok(command) = control_rx.try_recv() {
            apply(&mut pipeline, command);
        }
        if result_tx.send(pipeline.process(&frame)).is_err() {
            break;
        }
    }
    pipeline
}

fn apply(pipeline: &mut TouchPipeline, command: Command) {
    match command {
        Command::CaptureReference(frame) => pipeline.capture_reference(&frame),
        Command::Calibrate(frame) => {
            if !pipeline.calibrate(&frame) {
                log::warn!("calibration on frame #{} changed nothing", frame.index());
            }
        }
    }
}
